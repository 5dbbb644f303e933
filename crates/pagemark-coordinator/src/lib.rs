//! Coordinator — the long-lived mediator between the toolbar UI and the
//! active page's agent.
//!
//! For every toolbar request the coordinator resolves the active tab fresh,
//! maps the request to an activation command with its fixed defaults, and
//! forwards it. If no agent listener is registered for the tab it injects
//! one, waits briefly for it to register, and retries exactly once.

pub mod commands;
pub mod injector;
pub mod registry;
pub mod router;
pub mod tabs;

pub use commands::activation_command;
pub use injector::{AgentInjector, SpawnInjector};
pub use registry::AgentRegistry;
pub use router::{start_signal_listener, Coordinator};
pub use tabs::{InMemoryTabs, TabId, TabInfo, TabQuery};
