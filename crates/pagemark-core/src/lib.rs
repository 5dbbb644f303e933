//! Shared types, wire protocol, config, and errors for PageMark.

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::{PageMarkError, Result};
pub use protocol::{AgentCommand, AgentSignal, ToolRequest, ToolResponse};
