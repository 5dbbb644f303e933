//! Page agent — executes drawing commands against a page's visual tree.
//!
//! The agent runs as a single task owning one [`DrawingSession`]. Commands
//! arrive through a mailbox and are answered exactly once; pointer events
//! drive the session's Idle/Armed/Stroking state machine and mutate the
//! lazily-created overlay layer.

pub mod geometry;
pub mod handler;
pub mod overlay;
pub mod session;

pub use geometry::Point;
pub use handler::{
    AgentHandle, AgentInput, ClipboardSink, NullClipboard, PageAgent, PointerEvent,
    PointerEventKind, SignalSender,
};
pub use overlay::{OverlayElement, OverlayLayer};
pub use session::DrawingSession;
