//! The page agent actor: mailbox loop and command dispatch.
//!
//! Every command receives exactly one reply. The dispatch boundary is a
//! catch-all barrier: internal faults, unknown tools, and even panics are
//! converted into `{success: false, error}` responses and never cross the
//! message channel as raw failures.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use pagemark_core::error::PageMarkError;
use pagemark_core::protocol::{AgentCommand, AgentSignal, EditOptions, ToolResponse};

use crate::geometry::Point;
use crate::session::{ArmedTool, DrawingSession, LineKind, ShapeKind};

/// Destination for copied overlay content. The actual clipboard lives in
/// the host platform; the agent only hands the snapshot over.
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn write(&self, content: String) -> anyhow::Result<()>;
}

/// Clipboard sink that discards content, logging it at debug level.
pub struct NullClipboard;

#[async_trait]
impl ClipboardSink for NullClipboard {
    async fn write(&self, content: String) -> anyhow::Result<()> {
        debug!(bytes = content.len(), "Discarding copied content");
        Ok(())
    }
}

/// Pointer event kinds delivered by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub point: Point,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Down,
            point: Point::new(x, y),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Move,
            point: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Up,
            point: Point::new(x, y),
        }
    }
}

/// Input accepted by the agent's mailbox.
#[derive(Debug)]
pub enum AgentInput {
    /// A command from the coordinator, with its reply slot.
    Command(AgentCommand, oneshot::Sender<ToolResponse>),
    /// A pointer event from the page. No reply.
    Pointer(PointerEvent),
}

/// Sender for lifecycle signals back to the coordinator.
pub type SignalSender = mpsc::UnboundedSender<AgentSignal>;

/// Cloneable handle to a running page agent.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    tx: mpsc::UnboundedSender<AgentInput>,
}

impl AgentHandle {
    /// Forward a command and await its terminal response.
    pub async fn send(&self, command: AgentCommand) -> pagemark_core::Result<ToolResponse> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(AgentInput::Command(command, reply_tx))
            .map_err(|_| PageMarkError::AgentUnreachable("agent mailbox closed".into()))?;
        reply_rx
            .await
            .map_err(|_| PageMarkError::AgentUnreachable("agent dropped the reply".into()))
    }

    /// Deliver a pointer event. Events to a torn-down agent are dropped.
    pub fn pointer(&self, event: PointerEvent) {
        let _ = self.tx.send(AgentInput::Pointer(event));
    }

    /// Whether the agent's mailbox is still open.
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// The page agent: one per injected page, owning its drawing session.
pub struct PageAgent {
    id: String,
    tab_id: Option<u64>,
    session: DrawingSession,
    clipboard: Arc<dyn ClipboardSink>,
}

impl PageAgent {
    /// Spawn the agent task. Announces itself with a one-shot
    /// `CONTENT_SCRIPT_LOADED` signal, then serves its mailbox until every
    /// handle is dropped.
    pub fn spawn(
        tab_id: Option<u64>,
        clipboard: Arc<dyn ClipboardSink>,
        signals: SignalSender,
    ) -> AgentHandle {
        let (tx, mut rx) = mpsc::unbounded_channel::<AgentInput>();

        tokio::spawn(async move {
            let mut agent = PageAgent {
                id: Uuid::new_v4().to_string(),
                tab_id,
                session: DrawingSession::new(),
                clipboard,
            };

            let _ = signals.send(AgentSignal::ContentScriptLoaded { tab_id });
            info!(agent = %agent.id, tab_id = ?tab_id, "Page agent loaded");

            while let Some(input) = rx.recv().await {
                match input {
                    AgentInput::Command(command, reply) => {
                        let response = agent.handle_command(command);
                        if reply.send(response).is_err() {
                            warn!(agent = %agent.id, "Reply receiver dropped before response");
                        }
                    }
                    AgentInput::Pointer(event) => agent.handle_pointer(event),
                }
            }

            debug!(agent = %agent.id, "Page agent stopped");
        });

        AgentHandle { tx }
    }

    /// The catch-all dispatch barrier. Always produces exactly one response.
    fn handle_command(&mut self, command: AgentCommand) -> ToolResponse {
        let kind = command.kind();
        match std::panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(command))) {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(agent = %self.id, command = kind, %e, "Command rejected");
                ToolResponse::err(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic);
                error!(agent = %self.id, command = kind, message, "Handler fault");
                ToolResponse::err(PageMarkError::HandlerFault(message).to_string())
            }
        }
    }

    fn dispatch(&mut self, command: AgentCommand) -> pagemark_core::Result<ToolResponse> {
        match command {
            AgentCommand::StartSelection { tool, options } => {
                let kind = ShapeKind::from_name(&tool)
                    .ok_or_else(|| PageMarkError::UnknownCommand(tool.clone()))?;
                self.session.arm(ArmedTool::Shape { kind, options });
                debug!(agent = %self.id, tool = kind.name(), "Selection tool armed");
                Ok(ToolResponse::ok_with(format!("{tool} enabled")))
            }
            AgentCommand::StartDrawing { tool, options } => {
                let kind = LineKind::from_name(&tool)
                    .ok_or_else(|| PageMarkError::UnknownCommand(tool.clone()))?;
                self.session.arm(ArmedTool::Line { kind, options });
                debug!(agent = %self.id, tool = kind.name(), "Drawing tool armed");
                Ok(ToolResponse::ok_with(format!("{tool} enabled")))
            }
            AgentCommand::StartEditing { tool, options } => {
                let expected = match &options {
                    EditOptions::Mosaic(_) => "mosaic",
                    EditOptions::Text(_) => "text",
                };
                if tool != expected {
                    return Err(PageMarkError::UnknownCommand(tool));
                }
                self.session.arm(ArmedTool::Edit { options });
                debug!(agent = %self.id, tool = expected, "Editing tool armed");
                Ok(ToolResponse::ok_with(format!("{tool} enabled")))
            }
            AgentCommand::StopEditing { .. } => {
                self.session.stop();
                debug!(agent = %self.id, "Editing stopped, overlay cleared");
                Ok(ToolResponse::ok_with("editing stopped"))
            }
            AgentCommand::CopyContent => {
                let snapshot = self.session.copy_markup();
                let clipboard = self.clipboard.clone();
                let agent_id = self.id.clone();
                tokio::spawn(async move {
                    if let Err(e) = clipboard.write(snapshot).await {
                        warn!(agent = %agent_id, %e, "Clipboard write failed");
                    }
                });
                Ok(ToolResponse::ok_with("content copied"))
            }
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        match event.kind {
            PointerEventKind::Down => self.session.pointer_down(event.point),
            PointerEventKind::Move => self.session.pointer_move(event.point),
            PointerEventKind::Up => self.session.pointer_up(event.point),
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
