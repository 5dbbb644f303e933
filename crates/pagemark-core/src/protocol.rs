//! PageMark wire protocol.
//!
//! Three isolated contexts talk through JSON messages: the toolbar sends a
//! [`ToolRequest`] to the coordinator, the coordinator forwards a structured
//! [`AgentCommand`] to the page agent, and a [`ToolResponse`] travels back
//! along the reverse path of every command.

use serde::{Deserialize, Serialize};

/// Tool activation request sent by the toolbar UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolRequest {
    Rectangle,
    Circle,
    Arrow,
    Pen,
    Mosaic,
    Text,
    Exit,
    Copy,
}

impl ToolRequest {
    /// Wire name of the request (also the toolbar's lookup key).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Arrow => "arrow",
            Self::Pen => "pen",
            Self::Mosaic => "mosaic",
            Self::Text => "text",
            Self::Exit => "exit",
            Self::Copy => "copy",
        }
    }

    /// Parse a toolbar item name. Unknown names are rejected at the UI layer
    /// and never dispatched.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rectangle" => Some(Self::Rectangle),
            "circle" => Some(Self::Circle),
            "arrow" => Some(Self::Arrow),
            "pen" => Some(Self::Pen),
            "mosaic" => Some(Self::Mosaic),
            "text" => Some(Self::Text),
            "exit" => Some(Self::Exit),
            "copy" => Some(Self::Copy),
            _ => None,
        }
    }

    /// All requests, in toolbar order.
    pub fn all() -> [Self; 8] {
        [
            Self::Rectangle,
            Self::Circle,
            Self::Arrow,
            Self::Pen,
            Self::Mosaic,
            Self::Text,
            Self::Exit,
            Self::Copy,
        ]
    }
}

/// Options for shape tools (rectangle, circle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeOptions {
    pub stroke_color: String,
    pub stroke_width: u32,
    pub fill_color: String,
    pub is_enabled: bool,
}

/// Options for line tools (arrow, pen).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineOptions {
    pub stroke_color: String,
    pub stroke_width: u32,
    pub is_enabled: bool,
}

/// Options for editing tools. The payload shape is fixed per tool, so a
/// mosaic command can never carry text options and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EditOptions {
    Mosaic(MosaicOptions),
    Text(TextOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicOptions {
    pub brush_size: u32,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions {
    pub font_size: u32,
    pub font_color: String,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopOptions {
    pub is_enabled: bool,
}

/// Activation command forwarded by the coordinator to the page agent.
///
/// Each command kind carries exactly one option-bag shape; option fields are
/// never mixed across kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentCommand {
    #[serde(rename = "START_SELECTION")]
    StartSelection { tool: String, options: ShapeOptions },

    #[serde(rename = "START_DRAWING")]
    StartDrawing { tool: String, options: LineOptions },

    #[serde(rename = "START_EDITING")]
    StartEditing { tool: String, options: EditOptions },

    #[serde(rename = "STOP_EDITING")]
    StopEditing { options: StopOptions },

    #[serde(rename = "COPY_CONTENT")]
    CopyContent,
}

impl AgentCommand {
    /// Command kind as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartSelection { .. } => "START_SELECTION",
            Self::StartDrawing { .. } => "START_DRAWING",
            Self::StartEditing { .. } => "START_EDITING",
            Self::StopEditing { .. } => "STOP_EDITING",
            Self::CopyContent => "COPY_CONTENT",
        }
    }
}

/// One-shot lifecycle signal from the page agent to the coordinator.
/// No reply is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentSignal {
    #[serde(rename = "CONTENT_SCRIPT_LOADED")]
    ContentScriptLoaded {
        #[serde(skip_serializing_if = "Option::is_none")]
        tab_id: Option<u64>,
    },
}

/// Terminal response returned through the reverse path of every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
        }
    }

    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
