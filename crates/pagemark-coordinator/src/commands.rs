//! The fixed request-to-activation-command table.

use pagemark_core::protocol::{
    AgentCommand, EditOptions, LineOptions, MosaicOptions, ShapeOptions, StopOptions, TextOptions,
    ToolRequest,
};

/// Map a toolbar request to its activation command with the tool's default
/// options. This table is fixed; every row is covered by a test.
pub fn activation_command(request: ToolRequest) -> AgentCommand {
    match request {
        ToolRequest::Rectangle => AgentCommand::StartSelection {
            tool: "rectangle".into(),
            options: ShapeOptions {
                stroke_color: "#ff0000".into(),
                stroke_width: 2,
                fill_color: "rgba(255, 0, 0, 0.2)".into(),
                is_enabled: true,
            },
        },
        ToolRequest::Circle => AgentCommand::StartSelection {
            tool: "circle".into(),
            options: ShapeOptions {
                stroke_color: "#00ff00".into(),
                stroke_width: 2,
                fill_color: "rgba(0, 255, 0, 0.2)".into(),
                is_enabled: true,
            },
        },
        ToolRequest::Arrow => AgentCommand::StartDrawing {
            tool: "arrow".into(),
            options: LineOptions {
                stroke_color: "#0000ff".into(),
                stroke_width: 3,
                is_enabled: true,
            },
        },
        ToolRequest::Pen => AgentCommand::StartDrawing {
            tool: "pen".into(),
            options: LineOptions {
                stroke_color: "#000000".into(),
                stroke_width: 2,
                is_enabled: true,
            },
        },
        ToolRequest::Mosaic => AgentCommand::StartEditing {
            tool: "mosaic".into(),
            options: EditOptions::Mosaic(MosaicOptions {
                brush_size: 10,
                is_enabled: true,
            }),
        },
        ToolRequest::Text => AgentCommand::StartEditing {
            tool: "text".into(),
            options: EditOptions::Text(TextOptions {
                font_size: 16,
                font_color: "#000000".into(),
                is_enabled: true,
            }),
        },
        ToolRequest::Exit => AgentCommand::StopEditing {
            options: StopOptions { is_enabled: false },
        },
        ToolRequest::Copy => AgentCommand::CopyContent,
    }
}
