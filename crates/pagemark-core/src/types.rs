use serde::Serialize;

/// Static descriptor for one toolbar entry.
///
/// Descriptors are compile-time data: defined once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub id: u32,
    /// Wire name, matching [`crate::protocol::ToolRequest`].
    pub name: &'static str,
    /// Human-readable label shown in the toolbar.
    pub display_name: &'static str,
    /// Icon asset reference.
    pub icon: &'static str,
}

/// The fixed toolbar, in display order.
pub const TOOLBAR: [ToolDescriptor; 8] = [
    ToolDescriptor {
        id: 1,
        name: "rectangle",
        display_name: "Rectangle",
        icon: "icons/rectangle.svg",
    },
    ToolDescriptor {
        id: 2,
        name: "circle",
        display_name: "Ellipse",
        icon: "icons/circle.svg",
    },
    ToolDescriptor {
        id: 3,
        name: "arrow",
        display_name: "Arrow",
        icon: "icons/arrow.svg",
    },
    ToolDescriptor {
        id: 4,
        name: "pen",
        display_name: "Pen",
        icon: "icons/pen.svg",
    },
    ToolDescriptor {
        id: 5,
        name: "mosaic",
        display_name: "Mosaic",
        icon: "icons/mosaic.svg",
    },
    ToolDescriptor {
        id: 6,
        name: "text",
        display_name: "Text",
        icon: "icons/text.svg",
    },
    ToolDescriptor {
        id: 7,
        name: "exit",
        display_name: "Exit",
        icon: "icons/exit.svg",
    },
    ToolDescriptor {
        id: 8,
        name: "copy",
        display_name: "Copy",
        icon: "icons/copy.svg",
    },
];

/// Icon display size in CSS pixels. Presentation rule only, not part of the
/// protocol contract: ids 1, 6, 7, and 8 render at 36x36, the rest at 30x30.
pub fn icon_size(id: u32) -> (u32, u32) {
    if matches!(id, 1 | 6 | 7 | 8) {
        (36, 36)
    } else {
        (30, 30)
    }
}
