//! The drawing session state machine.
//!
//! One session exists per page, owned exclusively by the page agent. It
//! moves between three states: `Idle` (no tool active), `Armed` (tool
//! selected, waiting for pointer-down), and `Stroking` (pointer down, a
//! live element is being reshaped). Editing tools (mosaic, text) arm
//! without a stroking phase and apply one-shot edits on pointer-down.

use pagemark_core::protocol::{EditOptions, LineOptions, ShapeOptions};

use crate::geometry::{arrow_pose, circle_from, rect_bounds, Point};
use crate::overlay::{ElementId, OverlayElement, OverlayLayer, PathData};

/// Shape tools: dragged into an axis-aligned bounding region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

impl ShapeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rectangle" => Some(Self::Rectangle),
            "circle" => Some(Self::Circle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
        }
    }
}

/// Line tools: dragged from an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Arrow,
    Pen,
}

impl LineKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "arrow" => Some(Self::Arrow),
            "pen" => Some(Self::Pen),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Arrow => "arrow",
            Self::Pen => "pen",
        }
    }
}

/// The armed tool plus its captured option snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum ArmedTool {
    Shape {
        kind: ShapeKind,
        options: ShapeOptions,
    },
    Line {
        kind: LineKind,
        options: LineOptions,
    },
    Edit {
        options: EditOptions,
    },
}

impl ArmedTool {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Shape { kind, .. } => kind.name(),
            Self::Line { kind, .. } => kind.name(),
            Self::Edit {
                options: EditOptions::Mosaic(_),
            } => "mosaic",
            Self::Edit {
                options: EditOptions::Text(_),
            } => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum SessionState {
    #[default]
    Idle,
    Armed {
        tool: ArmedTool,
    },
    Stroking {
        tool: ArmedTool,
        anchor: Point,
        live: ElementId,
    },
}

/// The page agent's single mutable drawing state.
///
/// The overlay layer is created lazily on the first stroke or edit and
/// reused afterwards. Finished elements stay in place until [`stop`]
/// clears the whole layer.
///
/// [`stop`]: DrawingSession::stop
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    state: SessionState,
    overlay: Option<OverlayLayer>,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a tool, capturing its option snapshot. Valid from every state;
    /// an in-progress stroke is finalized in place first.
    pub fn arm(&mut self, tool: ArmedTool) {
        self.finish_stroke(None);
        self.state = SessionState::Armed { tool };
    }

    /// Stop editing: clear every overlay element, drop the armed tool, and
    /// return to `Idle`. Idempotent; stopping while already idle is a no-op.
    pub fn stop(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.clear();
            overlay.set_pointer_capture(false);
        }
        self.state = SessionState::Idle;
    }

    /// Pointer-down. Ignored while idle. With an edit tool armed this
    /// applies a one-shot edit; with a shape or line tool it begins a
    /// stroke. A pointer-down while already stroking finalizes the current
    /// stroke at the new point and immediately begins the next one.
    pub fn pointer_down(&mut self, point: Point) {
        if matches!(self.state, SessionState::Stroking { .. }) {
            self.finish_stroke(Some(point));
        }

        let tool = match std::mem::take(&mut self.state) {
            SessionState::Idle => return,
            SessionState::Armed { tool } => tool,
            SessionState::Stroking { .. } => unreachable!("stroke finalized above"),
        };

        match &tool {
            ArmedTool::Edit { options } => {
                self.apply_edit(point, options.clone());
                self.state = SessionState::Armed { tool };
            }
            _ => {
                let live = self.begin_stroke(point, &tool);
                self.state = SessionState::Stroking {
                    tool,
                    anchor: point,
                    live,
                };
            }
        }
    }

    /// Pointer-move. Recomputes the live element's geometry while stroking;
    /// ignored otherwise.
    pub fn pointer_move(&mut self, point: Point) {
        let SessionState::Stroking { tool, anchor, live } = &self.state else {
            return;
        };
        let (tool, anchor, live) = (tool.clone(), *anchor, *live);
        self.update_live(&tool, anchor, live, point);
    }

    /// Pointer-up. Finalizes the stroke and returns to `Armed`, releasing
    /// pointer capture but leaving the finished element in place.
    pub fn pointer_up(&mut self, point: Point) {
        self.finish_stroke(Some(point));
    }

    /// Fill in the text of a previously placed label.
    pub fn set_text(&mut self, id: ElementId, content: impl Into<String>) {
        if let Some(OverlayElement::TextLabel { text, .. }) =
            self.overlay.as_mut().and_then(|o| o.element_mut(id))
        {
            *text = content.into();
        }
    }

    /// Snapshot the overlay as markup for the copy operation.
    pub fn copy_markup(&self) -> String {
        self.overlay
            .as_ref()
            .map(OverlayLayer::to_markup)
            .unwrap_or_else(|| OverlayLayer::new().to_markup())
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, SessionState::Armed { .. })
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self.state, SessionState::Stroking { .. })
    }

    /// Name of the currently armed tool, if any.
    pub fn active_tool(&self) -> Option<&'static str> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Armed { tool } | SessionState::Stroking { tool, .. } => {
                Some(tool.name())
            }
        }
    }

    pub fn overlay(&self) -> Option<&OverlayLayer> {
        self.overlay.as_ref()
    }

    fn overlay_mut(&mut self) -> &mut OverlayLayer {
        self.overlay.get_or_insert_with(OverlayLayer::new)
    }

    fn begin_stroke(&mut self, anchor: Point, tool: &ArmedTool) -> ElementId {
        let element = match tool {
            ArmedTool::Shape {
                kind: ShapeKind::Rectangle,
                options,
            } => OverlayElement::Rectangle {
                bounds: rect_bounds(anchor, anchor),
                style: options.into(),
            },
            ArmedTool::Shape {
                kind: ShapeKind::Circle,
                options,
            } => OverlayElement::Circle {
                bounds: circle_from(anchor, anchor),
                style: options.into(),
            },
            ArmedTool::Line {
                kind: LineKind::Arrow,
                options,
            } => OverlayElement::Arrow {
                anchor,
                pose: arrow_pose(anchor, anchor),
                style: options.into(),
            },
            ArmedTool::Line {
                kind: LineKind::Pen,
                options,
            } => OverlayElement::PenStroke {
                path: PathData::new(anchor),
                style: options.into(),
            },
            ArmedTool::Edit { .. } => unreachable!("edit tools have no stroking phase"),
        };

        let overlay = self.overlay_mut();
        overlay.set_pointer_capture(true);
        overlay.push(element)
    }

    fn update_live(&mut self, tool: &ArmedTool, anchor: Point, live: ElementId, current: Point) {
        let Some(element) = self.overlay.as_mut().and_then(|o| o.element_mut(live)) else {
            return;
        };

        match (tool, element) {
            (
                ArmedTool::Shape {
                    kind: ShapeKind::Rectangle,
                    ..
                },
                OverlayElement::Rectangle { bounds, .. },
            ) => *bounds = rect_bounds(anchor, current),
            (
                ArmedTool::Shape {
                    kind: ShapeKind::Circle,
                    ..
                },
                OverlayElement::Circle { bounds, .. },
            ) => *bounds = circle_from(anchor, current),
            (
                ArmedTool::Line {
                    kind: LineKind::Arrow,
                    ..
                },
                OverlayElement::Arrow { pose, .. },
            ) => *pose = arrow_pose(anchor, current),
            (
                ArmedTool::Line {
                    kind: LineKind::Pen,
                    ..
                },
                OverlayElement::PenStroke { path, .. },
            ) => path.line_to(current),
            _ => {}
        }
    }

    fn apply_edit(&mut self, point: Point, options: EditOptions) {
        let element = match options {
            EditOptions::Mosaic(m) => OverlayElement::MosaicPatch {
                at: point,
                brush_size: m.brush_size,
            },
            EditOptions::Text(t) => OverlayElement::TextLabel {
                at: point,
                text: String::new(),
                font_size: t.font_size,
                font_color: t.font_color,
            },
        };
        self.overlay_mut().push(element);
    }

    /// Finalize an in-progress stroke: optionally apply the final pointer
    /// position, release pointer capture, and return to `Armed`. No-op in
    /// any other state.
    fn finish_stroke(&mut self, point: Option<Point>) {
        let SessionState::Stroking { tool, anchor, live } = std::mem::take(&mut self.state)
        else {
            return;
        };

        if let Some(p) = point {
            self.update_live(&tool, anchor, live, p);
        }
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_pointer_capture(false);
        }
        self.state = SessionState::Armed { tool };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemark_core::protocol::{MosaicOptions, TextOptions};

    fn shape_options() -> ShapeOptions {
        ShapeOptions {
            stroke_color: "#ff0000".into(),
            stroke_width: 2,
            fill_color: "rgba(255, 0, 0, 0.2)".into(),
            is_enabled: true,
        }
    }

    fn line_options() -> LineOptions {
        LineOptions {
            stroke_color: "#000000".into(),
            stroke_width: 2,
            is_enabled: true,
        }
    }

    fn rectangle_tool() -> ArmedTool {
        ArmedTool::Shape {
            kind: ShapeKind::Rectangle,
            options: shape_options(),
        }
    }

    fn pen_tool() -> ArmedTool {
        ArmedTool::Line {
            kind: LineKind::Pen,
            options: line_options(),
        }
    }

    #[test]
    fn test_arm_from_idle() {
        let mut session = DrawingSession::new();
        assert!(session.is_idle());

        session.arm(rectangle_tool());
        assert!(session.is_armed());
        assert_eq!(session.active_tool(), Some("rectangle"));
    }

    #[test]
    fn test_rectangle_stroke_geometry() {
        let mut session = DrawingSession::new();
        session.arm(rectangle_tool());

        session.pointer_down(Point::new(10.0, 10.0));
        assert!(session.is_stroking());
        assert!(session.overlay().unwrap().pointer_capture());

        session.pointer_move(Point::new(30.0, 20.0));
        session.pointer_up(Point::new(50.0, 30.0));
        assert!(session.is_armed());
        assert!(!session.overlay().unwrap().pointer_capture());

        let overlay = session.overlay().unwrap();
        assert_eq!(overlay.len(), 1);
        match overlay.element(0).unwrap() {
            OverlayElement::Rectangle { bounds, .. } => {
                assert_eq!(bounds.left, 10.0);
                assert_eq!(bounds.top, 10.0);
                assert_eq!(bounds.width, 40.0);
                assert_eq!(bounds.height, 20.0);
            }
            other => panic!("expected rectangle, got {other:?}"),
        }
    }

    #[test]
    fn test_pen_path_accumulates() {
        let mut session = DrawingSession::new();
        session.arm(pen_tool());

        session.pointer_down(Point::new(0.0, 0.0));
        session.pointer_move(Point::new(1.0, 1.0));
        session.pointer_move(Point::new(2.0, 2.0));
        session.pointer_move(Point::new(3.0, 3.0));
        session.pointer_up(Point::new(3.0, 3.0));

        match session.overlay().unwrap().element(0).unwrap() {
            OverlayElement::PenStroke { path, .. } => {
                // three moves plus the final up position
                assert_eq!(path.segments.len(), 4);
                assert_eq!(path.origin, Point::new(0.0, 0.0));
                assert_eq!(path.segments[0], Point::new(1.0, 1.0));
                assert_eq!(path.segments[2], Point::new(3.0, 3.0));
            }
            other => panic!("expected pen stroke, got {other:?}"),
        }
    }

    #[test]
    fn test_pointer_down_while_stroking_starts_new_stroke() {
        let mut session = DrawingSession::new();
        session.arm(rectangle_tool());

        session.pointer_down(Point::new(0.0, 0.0));
        session.pointer_move(Point::new(5.0, 5.0));
        session.pointer_down(Point::new(20.0, 20.0));

        // previous stroke finalized in place, new one started
        assert!(session.is_stroking());
        assert_eq!(session.overlay().unwrap().len(), 2);
    }

    #[test]
    fn test_stop_is_idempotent_from_every_state() {
        let mut session = DrawingSession::new();

        session.stop();
        assert!(session.is_idle());

        session.arm(rectangle_tool());
        session.stop();
        assert!(session.is_idle());

        session.arm(rectangle_tool());
        session.pointer_down(Point::new(1.0, 1.0));
        session.stop();
        assert!(session.is_idle());
        assert!(session.overlay().unwrap().is_empty());
        assert!(!session.overlay().unwrap().pointer_capture());

        session.stop();
        assert!(session.is_idle());
        assert!(session.overlay().unwrap().is_empty());
    }

    #[test]
    fn test_pointer_events_ignored_while_idle() {
        let mut session = DrawingSession::new();
        session.pointer_down(Point::new(1.0, 1.0));
        session.pointer_move(Point::new(2.0, 2.0));
        session.pointer_up(Point::new(3.0, 3.0));

        assert!(session.is_idle());
        assert!(session.overlay().is_none());
    }

    #[test]
    fn test_edit_tool_applies_one_shot_without_stroking() {
        let mut session = DrawingSession::new();
        session.arm(ArmedTool::Edit {
            options: EditOptions::Mosaic(MosaicOptions {
                brush_size: 10,
                is_enabled: true,
            }),
        });

        session.pointer_down(Point::new(7.0, 7.0));
        assert!(session.is_armed(), "edit tools have no stroking phase");

        match session.overlay().unwrap().element(0).unwrap() {
            OverlayElement::MosaicPatch { at, brush_size } => {
                assert_eq!(*at, Point::new(7.0, 7.0));
                assert_eq!(*brush_size, 10);
            }
            other => panic!("expected mosaic patch, got {other:?}"),
        }
    }

    #[test]
    fn test_text_label_placed_then_filled() {
        let mut session = DrawingSession::new();
        session.arm(ArmedTool::Edit {
            options: EditOptions::Text(TextOptions {
                font_size: 16,
                font_color: "#000000".into(),
                is_enabled: true,
            }),
        });

        session.pointer_down(Point::new(4.0, 8.0));
        session.set_text(0, "note");

        match session.overlay().unwrap().element(0).unwrap() {
            OverlayElement::TextLabel {
                text, font_size, ..
            } => {
                assert_eq!(text, "note");
                assert_eq!(*font_size, 16);
            }
            other => panic!("expected text label, got {other:?}"),
        }
    }

    #[test]
    fn test_rearm_finalizes_stroke_and_keeps_elements() {
        let mut session = DrawingSession::new();
        session.arm(rectangle_tool());
        session.pointer_down(Point::new(0.0, 0.0));

        session.arm(pen_tool());
        assert!(session.is_armed());
        assert_eq!(session.active_tool(), Some("pen"));
        assert_eq!(session.overlay().unwrap().len(), 1);
        assert!(!session.overlay().unwrap().pointer_capture());
    }

    #[test]
    fn test_copy_markup_without_overlay() {
        let session = DrawingSession::new();
        let markup = session.copy_markup();
        assert!(markup.starts_with("<svg"));
        assert!(markup.ends_with("</svg>"));
    }
}
