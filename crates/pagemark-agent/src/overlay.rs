//! Overlay layer — the full-viewport container holding transient annotations.
//!
//! The layer is created lazily (one per page) and reused across strokes. It
//! is pointer-transparent except while a stroke holds pointer capture.
//! Finished elements stay in place until an explicit stop clears them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pagemark_core::protocol::{LineOptions, ShapeOptions};

use crate::geometry::{ArrowPose, CircleBounds, Point, RectBounds};

/// Index of an element inside the overlay. Stable until the layer is cleared.
pub type ElementId = usize;

/// Stroke and fill styling for shape elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub stroke_color: String,
    pub stroke_width: u32,
    pub fill_color: String,
}

impl From<&ShapeOptions> for ShapeStyle {
    fn from(options: &ShapeOptions) -> Self {
        Self {
            stroke_color: options.stroke_color.clone(),
            stroke_width: options.stroke_width,
            fill_color: options.fill_color.clone(),
        }
    }
}

/// Stroke styling for line elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub stroke_color: String,
    pub stroke_width: u32,
}

impl From<&LineOptions> for StrokeStyle {
    fn from(options: &LineOptions) -> Self {
        Self {
            stroke_color: options.stroke_color.clone(),
            stroke_width: options.stroke_width,
        }
    }
}

/// A freehand path: one move-to origin plus monotonically accumulated
/// line-to segments. Segments are only ever appended, never replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    pub origin: Point,
    pub segments: Vec<Point>,
}

impl PathData {
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            segments: Vec::new(),
        }
    }

    pub fn line_to(&mut self, point: Point) {
        self.segments.push(point);
    }

    /// Render as an SVG path description: `M x y L x y L x y ...`.
    pub fn to_svg_path(&self) -> String {
        let mut d = format!("M {} {}", self.origin.x, self.origin.y);
        for p in &self.segments {
            d.push_str(&format!(" L {} {}", p.x, p.y));
        }
        d
    }
}

/// One visual node in the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlayElement {
    Rectangle {
        bounds: RectBounds,
        style: ShapeStyle,
    },
    Circle {
        bounds: CircleBounds,
        style: ShapeStyle,
    },
    Arrow {
        anchor: Point,
        pose: ArrowPose,
        style: StrokeStyle,
    },
    PenStroke {
        path: PathData,
        style: StrokeStyle,
    },
    MosaicPatch {
        at: Point,
        brush_size: u32,
    },
    TextLabel {
        at: Point,
        text: String,
        font_size: u32,
        font_color: String,
    },
}

/// The overlay layer: element list plus pointer-capture flag.
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    elements: Vec<OverlayElement>,
    pointer_capture: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Default for OverlayLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayLayer {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            elements: Vec::new(),
            pointer_capture: false,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn push(&mut self, element: OverlayElement) -> ElementId {
        self.elements.push(element);
        self.last_updated = Utc::now();
        self.elements.len() - 1
    }

    pub fn element(&self, id: ElementId) -> Option<&OverlayElement> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut OverlayElement> {
        self.last_updated = Utc::now();
        self.elements.get_mut(id)
    }

    pub fn elements(&self) -> &[OverlayElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Remove every element from the layer.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.last_updated = Utc::now();
    }

    /// Whether the layer currently intercepts pointer events.
    pub fn pointer_capture(&self) -> bool {
        self.pointer_capture
    }

    /// Toggle pointer capture. While captured the layer receives pointer
    /// events; otherwise it is transparent to the page beneath.
    pub fn set_pointer_capture(&mut self, capture: bool) {
        self.pointer_capture = capture;
    }

    /// Render the layer's elements as an SVG fragment.
    pub fn to_markup(&self) -> String {
        let mut out = String::from("<svg xmlns=\"http://www.w3.org/2000/svg\">");
        for element in &self.elements {
            match element {
                OverlayElement::Rectangle { bounds, style } => {
                    out.push_str(&format!(
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" stroke=\"{}\" stroke-width=\"{}\" fill=\"{}\"/>",
                        bounds.left,
                        bounds.top,
                        bounds.width,
                        bounds.height,
                        style.stroke_color,
                        style.stroke_width,
                        style.fill_color,
                    ));
                }
                OverlayElement::Circle { bounds, style } => {
                    out.push_str(&format!(
                        "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" stroke=\"{}\" stroke-width=\"{}\" fill=\"{}\"/>",
                        bounds.cx,
                        bounds.cy,
                        bounds.radius,
                        style.stroke_color,
                        style.stroke_width,
                        style.fill_color,
                    ));
                }
                OverlayElement::Arrow {
                    anchor,
                    pose,
                    style,
                } => {
                    let h = pose.head_size;
                    out.push_str(&format!(
                        "<g transform=\"translate({} {}) rotate({})\"><line x1=\"0\" y1=\"0\" x2=\"{}\" y2=\"0\" stroke=\"{}\" stroke-width=\"{}\"/><polygon points=\"{},0 {},{} {},{}\" fill=\"{}\"/></g>",
                        anchor.x,
                        anchor.y,
                        pose.angle.to_degrees(),
                        pose.length,
                        style.stroke_color,
                        style.stroke_width,
                        pose.length,
                        pose.length - h,
                        -h / 2.0,
                        pose.length - h,
                        h / 2.0,
                        style.stroke_color,
                    ));
                }
                OverlayElement::PenStroke { path, style } => {
                    out.push_str(&format!(
                        "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
                        path.to_svg_path(),
                        style.stroke_color,
                        style.stroke_width,
                    ));
                }
                OverlayElement::MosaicPatch { at, brush_size } => {
                    let size = f64::from(*brush_size);
                    out.push_str(&format!(
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#808080\"/>",
                        at.x - size / 2.0,
                        at.y - size / 2.0,
                        size,
                        size,
                    ));
                }
                OverlayElement::TextLabel {
                    at,
                    text,
                    font_size,
                    font_color,
                } => {
                    out.push_str(&format!(
                        "<text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                        at.x, at.y, font_size, font_color, text,
                    ));
                }
            }
        }
        out.push_str("</svg>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_accumulates_monotonically() {
        let mut path = PathData::new(Point::new(0.0, 0.0));
        path.line_to(Point::new(1.0, 1.0));
        path.line_to(Point::new(2.0, 2.0));
        path.line_to(Point::new(3.0, 3.0));

        let d = path.to_svg_path();
        assert_eq!(d, "M 0 0 L 1 1 L 2 2 L 3 3");
        assert_eq!(d.matches('L').count(), 3);
    }

    #[test]
    fn test_push_and_clear() {
        let mut layer = OverlayLayer::new();
        assert!(layer.is_empty());

        let id = layer.push(OverlayElement::MosaicPatch {
            at: Point::new(5.0, 5.0),
            brush_size: 10,
        });
        assert_eq!(id, 0);
        assert_eq!(layer.len(), 1);

        layer.clear();
        assert!(layer.is_empty());
    }

    #[test]
    fn test_pointer_capture_defaults_off() {
        let mut layer = OverlayLayer::new();
        assert!(!layer.pointer_capture());
        layer.set_pointer_capture(true);
        assert!(layer.pointer_capture());
    }

    #[test]
    fn test_markup_contains_elements() {
        let mut layer = OverlayLayer::new();
        layer.push(OverlayElement::Rectangle {
            bounds: crate::geometry::rect_bounds(Point::new(10.0, 10.0), Point::new(50.0, 30.0)),
            style: ShapeStyle {
                stroke_color: "#ff0000".into(),
                stroke_width: 2,
                fill_color: "rgba(255, 0, 0, 0.2)".into(),
            },
        });
        let markup = layer.to_markup();
        assert!(markup.starts_with("<svg"));
        assert!(markup.contains("<rect x=\"10\" y=\"10\" width=\"40\" height=\"20\""));
        assert!(markup.contains("stroke=\"#ff0000\""));
    }
}
