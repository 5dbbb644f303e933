//! Pure geometry for the drawing tools.
//!
//! Every function here maps an anchor point and the current pointer position
//! to element geometry, with no dependency on session or overlay state.

use serde::{Deserialize, Serialize};

/// A point in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RectBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned box spanning anchor to current, regardless of drag direction.
pub fn rect_bounds(anchor: Point, current: Point) -> RectBounds {
    RectBounds {
        left: anchor.x.min(current.x),
        top: anchor.y.min(current.y),
        width: (current.x - anchor.x).abs(),
        height: (current.y - anchor.y).abs(),
    }
}

/// A circle centered between anchor and current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CircleBounds {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

/// Circle centered at the midpoint of anchor and current, with radius equal
/// to half their distance.
pub fn circle_from(anchor: Point, current: Point) -> CircleBounds {
    CircleBounds {
        cx: (anchor.x + current.x) / 2.0,
        cy: (anchor.y + current.y) / 2.0,
        radius: anchor.distance_to(current) / 2.0,
    }
}

/// Side length of the triangular arrow head, in page pixels.
pub const ARROW_HEAD_SIZE: f64 = 10.0;

/// An arrow's line segment: length and rotation from its anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrowPose {
    /// Length of the shaft from anchor to tip.
    pub length: f64,
    /// Rotation in radians, `atan2(dy, dx)`.
    pub angle: f64,
    /// Side length of the head triangle at the tip.
    pub head_size: f64,
}

pub fn arrow_pose(anchor: Point, current: Point) -> ArrowPose {
    ArrowPose {
        length: anchor.distance_to(current),
        angle: (current.y - anchor.y).atan2(current.x - anchor.x),
        head_size: ARROW_HEAD_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_rect_bounds_forward_drag() {
        let bounds = rect_bounds(Point::new(10.0, 10.0), Point::new(50.0, 30.0));
        assert_eq!(bounds.left, 10.0);
        assert_eq!(bounds.top, 10.0);
        assert_eq!(bounds.width, 40.0);
        assert_eq!(bounds.height, 20.0);
    }

    #[test]
    fn test_rect_bounds_reverse_drag() {
        let bounds = rect_bounds(Point::new(50.0, 30.0), Point::new(10.0, 10.0));
        assert_eq!(bounds.left, 10.0);
        assert_eq!(bounds.top, 10.0);
        assert_eq!(bounds.width, 40.0);
        assert_eq!(bounds.height, 20.0);
    }

    #[test]
    fn test_circle_radius_is_half_distance() {
        let circle = circle_from(Point::new(10.0, 10.0), Point::new(50.0, 30.0));
        let expected = (40.0f64.powi(2) + 20.0f64.powi(2)).sqrt() / 2.0;
        assert!((circle.radius - expected).abs() < EPSILON);
        assert!((circle.radius - 22.360679774997898).abs() < 1e-9);
        assert_eq!(circle.cx, 30.0);
        assert_eq!(circle.cy, 20.0);
    }

    #[test]
    fn test_arrow_pose_diagonal() {
        let pose = arrow_pose(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!((pose.angle - std::f64::consts::FRAC_PI_4).abs() < EPSILON);
        assert!((pose.length - 200.0f64.sqrt()).abs() < EPSILON);
        assert_eq!(pose.head_size, ARROW_HEAD_SIZE);
    }

    #[test]
    fn test_arrow_pose_negative_quadrant() {
        let pose = arrow_pose(Point::new(10.0, 10.0), Point::new(0.0, 10.0));
        assert!((pose.angle - std::f64::consts::PI).abs() < EPSILON);
        assert!((pose.length - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_length_drag() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(rect_bounds(p, p).width, 0.0);
        assert_eq!(circle_from(p, p).radius, 0.0);
        assert_eq!(arrow_pose(p, p).length, 0.0);
    }
}
