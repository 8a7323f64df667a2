//! Arrow shape.

use super::{Placement, ShapeId, ShapeStyle, ShapeTrait, normalize_points};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line with a triangular head at its end point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ShapeId,
    pub placement: Placement,
    /// Tail in local coordinates.
    pub start: Point,
    /// Tip in local coordinates (where the head points).
    pub end: Point,
    /// Size of the arrowhead.
    pub head_size: f64,
    pub style: ShapeStyle,
}

impl Arrow {
    pub const DEFAULT_HEAD_SIZE: f64 = 20.0;

    /// Create an arrow between two canvas points.
    pub fn new(start: Point, end: Point) -> Self {
        let (local, origin) = normalize_points(&[start, end]);
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(origin),
            start: local[0],
            end: local[1],
            head_size: Self::DEFAULT_HEAD_SIZE,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Unit direction from tail to tip, or None for a zero-length arrow.
    pub fn direction(&self) -> Option<Vec2> {
        let delta = self.end - self.start;
        let len = delta.hypot();
        (len > f64::EPSILON).then(|| delta / len)
    }

    /// Head triangle in local coordinates: tip, left barb, right barb.
    pub fn head_points(&self) -> Option<[Point; 3]> {
        let dir = self.direction()?;
        let perp = Vec2::new(-dir.y, dir.x);
        let base = self.end - dir * self.head_size;
        let half = self.head_size / 2.0;
        Some([self.end, base + perp * half, base - perp * half])
    }
}

impl ShapeTrait for Arrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn base_size(&self) -> Size {
        Size::new(
            (self.end.x - self.start.x).abs(),
            (self.end.y - self.start.y).abs(),
        )
    }

    fn placement(&self) -> &Placement {
        &self.placement
    }

    fn placement_mut(&mut self) -> &mut Placement {
        &mut self.placement
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_points_horizontal() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let [tip, left, right] = arrow.head_points().unwrap();
        assert_eq!(tip, Point::new(100.0, 0.0));
        assert!((left.x - 80.0).abs() < 1e-9);
        assert!((left.y - 10.0).abs() < 1e-9);
        assert!((right.y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_arrow_has_no_head() {
        let arrow = Arrow::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert!(arrow.direction().is_none());
        assert!(arrow.head_points().is_none());
    }
}
