//! Freehand brush stroke.

use super::{Placement, ShapeId, ShapeStyle, ShapeTrait, normalize_points, points_bounds};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed brush stroke (series of points, local to the placement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    pub placement: Placement,
    /// Points in the stroke, relative to the placement position.
    pub points: Vec<Point>,
    pub style: ShapeStyle,
}

impl Freehand {
    /// Create a stroke from canvas points.
    pub fn from_points(points: &[Point]) -> Self {
        let (local, origin) = normalize_points(points);
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(origin),
            points: local,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Distance from `point` to the segment `start..end`.
fn segment_distance(point: Point, start: Point, end: Point) -> f64 {
    let line_vec: Vec2 = end - start;
    let point_vec: Vec2 = point - start;
    let line_len_sq = line_vec.hypot2();
    if line_len_sq < f64::EPSILON {
        return point_vec.hypot();
    }
    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    (point - (start + line_vec * t)).hypot()
}

impl ShapeTrait for Freehand {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn base_size(&self) -> Size {
        points_bounds(&self.points).size()
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

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let affine = self.placement.affine(self.base_size());
        let reach = tolerance + self.style.stroke_width / 2.0;
        match self.points.as_slice() {
            [] => false,
            [only] => (point - affine * *only).hypot() <= reach,
            points => points
                .windows(2)
                .any(|w| segment_distance(point, affine * w[0], affine * w[1]) <= reach),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_normalizes() {
        let stroke = Freehand::from_points(&[
            Point::new(110.0, 220.0),
            Point::new(150.0, 200.0),
            Point::new(130.0, 260.0),
        ]);
        assert_eq!(stroke.placement.position, Point::new(110.0, 200.0));
        assert_eq!(stroke.points[0], Point::new(0.0, 20.0));
        assert_eq!(stroke.base_size(), Size::new(40.0, 60.0));
        assert_eq!(stroke.len(), 3);
    }

    #[test]
    fn test_hit_test_near_segment() {
        let mut stroke = Freehand::from_points(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        stroke.style.stroke_width = 4.0;
        assert!(stroke.hit_test(Point::new(50.0, 3.0), 1.0));
        assert!(!stroke.hit_test(Point::new(50.0, 10.0), 1.0));
    }

    #[test]
    fn test_empty_stroke() {
        let stroke = Freehand::from_points(&[]);
        assert!(stroke.is_empty());
        assert!(!stroke.hit_test(Point::ZERO, 5.0));
    }
}
