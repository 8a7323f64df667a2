//! Closed polygon shape (stars, hexagons and other outlines).

use super::{Placement, ShapeId, ShapeStyle, ShapeTrait, normalize_points, points_bounds};
use kurbo::{ParamCurveNearest, Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A closed polygon. Vertices are local to the placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub(crate) id: ShapeId,
    pub placement: Placement,
    pub points: Vec<Point>,
    pub style: ShapeStyle,
}

impl Polygon {
    /// Create a polygon from vertices, placing its box at `position`.
    pub fn new(position: Point, points: &[Point]) -> Self {
        let (local, _) = normalize_points(points);
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            points: local,
            style: ShapeStyle::default(),
        }
    }

    /// Regular polygon with `sides` vertices, the first one pointing up.
    pub fn regular(center: Point, radius: f64, sides: usize) -> Self {
        let points: Vec<Point> = (0..sides.max(3))
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / sides.max(3) as f64
                    - std::f64::consts::FRAC_PI_2;
                Point::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        let bounds = points_bounds(&points);
        Self::new(
            Point::new(center.x + bounds.x0, center.y + bounds.y0),
            &points,
        )
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Even-odd containment test in local coordinates.
    fn contains_local(&self, point: Point) -> bool {
        let mut inside = false;
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + n - 1) % n];
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
        }
        inside
    }
}

impl ShapeTrait for Polygon {
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
        if self.points.len() < 3 || self.placement.scale_x == 0.0 || self.placement.scale_y == 0.0
        {
            return false;
        }
        let affine = self.placement.affine(self.base_size());
        if self.contains_local(affine.inverse() * point) {
            return true;
        }
        // Near an edge counts as a hit
        let n = self.points.len();
        (0..n).any(|i| {
            let a = affine * self.points[i];
            let b = affine * self.points[(i + 1) % n];
            kurbo::Line::new(a, b).nearest(point, 1e-6).distance_sq <= tolerance * tolerance
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hexagon() -> Polygon {
        let points = [
            Point::new(50.0, 0.0),
            Point::new(100.0, 25.0),
            Point::new(100.0, 75.0),
            Point::new(50.0, 100.0),
            Point::new(0.0, 75.0),
            Point::new(0.0, 25.0),
        ];
        Polygon::new(Point::new(350.0, 250.0), &points)
    }

    #[test]
    fn test_new_keeps_local_vertices() {
        let hex = hexagon();
        assert_eq!(hex.vertex_count(), 6);
        assert_eq!(hex.base_size(), Size::new(100.0, 100.0));
        assert_eq!(hex.bounds().origin(), Point::new(350.0, 250.0));
    }

    #[test]
    fn test_hit_test_polygon_interior() {
        let hex = hexagon();
        assert!(hex.hit_test(Point::new(400.0, 300.0), 0.0));
        // Top-left corner of the box is outside the hexagon
        assert!(!hex.hit_test(Point::new(352.0, 252.0), 0.0));
    }

    #[test]
    fn test_regular_polygon() {
        let tri = Polygon::regular(Point::new(0.0, 0.0), 10.0, 3);
        assert_eq!(tri.vertex_count(), 3);
        // First vertex points straight up
        assert!((tri.bounds().y0 + 10.0).abs() < 1e-9);
    }
}
