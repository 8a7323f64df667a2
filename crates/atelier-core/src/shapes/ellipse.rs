//! Ellipse shape.

use super::{Placement, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ellipse shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    pub placement: Placement,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
    pub style: ShapeStyle,
}

impl Ellipse {
    /// Create a new ellipse centered on `center`.
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(center - Vec2::new(radius_x, radius_y)),
            radius_x,
            radius_y,
            style: ShapeStyle::default(),
        }
    }

    /// Create a circle.
    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(center, radius, radius)
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Center in canvas coordinates.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn base_size(&self) -> Size {
        Size::new(self.radius_x * 2.0, self.radius_y * 2.0)
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
        let placement = &self.placement;
        if placement.scale_x == 0.0 || placement.scale_y == 0.0 {
            return false;
        }
        let local = placement.affine(self.base_size()).inverse() * point;
        let rx = self.radius_x + tolerance / placement.scale_x.abs();
        let ry = self.radius_y + tolerance / placement.scale_y.abs();
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let dx = (local.x - self.radius_x) / rx;
        let dy = (local.y - self.radius_y) / ry;
        dx * dx + dy * dy <= 1.0
    }
}
