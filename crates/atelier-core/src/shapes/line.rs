//! Line shape.

use super::{Placement, ShapeId, ShapeStyle, ShapeTrait, normalize_points};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight line segment.
///
/// Endpoints are stored relative to the placement position so that moving
/// the line never rewrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    pub placement: Placement,
    /// Start point in local coordinates.
    pub start: Point,
    /// End point in local coordinates.
    pub end: Point,
    pub style: ShapeStyle,
}

impl Line {
    /// Create a line between two canvas points.
    pub fn new(start: Point, end: Point) -> Self {
        let (local, origin) = normalize_points(&[start, end]);
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(origin),
            start: local[0],
            end: local[1],
            style: ShapeStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Length of the unscaled segment.
    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }

    /// Endpoints in canvas coordinates.
    pub fn endpoints(&self) -> (Point, Point) {
        let affine = self.placement.affine(self.base_size());
        (affine * self.start, affine * self.end)
    }
}

impl ShapeTrait for Line {
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
