//! Group shape for combining multiple objects.

use super::{Placement, Shape, ShapeId, ShapeStyle, ShapeTrait, normalize_rotation};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Objects manipulated as a single unit. Groups can be nested.
///
/// Children are stored in group-local coordinates; the group placement maps
/// them onto the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub(crate) id: ShapeId,
    pub placement: Placement,
    /// Child objects, bottom-most first.
    children: Vec<Shape>,
    /// Group-level opacity (fill/stroke are unused).
    style: ShapeStyle,
}

impl Group {
    /// Create a group from objects in canvas coordinates.
    pub fn new(mut children: Vec<Shape>) -> Self {
        let origin = union_bounds(&children).origin();
        for child in &mut children {
            child.translate(Vec2::new(-origin.x, -origin.y));
        }
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(origin),
            children,
            style: ShapeStyle {
                fill_color: None,
                stroke_color: None,
                stroke_width: 0.0,
                opacity: 1.0,
            },
        }
    }

    /// Get the children of this group.
    pub fn children(&self) -> &[Shape] {
        &self.children
    }

    /// Get mutable access to children.
    pub fn children_mut(&mut self) -> &mut Vec<Shape> {
        &mut self.children
    }

    /// Dissolve this group, returning its children in canvas coordinates.
    ///
    /// Each child keeps its center under the group transform and inherits the
    /// group's scale and rotation.
    pub fn ungroup(self) -> Vec<Shape> {
        let affine = self.placement.affine(self.base_size());
        let placement = self.placement;
        self.children
            .into_iter()
            .map(|mut child| {
                let center = affine * child.bounds().center();
                let child_placement = child.placement_mut();
                child_placement.scale_x *= placement.scale_x;
                child_placement.scale_y *= placement.scale_y;
                child_placement.rotation =
                    normalize_rotation(child_placement.rotation + placement.rotation);
                let size = child.rendered_size();
                child.set_position(Point::new(
                    center.x - size.width / 2.0,
                    center.y - size.height / 2.0,
                ));
                child
            })
            .collect()
    }

    /// Get all object IDs in this group (including nested groups).
    pub fn all_shape_ids(&self) -> Vec<ShapeId> {
        let mut ids = vec![self.id];
        for child in &self.children {
            if let Shape::Group(group) = child {
                ids.extend(group.all_shape_ids());
            } else {
                ids.push(child.id());
            }
        }
        ids
    }

    /// Find an object by ID within this group (including nested groups).
    pub fn find_shape(&self, id: ShapeId) -> Option<&Shape> {
        for child in &self.children {
            if child.id() == id {
                return Some(child);
            }
            if let Shape::Group(group) = child {
                if let Some(found) = group.find_shape(id) {
                    return Some(found);
                }
            }
        }
        None
    }
}

fn union_bounds(children: &[Shape]) -> Rect {
    children
        .iter()
        .map(Shape::bounds)
        .reduce(|acc, b| acc.union(b))
        .unwrap_or(Rect::ZERO)
}

impl ShapeTrait for Group {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn base_size(&self) -> Size {
        let bounds = union_bounds(&self.children);
        Size::new(bounds.x1.max(0.0), bounds.y1.max(0.0))
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
        let local_tolerance = tolerance / placement.scale_x.abs().max(placement.scale_y.abs());
        self.children
            .iter()
            .any(|child| child.hit_test(local, local_tolerance))
    }
}
