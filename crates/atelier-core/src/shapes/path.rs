//! Arbitrary outline described by SVG path data (hearts, custom glyphs).

use super::{Placement, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shape backed by SVG path data. The path box is re-originated so its
/// top-left corner sits at the placement position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathShape {
    pub(crate) id: ShapeId,
    pub placement: Placement,
    /// SVG path data (`d` attribute).
    data: String,
    pub style: ShapeStyle,
}

impl PathShape {
    /// Parse SVG path data and place its bounding box at `position`.
    pub fn new(position: Point, data: &str) -> Result<Self, kurbo::SvgParseError> {
        BezPath::from_svg(data)?;
        Ok(Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            data: data.to_string(),
            style: ShapeStyle::default(),
        })
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Parsed path, in its own coordinate space.
    pub fn path(&self) -> BezPath {
        BezPath::from_svg(&self.data).unwrap_or_default()
    }

    /// Bounding box of the raw path data.
    pub fn path_bounds(&self) -> Rect {
        let path = self.path();
        if path.elements().is_empty() {
            Rect::ZERO
        } else {
            path.bounding_box()
        }
    }
}

impl ShapeTrait for PathShape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn base_size(&self) -> Size {
        self.path_bounds().size()
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
    fn test_path_box_is_reoriginated() {
        let shape = PathShape::new(Point::new(5.0, 5.0), "M 10,10 L 30,10 L 30,50 Z").unwrap();
        assert_eq!(shape.base_size(), Size::new(20.0, 40.0));
        let bounds = shape.bounds();
        assert!((bounds.x0 - 5.0).abs() < 1e-9);
        assert!((bounds.y1 - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_path_rejected() {
        assert!(PathShape::new(Point::ZERO, "M 10,10 X 20,20").is_err());
    }
}
