//! Design object definitions.
//!
//! Every object stores its intrinsic geometry in local coordinates and a
//! [`Placement`] that maps it onto the canvas. The rendered size is always
//! `base_size * scale`, so resizing never rewrites base geometry.

mod arrow;
mod ellipse;
mod freehand;
mod group;
mod image;
mod line;
mod path;
mod polygon;
mod rectangle;
mod text;
mod triangle;

pub use arrow::Arrow;
pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use group::Group;
pub use image::{FilterPreset, Image, ImageFilter, ImageFormat};
pub use line::Line;
pub use path::PathShape;
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use text::{FontWeight, Text, TextAlign};
pub use triangle::Triangle;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Paint attributes shared by every object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill color (None = no fill). For text this is the glyph color.
    pub fill_color: Option<SerializableColor>,
    /// Stroke color (None = no stroke).
    pub stroke_color: Option<SerializableColor>,
    /// Stroke width, never negative.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Filled shape with an outline.
    pub fn filled(fill: SerializableColor, stroke: SerializableColor, stroke_width: f64) -> Self {
        Self {
            fill_color: Some(fill),
            stroke_color: Some(stroke),
            stroke_width,
            opacity: 1.0,
        }
    }

    /// Outline only.
    pub fn stroked(stroke: SerializableColor, stroke_width: f64) -> Self {
        Self {
            fill_color: None,
            stroke_color: Some(stroke),
            stroke_width,
            opacity: 1.0,
        }
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color.map(|c| with_opacity(c, self.opacity))
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Option<Color> {
        self.stroke_color.map(|c| with_opacity(c, self.opacity))
    }
}

fn with_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (color.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill_color: None,
            stroke_color: Some(SerializableColor::black()),
            stroke_width: 2.0,
            opacity: 1.0,
        }
    }
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_rotation(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Where an object sits on the canvas.
///
/// Local geometry is scaled from the origin, rotated about the center of the
/// scaled box and then translated to `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Top-left corner of the unrotated, scaled box.
    pub position: Point,
    /// Rotation in degrees, kept in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Horizontal scale factor relative to the base geometry.
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    /// Vertical scale factor relative to the base geometry.
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Point::ZERO)
    }
}

impl Placement {
    /// Unrotated, unscaled placement at a position.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Size of `base` after scaling.
    pub fn rendered_size(&self, base: Size) -> Size {
        Size::new(base.width * self.scale_x, base.height * self.scale_y)
    }

    /// Local-to-canvas transform for geometry whose local box is `base`.
    pub fn affine(&self, base: Size) -> Affine {
        let scaled = self.rendered_size(base);
        let center = Point::new(scaled.width / 2.0, scaled.height / 2.0);
        Affine::translate(self.position.to_vec2())
            * Affine::rotate_about(self.rotation.to_radians(), center)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

/// Unique identifier for objects.
pub type ShapeId = Uuid;

/// Object kind, used for labels and layer listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Text,
    Rectangle,
    Ellipse,
    Triangle,
    Line,
    Arrow,
    Polygon,
    Path,
    Freehand,
    Image,
    Group,
}

impl ShapeKind {
    /// Human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Text => "Text",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Line => "Line",
            ShapeKind::Arrow => "Arrow",
            ShapeKind::Polygon => "Polygon",
            ShapeKind::Path => "Path",
            ShapeKind::Freehand => "Drawing",
            ShapeKind::Image => "Image",
            ShapeKind::Group => "Group",
        }
    }
}

/// Common trait for all objects.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Intrinsic size of the local geometry, before scaling.
    fn base_size(&self) -> Size;

    /// Get the placement.
    fn placement(&self) -> &Placement;

    /// Get mutable placement.
    fn placement_mut(&mut self) -> &mut Placement;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Axis-aligned bounding box in canvas coordinates.
    fn bounds(&self) -> Rect {
        let base = self.base_size();
        self.placement().affine(base).transform_rect_bbox(base.to_rect())
    }

    /// Check if a canvas point lies within the object's transformed box.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let placement = self.placement();
        if placement.scale_x == 0.0 || placement.scale_y == 0.0 {
            return false;
        }
        let base = self.base_size();
        let local = placement.affine(base).inverse() * point;
        base.to_rect()
            .inflate(
                tolerance / placement.scale_x.abs(),
                tolerance / placement.scale_y.abs(),
            )
            .contains(local)
    }
}

/// A design object. Variant order is irrelevant; z-order lives in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Text(Text),
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Triangle(Triangle),
    Line(Line),
    Arrow(Arrow),
    Polygon(Polygon),
    Path(PathShape),
    Freehand(Freehand),
    Image(Image),
    Group(Group),
}

impl Shape {
    fn as_dyn(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Text(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Triangle(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Polygon(s) => s,
            Shape::Path(s) => s,
            Shape::Freehand(s) => s,
            Shape::Image(s) => s,
            Shape::Group(s) => s,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Text(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Triangle(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Polygon(s) => s,
            Shape::Path(s) => s,
            Shape::Freehand(s) => s,
            Shape::Image(s) => s,
            Shape::Group(s) => s,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.as_dyn().id()
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Text(_) => ShapeKind::Text,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::Triangle(_) => ShapeKind::Triangle,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Arrow(_) => ShapeKind::Arrow,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Path(_) => ShapeKind::Path,
            Shape::Freehand(_) => ShapeKind::Freehand,
            Shape::Image(_) => ShapeKind::Image,
            Shape::Group(_) => ShapeKind::Group,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_dyn().bounds()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_dyn().hit_test(point, tolerance)
    }

    pub fn base_size(&self) -> Size {
        self.as_dyn().base_size()
    }

    /// Size after applying the scale factors.
    pub fn rendered_size(&self) -> Size {
        self.placement().rendered_size(self.base_size())
    }

    pub fn placement(&self) -> &Placement {
        self.as_dyn().placement()
    }

    pub fn placement_mut(&mut self) -> &mut Placement {
        self.as_dyn_mut().placement_mut()
    }

    pub fn style(&self) -> &ShapeStyle {
        self.as_dyn().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.as_dyn_mut().style_mut()
    }

    pub fn position(&self) -> Point {
        self.placement().position
    }

    pub fn set_position(&mut self, position: Point) {
        self.placement_mut().position = position;
    }

    /// Move the object by an offset.
    pub fn translate(&mut self, delta: Vec2) {
        let placement = self.placement_mut();
        placement.position += delta;
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.placement().rotation
    }

    /// Set the rotation; the stored angle is normalized into `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.placement_mut().rotation = normalize_rotation(degrees);
    }

    /// Pull placement and style back into their domains: rotation into
    /// `[0, 360)`, opacity into `[0, 1]`, stroke width to `>= 0`. Non-finite
    /// values fall back to their defaults. Group children are included.
    pub fn sanitize(&mut self) {
        let placement = self.placement_mut();
        placement.rotation = if placement.rotation.is_finite() {
            normalize_rotation(placement.rotation)
        } else {
            0.0
        };
        for scale in [&mut placement.scale_x, &mut placement.scale_y] {
            if !scale.is_finite() {
                *scale = 1.0;
            }
        }

        let style = self.style_mut();
        style.opacity = if style.opacity.is_finite() {
            style.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        style.stroke_width = if style.stroke_width.is_finite() {
            style.stroke_width.max(0.0)
        } else {
            0.0
        };

        if let Some(text) = self.as_text_mut() {
            text.font_size = if text.font_size.is_finite() {
                text.font_size.max(1.0)
            } else {
                Text::DEFAULT_FONT_SIZE
            };
        }
        if let Shape::Group(group) = self {
            for child in group.children_mut() {
                child.sanitize();
            }
        }
    }

    /// Assign a fresh identifier to this object and any nested children.
    /// Used when duplicating or pasting so copies never share an ID.
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            Shape::Text(s) => s.id = new_id,
            Shape::Rectangle(s) => s.id = new_id,
            Shape::Ellipse(s) => s.id = new_id,
            Shape::Triangle(s) => s.id = new_id,
            Shape::Line(s) => s.id = new_id,
            Shape::Arrow(s) => s.id = new_id,
            Shape::Polygon(s) => s.id = new_id,
            Shape::Path(s) => s.id = new_id,
            Shape::Freehand(s) => s.id = new_id,
            Shape::Image(s) => s.id = new_id,
            Shape::Group(s) => {
                s.id = new_id;
                for child in s.children_mut() {
                    child.regenerate_id();
                }
            }
        }
    }

    /// Check if this object is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Shape::Group(_))
    }

    /// Get the group if this object is a group.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get the image if this object is an image.
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Shape::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut Image> {
        match self {
            Shape::Image(img) => Some(img),
            _ => None,
        }
    }
}

/// Bounding box of a set of local points, anchored so the result can be used
/// to re-origin them.
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}

/// Shift points so their bounding box starts at the origin.
/// Returns the shifted points and the former top-left corner.
pub(crate) fn normalize_points(points: &[Point]) -> (Vec<Point>, Point) {
    let bounds = points_bounds(points);
    let origin = bounds.origin();
    let shifted = points
        .iter()
        .map(|p| Point::new(p.x - origin.x, p.y - origin.y))
        .collect();
    (shifted, origin)
}
