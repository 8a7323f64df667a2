//! One-click text and shape presets, centred on the canvas.

use crate::shapes::{
    Arrow, Ellipse, FontWeight, Line, PathShape, Polygon, Rectangle, SerializableColor, Shape,
    ShapeStyle, Text, Triangle,
};
use kurbo::{Point, Size};

/// Colour swatches offered by the property controls.
pub const PALETTE: [&str; 15] = [
    "#000000", "#FFFFFF", "#6366f1", "#ec4899", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6",
    "#06b6d4", "#84cc16", "#f97316", "#14b8a6", "#a855f7", "#eab308", "#64748b",
];

/// Parsed palette colours.
pub fn palette() -> Vec<SerializableColor> {
    PALETTE.iter().filter_map(|hex| SerializableColor::from_hex(hex)).collect()
}

const STAR_POINTS: [(f64, f64); 10] = [
    (50.0, 0.0),
    (61.0, 35.0),
    (98.0, 35.0),
    (68.0, 57.0),
    (79.0, 91.0),
    (50.0, 70.0),
    (21.0, 91.0),
    (32.0, 57.0),
    (2.0, 35.0),
    (39.0, 35.0),
];

const HEXAGON_POINTS: [(f64, f64); 6] = [
    (50.0, 0.0),
    (100.0, 25.0),
    (100.0, 75.0),
    (50.0, 100.0),
    (0.0, 75.0),
    (0.0, 25.0),
];

const HEART_PATH: &str = "M 50,30 C 50,20 40,10 30,10 20,10 10,20 10,30 10,45 25,60 50,80 \
                          75,60 90,45 90,30 90,20 80,10 70,10 60,10 50,20 50,30 Z";

fn hex(color: &str) -> SerializableColor {
    SerializableColor::from_hex(color).unwrap_or_else(SerializableColor::black)
}

fn points(raw: &[(f64, f64)]) -> Vec<Point> {
    raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// Text presets of the text tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPreset {
    Heading,
    Subheading,
    Body,
}

impl TextPreset {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "heading" => Some(TextPreset::Heading),
            "subheading" => Some(TextPreset::Subheading),
            "body" => Some(TextPreset::Body),
            _ => None,
        }
    }

    pub fn content(&self) -> &'static str {
        match self {
            TextPreset::Heading => "Add Heading",
            TextPreset::Subheading => "Add Subheading",
            TextPreset::Body => "Add body text",
        }
    }

    pub fn font_size(&self) -> f64 {
        match self {
            TextPreset::Heading => 48.0,
            TextPreset::Subheading => 32.0,
            TextPreset::Body => 18.0,
        }
    }

    pub fn font_weight(&self) -> FontWeight {
        match self {
            TextPreset::Heading => FontWeight::Bold,
            TextPreset::Subheading => FontWeight::SemiBold,
            TextPreset::Body => FontWeight::Normal,
        }
    }

    /// Build the text object centred on a canvas of `canvas` size.
    pub fn build(&self, canvas: Size) -> Shape {
        let text = Text::new(Point::ZERO, self.content().to_string())
            .with_font_family(Text::DEFAULT_FONT_FAMILY)
            .with_font_size(self.font_size())
            .with_font_weight(self.font_weight());
        let mut shape = Shape::Text(text);
        let size = shape.rendered_size();
        shape.set_position(Point::new(
            (canvas.width - size.width) / 2.0,
            (canvas.height - size.height) / 2.0,
        ));
        shape
    }
}

/// Shape presets of the shapes tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapePreset {
    Rectangle,
    Circle,
    Triangle,
    Line,
    Arrow,
    Star,
    Heart,
    Hexagon,
}

impl ShapePreset {
    pub fn all() -> &'static [ShapePreset] {
        &[
            ShapePreset::Rectangle,
            ShapePreset::Circle,
            ShapePreset::Triangle,
            ShapePreset::Line,
            ShapePreset::Arrow,
            ShapePreset::Star,
            ShapePreset::Heart,
            ShapePreset::Hexagon,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapePreset::Rectangle => "rectangle",
            ShapePreset::Circle => "circle",
            ShapePreset::Triangle => "triangle",
            ShapePreset::Line => "line",
            ShapePreset::Arrow => "arrow",
            ShapePreset::Star => "star",
            ShapePreset::Heart => "heart",
            ShapePreset::Hexagon => "hexagon",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|preset| preset.name() == name)
    }

    /// Build the preset around the centre of a canvas of `canvas` size.
    pub fn build(&self, canvas: Size) -> Result<Shape, kurbo::SvgParseError> {
        let (cx, cy) = (canvas.width / 2.0, canvas.height / 2.0);
        let shape = match self {
            ShapePreset::Rectangle => Shape::Rectangle(
                Rectangle::new(Point::new(cx - 75.0, cy - 50.0), 150.0, 100.0)
                    .with_style(ShapeStyle::filled(hex("#6366f1"), hex("#4f46e5"), 2.0)),
            ),
            ShapePreset::Circle => Shape::Ellipse(
                Ellipse::circle(Point::new(cx, cy), 60.0)
                    .with_style(ShapeStyle::filled(hex("#ec4899"), hex("#db2777"), 2.0)),
            ),
            ShapePreset::Triangle => Shape::Triangle(
                Triangle::new(Point::new(cx - 60.0, cy - 60.0), 120.0, 120.0)
                    .with_style(ShapeStyle::filled(hex("#10b981"), hex("#059669"), 2.0)),
            ),
            ShapePreset::Line => Shape::Line(
                Line::new(Point::new(cx - 100.0, cy), Point::new(cx + 100.0, cy))
                    .with_style(ShapeStyle::stroked(hex("#333333"), 3.0)),
            ),
            ShapePreset::Arrow => {
                let dark = hex("#333333");
                Shape::Arrow(
                    Arrow::new(Point::new(cx - 60.0, cy), Point::new(cx + 40.0, cy))
                        .with_style(ShapeStyle::filled(dark, dark, 3.0)),
                )
            }
            ShapePreset::Star => Shape::Polygon(
                Polygon::new(Point::new(cx - 50.0, cy - 45.0), &points(&STAR_POINTS))
                    .with_style(ShapeStyle::filled(hex("#f59e0b"), hex("#d97706"), 2.0)),
            ),
            ShapePreset::Heart => Shape::Path(
                PathShape::new(Point::new(cx - 50.0, cy - 40.0), HEART_PATH)?
                    .with_style(ShapeStyle::filled(hex("#ef4444"), hex("#dc2626"), 2.0)),
            ),
            ShapePreset::Hexagon => Shape::Polygon(
                Polygon::new(Point::new(cx - 50.0, cy - 50.0), &points(&HEXAGON_POINTS))
                    .with_style(ShapeStyle::filled(hex("#8b5cf6"), hex("#7c3aed"), 2.0)),
            ),
        };
        Ok(shape)
    }
}
