//! Text shape.

use super::{Placement, SerializableColor, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    Light,
    /// Regular weight (default).
    #[default]
    Normal,
    SemiBold,
    Bold,
}

impl FontWeight {
    /// CSS-style weight value.
    pub fn css_value(&self) -> &'static str {
        match self {
            FontWeight::Light => "300",
            FontWeight::Normal => "normal",
            FontWeight::SemiBold => "600",
            FontWeight::Bold => "bold",
        }
    }

    /// Parse a CSS-style weight (`"bold"`, `"600"`, `"normal"`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" | "300" => Some(FontWeight::Light),
            "normal" | "regular" | "400" => Some(FontWeight::Normal),
            "semibold" | "semi-bold" | "600" => Some(FontWeight::SemiBold),
            "bold" | "700" => Some(FontWeight::Bold),
            _ => None,
        }
    }

    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            FontWeight::Light => "Light",
            FontWeight::Normal => "Normal",
            FontWeight::SemiBold => "Semi Bold",
            FontWeight::Bold => "Bold",
        }
    }

    fn width_factor(&self) -> f64 {
        match self {
            FontWeight::Light => 0.50,
            FontWeight::Normal => 0.55,
            FontWeight::SemiBold => 0.58,
            FontWeight::Bold => 0.60,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

/// A text object. The glyph color is the style's fill color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    pub placement: Placement,
    content: String,
    pub font_family: String,
    /// Font size, always > 0.
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub text_align: TextAlign,
    pub style: ShapeStyle,
}

impl Text {
    pub const DEFAULT_FONT_FAMILY: &'static str = "Montserrat";
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Create a new text object with black glyphs.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            content,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: FontWeight::Normal,
            italic: false,
            underline: false,
            strikethrough: false,
            text_align: TextAlign::Left,
            style: ShapeStyle {
                fill_color: Some(SerializableColor::black()),
                stroke_color: None,
                stroke_width: 0.0,
                opacity: 1.0,
            },
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn with_font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    pub fn set_content(&mut self, content: String) {
        self.content = content;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Approximate width from the widest line; real metrics belong to the engine.
    fn approximate_width(&self) -> f64 {
        let max_line_len = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let italic_slant = if self.italic { 1.05 } else { 1.0 };
        max_line_len as f64 * self.font_size * self.font_weight.width_factor() * italic_slant
    }

    /// Approximate height from the line count at 1.2 line spacing.
    fn approximate_height(&self) -> f64 {
        let line_count = self.content.lines().count().max(1);
        let line_count = if self.content.ends_with('\n') {
            line_count + 1
        } else {
            line_count
        };
        line_count as f64 * self.font_size * 1.2
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn base_size(&self) -> Size {
        Size::new(self.approximate_width(), self.approximate_height())
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
    fn test_text_creation() {
        let text = Text::new(Point::new(100.0, 100.0), "Hello".to_string());
        assert_eq!(text.content(), "Hello");
        assert_eq!(text.font_family, "Montserrat");
        assert_eq!(text.style.fill_color, Some(SerializableColor::black()));
    }

    #[test]
    fn test_multiline_height() {
        let text = Text::new(Point::ZERO, "one\ntwo\n".to_string()).with_font_size(10.0);
        assert!((text.base_size().height - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = Text::new(Point::ZERO, "Heading".to_string());
        let bold = regular.clone().with_font_weight(FontWeight::Bold);
        assert!(bold.base_size().width > regular.base_size().width);
    }

    #[test]
    fn test_weight_parse() {
        assert_eq!(FontWeight::parse("bold"), Some(FontWeight::Bold));
        assert_eq!(FontWeight::parse("600"), Some(FontWeight::SemiBold));
        assert_eq!(FontWeight::parse("Normal"), Some(FontWeight::Normal));
        assert_eq!(FontWeight::parse("heavy"), None);
        assert_eq!(TextAlign::parse("center"), Some(TextAlign::Center));
    }
}
