//! Attribute edits applied by property controls.
//!
//! Numeric input is forgiving: out-of-range values are clamped into their
//! domain and non-finite values are ignored, never reported as errors.

use crate::shapes::{
    FilterPreset, FontWeight, SerializableColor, Shape, TextAlign, normalize_rotation,
};
use thiserror::Error;

/// Smallest accepted font size.
pub const MIN_FONT_SIZE: f64 = 1.0;
/// Smallest accepted rendered dimension for [`set_size`].
pub const MIN_DIMENSION: f64 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum AttributeError {
    #[error("unknown attribute `{0}`")]
    UnknownKey(String),
    #[error("invalid value `{value}` for attribute `{key}`")]
    InvalidValue { key: String, value: String },
}

/// A single attribute assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    X(f64),
    Y(f64),
    /// Degrees; normalized into `[0, 360)`.
    Rotation(f64),
    /// Clamped to `[0, 1]`.
    Opacity(f64),
    Fill(Option<SerializableColor>),
    Stroke(Option<SerializableColor>),
    /// Clamped to `>= 0`.
    StrokeWidth(f64),
    FontSize(f64),
    FontFamily(String),
    FontWeight(FontWeight),
    Italic(bool),
    Underline(bool),
    Strikethrough(bool),
    TextAlign(TextAlign),
    Content(String),
}

impl Attribute {
    /// Parse the string form emitted by property controls.
    pub fn parse(key: &str, value: &str) -> Result<Self, AttributeError> {
        let invalid = || AttributeError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let number = || value.trim().parse::<f64>().map_err(|_| invalid());
        let flag = || match value.trim() {
            "true" | "1" | "on" => Ok(true),
            "false" | "0" | "off" | "" => Ok(false),
            _ => Err(invalid()),
        };
        let color = || match value.trim() {
            "" | "none" | "transparent" => Ok(None),
            hex => SerializableColor::from_hex(hex).map(Some).ok_or_else(invalid),
        };

        match key {
            "x" | "left" => number().map(Attribute::X),
            "y" | "top" => number().map(Attribute::Y),
            "rotation" | "angle" => number().map(Attribute::Rotation),
            "opacity" => number().map(Attribute::Opacity),
            "fill" => color().map(Attribute::Fill),
            "stroke" => color().map(Attribute::Stroke),
            "stroke_width" | "strokeWidth" => number().map(Attribute::StrokeWidth),
            "font_size" | "fontSize" => number().map(Attribute::FontSize),
            "font_family" | "fontFamily" => match value.trim() {
                "" => Err(invalid()),
                family => Ok(Attribute::FontFamily(family.to_string())),
            },
            "font_weight" | "fontWeight" => FontWeight::parse(value)
                .map(Attribute::FontWeight)
                .ok_or_else(invalid),
            "italic" => flag().map(Attribute::Italic),
            "fontStyle" => match value.trim() {
                "italic" => Ok(Attribute::Italic(true)),
                "normal" => Ok(Attribute::Italic(false)),
                _ => Err(invalid()),
            },
            "underline" => flag().map(Attribute::Underline),
            "strikethrough" | "linethrough" => flag().map(Attribute::Strikethrough),
            "text_align" | "textAlign" => TextAlign::parse(value)
                .map(Attribute::TextAlign)
                .ok_or_else(invalid),
            "text" | "content" => Ok(Attribute::Content(value.to_string())),
            other => Err(AttributeError::UnknownKey(other.to_string())),
        }
    }

    /// Whether the attribute only exists on text objects.
    pub fn is_text_only(&self) -> bool {
        matches!(
            self,
            Attribute::FontSize(_)
                | Attribute::FontFamily(_)
                | Attribute::FontWeight(_)
                | Attribute::Italic(_)
                | Attribute::Underline(_)
                | Attribute::Strikethrough(_)
                | Attribute::TextAlign(_)
                | Attribute::Content(_)
        )
    }

    /// Clamp the value into its domain. Non-finite numbers yield None.
    pub fn sanitized(self) -> Option<Self> {
        let finite = |v: f64| v.is_finite().then_some(v);
        Some(match self {
            Attribute::X(v) => Attribute::X(finite(v)?),
            Attribute::Y(v) => Attribute::Y(finite(v)?),
            Attribute::Rotation(v) => Attribute::Rotation(normalize_rotation(finite(v)?)),
            Attribute::Opacity(v) => Attribute::Opacity(finite(v)?.clamp(0.0, 1.0)),
            Attribute::StrokeWidth(v) => Attribute::StrokeWidth(finite(v)?.max(0.0)),
            Attribute::FontSize(v) => Attribute::FontSize(finite(v)?.max(MIN_FONT_SIZE)),
            other => other,
        })
    }

    /// Apply to one object. Returns false when the attribute does not apply
    /// to this kind of object or the value was rejected.
    pub fn apply(&self, shape: &mut Shape) -> bool {
        let Some(attribute) = self.clone().sanitized() else {
            return false;
        };
        if attribute.is_text_only() {
            let Some(text) = shape.as_text_mut() else {
                return false;
            };
            match attribute {
                Attribute::FontSize(v) => text.font_size = v,
                Attribute::FontFamily(family) => text.font_family = family,
                Attribute::FontWeight(weight) => text.font_weight = weight,
                Attribute::Italic(on) => text.italic = on,
                Attribute::Underline(on) => text.underline = on,
                Attribute::Strikethrough(on) => text.strikethrough = on,
                Attribute::TextAlign(align) => text.text_align = align,
                Attribute::Content(content) => text.set_content(content),
                _ => return false,
            }
            return true;
        }

        match attribute {
            Attribute::X(v) => shape.placement_mut().position.x = v,
            Attribute::Y(v) => shape.placement_mut().position.y = v,
            Attribute::Rotation(v) => shape.set_rotation(v),
            Attribute::Opacity(v) => shape.style_mut().opacity = v,
            Attribute::Fill(color) => shape.style_mut().fill_color = color,
            Attribute::Stroke(color) => shape.style_mut().stroke_color = color,
            Attribute::StrokeWidth(v) => shape.style_mut().stroke_width = v,
            _ => return false,
        }
        true
    }
}

/// Which rendered dimension a resize targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

/// Resize by recomputing the scale factor from the base geometry.
///
/// The base geometry is never rewritten, so `set_size` back to the base
/// value always yields a scale of exactly 1.0.
pub fn set_size(shape: &mut Shape, dimension: Dimension, value: f64) -> bool {
    if !value.is_finite() {
        return false;
    }
    let base = shape.base_size();
    let base = match dimension {
        Dimension::Width => base.width,
        Dimension::Height => base.height,
    };
    if base <= 0.0 {
        return false;
    }
    let scale = value.max(MIN_DIMENSION) / base;
    let placement = shape.placement_mut();
    match dimension {
        Dimension::Width => placement.scale_x = scale,
        Dimension::Height => placement.scale_y = scale,
    }
    true
}

/// On/off text styling buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextToggle {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

/// Flip a text style. Non-text objects are left alone.
pub fn toggle(shape: &mut Shape, toggle: TextToggle) -> bool {
    let Some(text) = shape.as_text_mut() else {
        return false;
    };
    match toggle {
        TextToggle::Bold => {
            text.font_weight = if text.font_weight == FontWeight::Bold {
                FontWeight::Normal
            } else {
                FontWeight::Bold
            }
        }
        TextToggle::Italic => text.italic = !text.italic,
        TextToggle::Underline => text.underline = !text.underline,
        TextToggle::Strikethrough => text.strikethrough = !text.strikethrough,
    }
    true
}

/// Image filter edits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterEdit {
    /// Replace the whole filter list with one preset.
    Preset(FilterPreset),
    /// Brightness in `[-1, 1]`, replacing any previous brightness filter.
    Brightness(f64),
    /// Remove every filter.
    Clear,
}

impl FilterEdit {
    /// Build a brightness edit from a slider percentage (-100..=100).
    pub fn brightness_percent(percent: f64) -> Self {
        FilterEdit::Brightness(percent / 100.0)
    }

    /// Apply to an image. Returns false for other kinds or non-finite input.
    pub fn apply(&self, shape: &mut Shape) -> bool {
        let Some(image) = shape.as_image_mut() else {
            return false;
        };
        match *self {
            FilterEdit::Preset(preset) => image.filters = vec![preset.filter()],
            FilterEdit::Brightness(amount) => {
                if !amount.is_finite() {
                    return false;
                }
                image.set_brightness(amount);
            }
            FilterEdit::Clear => image.filters.clear(),
        }
        true
    }
}
