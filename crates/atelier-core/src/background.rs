//! Document background: exactly one of a solid color, a gradient or an image.

use crate::shapes::{ImageFormat, SerializableColor};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Start and end colors of the built-in gradient presets.
pub const GRADIENT_PRESET_STOPS: [&str; 2] = ["#6366f1", "#ec4899"];

/// Canvas background. A new assignment fully supersedes the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    Solid { color: SerializableColor },
    Gradient(Gradient),
    Image(BackgroundImage),
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid {
            color: SerializableColor::white(),
        }
    }
}

impl Background {
    pub fn solid(color: SerializableColor) -> Self {
        Background::Solid { color }
    }

    /// Short name of the active background type.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Background::Solid { .. } => "solid",
            Background::Gradient(_) => "gradient",
            Background::Image(_) => "image",
        }
    }

    /// The color when the background is solid.
    pub fn solid_color(&self) -> Option<SerializableColor> {
        match self {
            Background::Solid { color } => Some(*color),
            _ => None,
        }
    }
}

/// Gradient geometry in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GradientKind {
    Linear {
        start: Point,
        end: Point,
    },
    Radial {
        center: Point,
        start_radius: f64,
        end_radius: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f64,
    pub color: SerializableColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Diagonal gradient from the top-left to the bottom-right corner.
    pub fn linear_preset(width: f64, height: f64) -> Self {
        Self {
            kind: GradientKind::Linear {
                start: Point::ZERO,
                end: Point::new(width, height),
            },
            stops: preset_stops(),
        }
    }

    /// Radial gradient from the canvas center out to half the width.
    pub fn radial_preset(width: f64, height: f64) -> Self {
        Self {
            kind: GradientKind::Radial {
                center: Point::new(width / 2.0, height / 2.0),
                start_radius: 0.0,
                end_radius: width / 2.0,
            },
            stops: preset_stops(),
        }
    }
}

fn preset_stops() -> Vec<GradientStop> {
    GRADIENT_PRESET_STOPS
        .iter()
        .enumerate()
        .filter_map(|(i, hex)| {
            SerializableColor::from_hex(hex).map(|color| GradientStop {
                offset: i as f64,
                color,
            })
        })
        .collect()
}

/// A raster image stretched over the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub format: ImageFormat,
    pub data_base64: String,
    pub source_width: u32,
    pub source_height: u32,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl BackgroundImage {
    /// Build a background image scaled so it exactly covers the canvas.
    pub fn covering(
        data: &[u8],
        format: ImageFormat,
        source_width: u32,
        source_height: u32,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Self {
        let scale = |canvas: f64, source: u32| {
            if source == 0 { 1.0 } else { canvas / source as f64 }
        };
        Self {
            format,
            data_base64: STANDARD.encode(data),
            source_width,
            source_height,
            scale_x: scale(canvas_width, source_width),
            scale_y: scale(canvas_height, source_height),
        }
    }

    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_white() {
        assert_eq!(
            Background::default().solid_color(),
            Some(SerializableColor::white())
        );
    }

    #[test]
    fn test_linear_preset_spans_canvas() {
        let gradient = Gradient::linear_preset(800.0, 600.0);
        assert_eq!(
            gradient.kind,
            GradientKind::Linear {
                start: Point::ZERO,
                end: Point::new(800.0, 600.0)
            }
        );
        assert_eq!(gradient.stops.len(), 2);
        assert_eq!(gradient.stops[0].color.to_hex(), "#6366f1");
        assert!((gradient.stops[1].offset - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_radial_preset_radius() {
        let gradient = Gradient::radial_preset(800.0, 600.0);
        match gradient.kind {
            GradientKind::Radial {
                center, end_radius, ..
            } => {
                assert_eq!(center, Point::new(400.0, 300.0));
                assert!((end_radius - 400.0).abs() < f64::EPSILON);
            }
            other => panic!("expected radial gradient, got {other:?}"),
        }
    }

    #[test]
    fn test_background_image_covers_canvas() {
        let image = BackgroundImage::covering(&[1, 2, 3], ImageFormat::Png, 400, 200, 800.0, 600.0);
        assert!((image.scale_x - 2.0).abs() < f64::EPSILON);
        assert!((image.scale_y - 3.0).abs() < f64::EPSILON);
        assert_eq!(image.data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_string(&Background::Gradient(Gradient::linear_preset(1.0, 1.0)))
            .unwrap();
        assert!(json.contains("\"type\":\"gradient\""));
    }
}
