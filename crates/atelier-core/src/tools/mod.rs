//! Editor tools and freehand brush state.

mod presets;

pub use presets::{PALETTE, ShapePreset, TextPreset, palette};

use crate::background::Background;
use crate::engine::BrushSettings;
use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};

/// Tool panels of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Text,
    Shapes,
    Draw,
    Image,
    Background,
    Layers,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Text => "text",
            ToolKind::Shapes => "shapes",
            ToolKind::Draw => "draw",
            ToolKind::Image => "image",
            ToolKind::Background => "background",
            ToolKind::Layers => "layers",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tool| tool.name() == name)
    }

    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Select,
            ToolKind::Text,
            ToolKind::Shapes,
            ToolKind::Draw,
            ToolKind::Image,
            ToolKind::Background,
            ToolKind::Layers,
        ]
    }
}

/// Pen or eraser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushMode {
    #[default]
    Pen,
    /// Paints with the background color.
    Eraser,
}

/// Manages the current tool and the freehand brush.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    pub brush_color: SerializableColor,
    pub brush_width: f64,
    pub eraser_width: f64,
    brush_mode: BrushMode,
    /// Whether freehand input is on.
    drawing: bool,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new(SerializableColor::black(), 5.0, 20.0)
    }
}

impl ToolManager {
    pub fn new(brush_color: SerializableColor, brush_width: f64, eraser_width: f64) -> Self {
        Self {
            current_tool: ToolKind::Select,
            brush_color,
            brush_width,
            eraser_width,
            brush_mode: BrushMode::Pen,
            drawing: false,
        }
    }

    /// Switch tools. Any tool switch leaves drawing mode.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.drawing = false;
    }

    /// Turn freehand input on with the given brush mode.
    pub fn start_drawing(&mut self, mode: BrushMode) {
        self.current_tool = ToolKind::Draw;
        self.brush_mode = mode;
        self.drawing = true;
    }

    pub fn stop_drawing(&mut self) {
        self.drawing = false;
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn brush_mode(&self) -> BrushMode {
        self.brush_mode
    }

    /// Brush for the engine, or None outside drawing mode.
    ///
    /// The eraser paints with the solid background color, or white when the
    /// background is not a solid color.
    pub fn brush(&self, background: &Background) -> Option<BrushSettings> {
        if !self.drawing {
            return None;
        }
        Some(match self.brush_mode {
            BrushMode::Pen => BrushSettings {
                color: self.brush_color,
                width: self.brush_width,
            },
            BrushMode::Eraser => BrushSettings {
                color: background
                    .solid_color()
                    .unwrap_or_else(SerializableColor::white),
                width: self.eraser_width,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Gradient;

    #[test]
    fn test_switching_tool_leaves_drawing_mode() {
        let mut tools = ToolManager::default();
        tools.start_drawing(BrushMode::Pen);
        assert!(tools.is_drawing());
        assert_eq!(tools.current_tool, ToolKind::Draw);

        tools.set_tool(ToolKind::Text);
        assert!(!tools.is_drawing());
        assert!(tools.brush(&Background::default()).is_none());
    }

    #[test]
    fn test_pen_brush() {
        let mut tools = ToolManager::default();
        tools.start_drawing(BrushMode::Pen);
        let brush = tools.brush(&Background::default()).unwrap();
        assert_eq!(brush.color, SerializableColor::black());
        assert_eq!(brush.width, 5.0);
    }

    #[test]
    fn test_eraser_uses_background() {
        let mut tools = ToolManager::default();
        tools.start_drawing(BrushMode::Eraser);

        let beige = SerializableColor::new(245, 240, 230, 255);
        let brush = tools.brush(&Background::solid(beige)).unwrap();
        assert_eq!(brush.color, beige);
        assert_eq!(brush.width, 20.0);

        let gradient = Background::Gradient(Gradient::linear_preset(10.0, 10.0));
        assert_eq!(tools.brush(&gradient).unwrap().color, SerializableColor::white());
    }

    #[test]
    fn test_tool_names() {
        for tool in ToolKind::all() {
            assert_eq!(ToolKind::parse(tool.name()), Some(*tool));
        }
        assert_eq!(ToolKind::parse("lasso"), None);
    }
}
