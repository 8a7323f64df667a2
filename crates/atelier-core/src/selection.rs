//! Active selection tracking and the property panel derived from it.

use crate::document::DesignDocument;
use crate::shapes::{Shape, ShapeId, ShapeKind, TextAlign};
use serde::Serialize;

/// Tracks which objects are targeted by edits.
///
/// Selection order is kept: the first entry is the one single-object
/// property edits apply to.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    /// Currently selected objects, in the order they were reported.
    selected: Vec<ShapeId>,
    /// Text object with keyboard focus (inline editing).
    editing: Option<ShapeId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with the objects carried by a selection event.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.selected.clear();
        for id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        self.drop_stale_editing();
    }

    /// Select a single object (clears other selections).
    pub fn select(&mut self, id: ShapeId) {
        self.set([id]);
    }

    /// Add an object to the selection.
    pub fn add(&mut self, id: ShapeId) {
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }

    /// Remove an object from the selection.
    pub fn deselect(&mut self, id: ShapeId) {
        self.selected.retain(|&s| s != id);
        self.drop_stale_editing();
    }

    /// Clear all selections.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.editing = None;
    }

    /// First selected object, the target of single-object edits.
    pub fn active(&self) -> Option<ShapeId> {
        self.selected.first().copied()
    }

    /// Every selected object, for bulk operations.
    pub fn all(&self) -> &[ShapeId] {
        &self.selected
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Drop references to objects that no longer exist.
    /// Returns true if the selection changed.
    pub fn retain_existing(&mut self, document: &DesignDocument) -> bool {
        let before = self.selected.len();
        self.selected.retain(|&id| document.contains(id));
        self.drop_stale_editing();
        before != self.selected.len()
    }

    /// Enter inline editing for a selected text object.
    pub fn enter_editing(&mut self, id: ShapeId) {
        if !self.is_selected(id) {
            self.select(id);
        }
        self.editing = Some(id);
    }

    pub fn exit_editing(&mut self) {
        self.editing = None;
    }

    /// Object currently being edited inline (if any).
    pub fn editing(&self) -> Option<ShapeId> {
        self.editing
    }

    fn drop_stale_editing(&mut self) {
        if let Some(id) = self.editing {
            if !self.selected.contains(&id) {
                self.editing = None;
            }
        }
    }
}

/// Text attributes shown for a selected text object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextProperties {
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub align: TextAlign,
}

/// Attributes shown for the active object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectProperties {
    pub id: ShapeId,
    pub kind: ShapeKind,
    /// Size of the whole selection.
    pub selected_count: usize,
    pub x: f64,
    pub y: f64,
    /// Rendered width (base width x scale).
    pub width: f64,
    /// Rendered height (base height x scale).
    pub height: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub text: Option<TextProperties>,
    /// Filter names for images, in application order.
    pub filters: Vec<&'static str>,
}

/// Property panel model, rebuilt whenever the selection or document changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyPanel {
    Empty,
    Object(ObjectProperties),
}

impl PropertyPanel {
    pub const NO_SELECTION: &'static str = "No object selected";

    /// Build the panel for the active object of `selection`.
    pub fn from_selection(document: &DesignDocument, selection: &SelectionTracker) -> Self {
        let Some(shape) = selection.active().and_then(|id| document.get_shape(id)) else {
            return PropertyPanel::Empty;
        };
        PropertyPanel::Object(describe(shape, selection.len()))
    }

    /// Heading shown at the top of the panel.
    pub fn title(&self) -> &'static str {
        match self {
            PropertyPanel::Empty => Self::NO_SELECTION,
            PropertyPanel::Object(props) => props.kind.label(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PropertyPanel::Empty)
    }

    pub fn object(&self) -> Option<&ObjectProperties> {
        match self {
            PropertyPanel::Empty => None,
            PropertyPanel::Object(props) => Some(props),
        }
    }
}

fn describe(shape: &Shape, selected_count: usize) -> ObjectProperties {
    let placement = shape.placement();
    let size = shape.rendered_size();
    let style = shape.style();
    ObjectProperties {
        id: shape.id(),
        kind: shape.kind(),
        selected_count,
        x: placement.position.x,
        y: placement.position.y,
        width: size.width,
        height: size.height,
        rotation: placement.rotation,
        opacity: style.opacity,
        fill: style.fill_color.map(|c| c.to_hex()),
        stroke: style.stroke_color.map(|c| c.to_hex()),
        stroke_width: style.stroke_width,
        text: shape.as_text().map(|text| TextProperties {
            content: text.content().to_string(),
            font_family: text.font_family.clone(),
            font_size: text.font_size,
            font_weight: text.font_weight.css_value().to_string(),
            italic: text.italic,
            underline: text.underline,
            strikethrough: text.strikethrough,
            align: text.text_align,
        }),
        filters: shape
            .as_image()
            .map(|img| img.filters.iter().map(|f| f.name()).collect())
            .unwrap_or_default(),
    }
}

/// One row of the layers list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerEntry {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub label: String,
    pub selected: bool,
}

/// Layers listing, top-most object first.
pub fn layers(document: &DesignDocument, selection: &SelectionTracker) -> Vec<LayerEntry> {
    document
        .objects()
        .iter()
        .rev()
        .map(|shape| LayerEntry {
            id: shape.id(),
            kind: shape.kind(),
            label: layer_label(shape),
            selected: selection.is_selected(shape.id()),
        })
        .collect()
}

fn layer_label(shape: &Shape) -> String {
    const PREVIEW_CHARS: usize = 20;
    match shape.as_text() {
        Some(text) if !text.content().trim().is_empty() => {
            let preview: String = text.content().chars().take(PREVIEW_CHARS).collect();
            if text.content().chars().count() > PREVIEW_CHARS {
                format!("{preview}…")
            } else {
                preview
            }
        }
        _ => shape.kind().label().to_string(),
    }
}
