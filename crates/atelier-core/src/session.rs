//! Editing session: the single owner of the document, selection, history,
//! clipboard and tool state.
//!
//! Every committed mutation follows the same path: change the document,
//! ask the engine to re-render, record one history snapshot, then queue
//! events for the host. A render failure is reported but never undoes the
//! logical change.

use crate::background::{Background, BackgroundImage, Gradient};
use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::document::{DesignDocument, DocumentError, ZOrder};
use crate::engine::{BrushSettings, RasterOptions, RenderEngine, RendererError};
use crate::export::{self, Download, DownloadFormat, ExportError};
use crate::history::{History, Snapshot, SnapshotError};
use crate::image_loader::{DecodedImage, ImageLoadError};
use crate::properties::{self, Attribute, AttributeError, Dimension, FilterEdit, TextToggle};
use crate::selection::{self, LayerEntry, PropertyPanel, SelectionTracker};
use crate::shapes::{Freehand, Image, SerializableColor, Shape, ShapeId, ShapeKind, ShapeStyle};
use crate::shortcuts::{KeyPress, ShortcutAction, ShortcutRegistry};
use crate::storage::{BoxFuture, DesignStore, SaveRequest, SaveResponse, StorageError};
use crate::tools::{BrushMode, ShapePreset, TextPreset, ToolKind, ToolManager};
use kurbo::{Point, Size, Vec2};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

/// Smallest viewport zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest viewport zoom factor.
pub const MAX_ZOOM: f64 = 3.0;
/// Change applied by one zoom in or zoom out step.
pub const ZOOM_STEP: f64 = 0.1;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("editor session is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error("invalid path data: {0}")]
    PathData(#[from] kurbo::SvgParseError),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Notifications for the host UI, drained with [`EditorSession::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    DocumentChanged,
    SelectionChanged(PropertyPanel),
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// Viewport zoom as a whole percentage.
    ZoomChanged(u32),
    /// Something failed without affecting the document.
    Warning(String),
}

/// An editing session driving a rendering engine.
pub struct EditorSession<E: RenderEngine> {
    engine: E,
    config: EditorConfig,
    document: Option<DesignDocument>,
    history: History,
    selection: SelectionTracker,
    clipboard: Clipboard,
    tools: ToolManager,
    store: Arc<dyn DesignStore>,
    /// Id of the stored design this session edits, once saved or opened.
    design_id: Option<String>,
    /// Viewport zoom factor. Not part of the document or its history.
    zoom: f64,
    events: VecDeque<EditorEvent>,
}

impl<E: RenderEngine> EditorSession<E> {
    /// Create a session. Nothing can be edited until [`EditorSession::init`].
    pub fn new(engine: E, config: EditorConfig, store: Arc<dyn DesignStore>) -> Self {
        let config = config.sanitized();
        Self {
            engine,
            history: History::new(config.history_limit),
            clipboard: Clipboard::new(config.paste_offset),
            tools: ToolManager::new(config.brush_color, config.brush_width, config.eraser_width),
            config,
            document: None,
            selection: SelectionTracker::new(),
            store,
            design_id: None,
            zoom: 1.0,
            events: VecDeque::new(),
        }
    }

    /// Start editing a blank canvas. The blank state is the first snapshot.
    pub fn init(&mut self) -> Result<(), EditorError> {
        let document = DesignDocument::new(self.config.canvas_width, self.config.canvas_height)
            .with_background(Background::solid(self.config.background_color));
        self.start(document)?;
        log::info!(
            "Editor session started ({}x{})",
            self.config.canvas_width,
            self.config.canvas_height
        );
        Ok(())
    }

    /// Stop editing. Pending continuations (image loads) become no-ops.
    pub fn teardown(&mut self) {
        self.document = None;
        self.history.clear();
        self.selection.clear();
        self.tools.set_tool(ToolKind::Select);
        self.engine.set_drawing_mode(None);
        self.design_id = None;
        self.zoom = 1.0;
        self.engine.set_zoom(self.zoom);
        log::info!("Editor session ended");
    }

    pub fn is_initialized(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&DesignDocument> {
        self.document.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn design_id(&self) -> Option<&str> {
        self.design_id.as_deref()
    }

    /// Queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    fn doc(&self) -> Result<&DesignDocument, EditorError> {
        self.document.as_ref().ok_or(EditorError::NotInitialized)
    }

    fn doc_mut(&mut self) -> Result<&mut DesignDocument, EditorError> {
        self.document.as_mut().ok_or(EditorError::NotInitialized)
    }

    fn canvas_size(&self) -> Result<Size, EditorError> {
        let doc = self.doc()?;
        Ok(Size::new(doc.width, doc.height))
    }

    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.events.push_back(EditorEvent::Warning(message));
    }

    fn render(&mut self) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        if let Err(e) = self.engine.request_render(document) {
            self.warn(format!("Render failed: {e}"));
        }
    }

    /// Re-render, record a snapshot and notify the host.
    fn commit(&mut self) -> Result<(), EditorError> {
        self.render();
        let snapshot = Snapshot::capture(self.doc()?)?;
        self.history.record(snapshot);
        self.events.push_back(EditorEvent::DocumentChanged);
        self.push_history_event();
        Ok(())
    }

    /// Install `document` as the live document with a fresh timeline.
    fn start(&mut self, document: DesignDocument) -> Result<(), EditorError> {
        let snapshot = Snapshot::capture(&document)?;
        self.document = Some(document);
        self.history.reset(snapshot);
        self.selection.clear();
        self.render();
        self.events.push_back(EditorEvent::DocumentChanged);
        self.push_selection_event();
        self.push_history_event();
        Ok(())
    }

    fn push_history_event(&mut self) {
        self.events.push_back(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn push_selection_event(&mut self) {
        let panel = self.property_panel();
        self.events.push_back(EditorEvent::SelectionChanged(panel));
    }

    /// Drop selected ids that no longer exist, notifying on change.
    fn prune_selection(&mut self) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        if self.selection.retain_existing(document) {
            self.push_selection_event();
        }
    }

    fn select_only(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.selection.set(ids);
        self.push_selection_event();
    }

    /// Ids of the selected objects in z-order (bottom-most first).
    fn selected_in_z_order(&self) -> Vec<ShapeId> {
        let Some(document) = self.document.as_ref() else {
            return Vec::new();
        };
        document
            .objects()
            .iter()
            .map(Shape::id)
            .filter(|id| self.selection.is_selected(*id))
            .collect()
    }

    // --- Object store ---

    /// Add an object on top of the z-order.
    pub fn add_object(&mut self, shape: Shape) -> Result<ShapeId, EditorError> {
        let id = self.doc_mut()?.add_shape(shape);
        self.commit()?;
        Ok(id)
    }

    /// Add an object and make it the selection.
    fn add_and_select(&mut self, shape: Shape) -> Result<ShapeId, EditorError> {
        let id = self.doc_mut()?.add_shape(shape);
        self.select_only([id]);
        self.commit()?;
        Ok(id)
    }

    /// Remove an object. Unknown ids are a no-op returning false.
    pub fn remove_object(&mut self, id: ShapeId) -> Result<bool, EditorError> {
        if self.doc_mut()?.remove_shape(id).is_none() {
            return Ok(false);
        }
        self.prune_selection();
        self.commit()?;
        Ok(true)
    }

    /// Delete every selected object in one step.
    pub fn delete_selected(&mut self) -> Result<usize, EditorError> {
        let ids = self.selection.all().to_vec();
        let document = self.doc_mut()?;
        let removed = document.remove_where(|shape| ids.contains(&shape.id()));
        if removed == 0 {
            return Ok(0);
        }
        self.selection.clear();
        self.push_selection_event();
        self.commit()?;
        Ok(removed)
    }

    /// Move an object to the top or bottom of the z-order.
    pub fn reorder(&mut self, id: ShapeId, target: ZOrder) -> Result<bool, EditorError> {
        if !self.doc_mut()?.reorder(id, target) {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    /// Move the whole selection to the top or bottom, keeping its relative order.
    pub fn reorder_selected(&mut self, target: ZOrder) -> Result<bool, EditorError> {
        let ids = self.selection.all().to_vec();
        if ids.is_empty() || !self.doc_mut()?.reorder_many(&ids, target) {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    pub fn bring_forward(&mut self, id: ShapeId) -> Result<bool, EditorError> {
        if !self.doc_mut()?.bring_forward(id) {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    pub fn send_backward(&mut self, id: ShapeId) -> Result<bool, EditorError> {
        if !self.doc_mut()?.send_backward(id) {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    /// Replace the background. The new one fully supersedes the old.
    pub fn set_background(&mut self, background: Background) -> Result<(), EditorError> {
        log::debug!("Background set to {}", background.kind_label());
        self.doc_mut()?.set_background(background);
        self.commit()
    }

    /// Two-colour linear gradient across the canvas.
    pub fn set_linear_gradient(&mut self) -> Result<(), EditorError> {
        let size = self.canvas_size()?;
        self.set_background(Background::Gradient(Gradient::linear_preset(
            size.width,
            size.height,
        )))
    }

    /// Two-colour radial gradient from the canvas centre.
    pub fn set_radial_gradient(&mut self) -> Result<(), EditorError> {
        let size = self.canvas_size()?;
        self.set_background(Background::Gradient(Gradient::radial_preset(
            size.width,
            size.height,
        )))
    }

    /// Back to plain white.
    pub fn remove_background(&mut self) -> Result<(), EditorError> {
        self.set_background(Background::default())
    }

    /// Remove every object and reset the background.
    pub fn clear(&mut self) -> Result<(), EditorError> {
        self.doc_mut()?.clear();
        self.selection.clear();
        self.push_selection_event();
        self.commit()
    }

    /// Remove every freehand stroke in one step.
    pub fn clear_drawing(&mut self) -> Result<usize, EditorError> {
        let removed = self
            .doc_mut()?
            .remove_where(|shape| shape.kind() == ShapeKind::Freehand);
        if removed == 0 {
            return Ok(0);
        }
        self.prune_selection();
        self.commit()?;
        Ok(removed)
    }

    pub fn group_selected(&mut self) -> Result<Option<ShapeId>, EditorError> {
        let ids = self.selection.all().to_vec();
        let Some(group_id) = self.doc_mut()?.group_shapes(&ids) else {
            return Ok(None);
        };
        self.select_only([group_id]);
        self.commit()?;
        Ok(Some(group_id))
    }

    /// Dissolve the active group, selecting its former children.
    pub fn ungroup_selected(&mut self) -> Result<Option<Vec<ShapeId>>, EditorError> {
        let Some(active) = self.selection.active() else {
            return Ok(None);
        };
        let Some(children) = self.doc_mut()?.ungroup_shape(active) else {
            return Ok(None);
        };
        self.select_only(children.iter().copied());
        self.commit()?;
        Ok(Some(children))
    }

    // --- Selection ---

    /// Selection reported by the engine. Unknown ids are dropped.
    pub fn on_selection_changed(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        let existing: Vec<ShapeId> = ids.into_iter().filter(|id| document.contains(*id)).collect();
        self.select_only(existing);
    }

    pub fn select_all(&mut self) -> Result<(), EditorError> {
        let ids = self.doc()?.z_order();
        self.select_only(ids);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.push_selection_event();
    }

    /// Start in-place editing of a text object.
    pub fn enter_text_editing(&mut self, id: ShapeId) -> bool {
        let is_text = self
            .document
            .as_ref()
            .and_then(|doc| doc.get_shape(id))
            .is_some_and(|shape| shape.as_text().is_some());
        if is_text {
            let was_selected = self.selection.is_selected(id);
            self.selection.enter_editing(id);
            if !was_selected {
                self.push_selection_event();
            }
        }
        is_text
    }

    pub fn exit_text_editing(&mut self) {
        self.selection.exit_editing();
    }

    pub fn property_panel(&self) -> PropertyPanel {
        match self.document.as_ref() {
            Some(document) => PropertyPanel::from_selection(document, &self.selection),
            None => PropertyPanel::Empty,
        }
    }

    /// Layers, top-most first.
    pub fn layers(&self) -> Vec<LayerEntry> {
        match self.document.as_ref() {
            Some(document) => selection::layers(document, &self.selection),
            None => Vec::new(),
        }
    }

    // --- Property edits ---

    /// Apply `edit` to each id in one step. Returns whether anything changed.
    fn edit_objects(
        &mut self,
        ids: &[ShapeId],
        mut edit: impl FnMut(&mut Shape) -> bool,
    ) -> Result<bool, EditorError> {
        let document = self.doc_mut()?;
        let mut changed = false;
        for &id in ids {
            if let Some(shape) = document.get_shape_mut(id) {
                changed |= edit(shape);
            }
        }
        if changed {
            self.commit()?;
            self.push_selection_event();
        }
        Ok(changed)
    }

    /// Set an attribute from its control form, e.g. `("opacity", "0.5")`.
    ///
    /// Unknown keys are an error; unparseable values are ignored like any
    /// other out-of-domain input.
    pub fn set_attribute(&mut self, id: ShapeId, key: &str, value: &str) -> Result<bool, EditorError> {
        match Attribute::parse(key, value) {
            Ok(attribute) => self.apply_attribute(id, attribute),
            Err(AttributeError::InvalidValue { key, value }) => {
                log::debug!("Ignoring invalid value {:?} for {}", value, key);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a typed attribute to one object. Missing ids are a no-op.
    pub fn apply_attribute(&mut self, id: ShapeId, attribute: Attribute) -> Result<bool, EditorError> {
        self.edit_objects(&[id], |shape| attribute.apply(shape))
    }

    /// Apply a typed attribute to every selected object in one step.
    pub fn apply_to_selection(&mut self, attribute: Attribute) -> Result<bool, EditorError> {
        let ids = self.selection.all().to_vec();
        self.edit_objects(&ids, |shape| attribute.apply(shape))
    }

    /// Resize to a rendered width or height by changing the scale.
    pub fn set_size(&mut self, id: ShapeId, dimension: Dimension, value: f64) -> Result<bool, EditorError> {
        self.edit_objects(&[id], |shape| properties::set_size(shape, dimension, value))
    }

    /// Flip a text style on every selected text object.
    pub fn toggle_text_style(&mut self, toggle: TextToggle) -> Result<bool, EditorError> {
        let ids = self.selection.all().to_vec();
        self.edit_objects(&ids, |shape| properties::toggle(shape, toggle))
    }

    /// Change the filters of every selected image and re-run the engine's
    /// filter pipeline for each.
    pub fn apply_filter(&mut self, edit: FilterEdit) -> Result<bool, EditorError> {
        let ids = self.selection.all().to_vec();
        let mut filtered = Vec::new();
        let document = self.doc_mut()?;
        for &id in &ids {
            if let Some(shape) = document.get_shape_mut(id) {
                if edit.apply(shape) {
                    filtered.push(id);
                }
            }
        }
        if filtered.is_empty() {
            return Ok(false);
        }
        for id in filtered {
            let failure = self
                .document
                .as_ref()
                .and_then(|doc| doc.get_shape(id))
                .and_then(Shape::as_image)
                .and_then(|image| self.engine.apply_filters(image).err());
            if let Some(e) = failure {
                self.warn(format!("Filter failed: {e}"));
            }
        }
        self.commit()?;
        self.push_selection_event();
        Ok(true)
    }

    /// An object moved, resized or rotated by the engine's interaction layer.
    /// Values outside their domain (rotation past 360, opacity above 1) are
    /// brought back before the shape is stored.
    pub fn on_object_modified(&mut self, mut shape: Shape) -> Result<bool, EditorError> {
        shape.sanitize();
        if !self.doc_mut()?.replace_shape(shape) {
            return Ok(false);
        }
        self.commit()?;
        self.push_selection_event();
        Ok(true)
    }

    // --- Viewport ---

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom as the whole percentage shown to the user.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    /// Set the viewport zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. The document
    /// and its history are untouched.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        // Snap to whole percent
        let zoom = ((zoom * 100.0).round() / 100.0).clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom == self.zoom {
            return;
        }
        self.zoom = zoom;
        self.engine.set_zoom(zoom);
        log::debug!("Zoom set to {}%", self.zoom_percent());
        self.events.push_back(EditorEvent::ZoomChanged(self.zoom_percent()));
    }

    // --- Tools and drawing ---

    /// Switch tools. Only the draw tool keeps freehand input on.
    pub fn set_tool(&mut self, tool: ToolKind) -> Result<(), EditorError> {
        if tool == ToolKind::Draw {
            return self.start_drawing(BrushMode::Pen);
        }
        self.tools.set_tool(tool);
        self.engine.set_drawing_mode(None);
        Ok(())
    }

    pub fn start_drawing(&mut self, mode: BrushMode) -> Result<(), EditorError> {
        let background = self.doc()?.background.clone();
        self.tools.start_drawing(mode);
        let brush = self.tools.brush(&background);
        self.engine.set_drawing_mode(brush.as_ref());
        Ok(())
    }

    pub fn stop_drawing(&mut self) {
        self.tools.stop_drawing();
        self.engine.set_drawing_mode(None);
    }

    /// Change the pen, pushing it to the engine when drawing.
    pub fn set_brush(&mut self, color: SerializableColor, width: f64) {
        self.tools.brush_color = color;
        if width.is_finite() && width > 0.0 {
            self.tools.brush_width = width;
        }
        if let Some(document) = self.document.as_ref() {
            if let Some(brush) = self.tools.brush(&document.background) {
                self.engine.set_drawing_mode(Some(&brush));
            }
        }
    }

    /// Store a finished freehand stroke. Strokes of fewer than two points
    /// are dropped.
    pub fn on_stroke_completed(&mut self, points: &[Point]) -> Result<Option<ShapeId>, EditorError> {
        let document = self.doc()?;
        if points.len() < 2 {
            return Ok(None);
        }
        let brush = self.tools.brush(&document.background).unwrap_or(BrushSettings {
            color: self.tools.brush_color,
            width: self.tools.brush_width,
        });
        let stroke = Freehand::from_points(points)
            .with_style(ShapeStyle::stroked(brush.color, brush.width));
        self.add_object(Shape::Freehand(stroke)).map(Some)
    }

    pub fn add_text_preset(&mut self, preset: TextPreset) -> Result<ShapeId, EditorError> {
        let shape = preset.build(self.canvas_size()?);
        self.add_and_select(shape)
    }

    pub fn add_shape_preset(&mut self, preset: ShapePreset) -> Result<ShapeId, EditorError> {
        let shape = preset.build(self.canvas_size()?)?;
        self.add_and_select(shape)
    }

    // --- Images ---

    /// Continuation of an image upload: scale the image to fit half the
    /// canvas, centre it, add it and select it.
    ///
    /// After teardown this is a no-op reporting `NotInitialized`.
    pub fn install_image(
        &mut self,
        decoded: Result<DecodedImage, ImageLoadError>,
    ) -> Result<ShapeId, EditorError> {
        let canvas = self.canvas_size()?;
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(e) => {
                self.warn(format!("Could not load image: {e}"));
                return Err(e.into());
            }
        };
        let mut image = Image::new(
            Point::ZERO,
            &decoded.bytes,
            decoded.width,
            decoded.height,
            decoded.format,
        );
        let scale = image.fit_scale(canvas.width / 2.0, canvas.height / 2.0);
        image.placement.scale_x = scale;
        image.placement.scale_y = scale;
        let mut shape = Shape::Image(image);
        let size = shape.rendered_size();
        shape.set_position(Point::new(
            (canvas.width - size.width) / 2.0,
            (canvas.height - size.height) / 2.0,
        ));
        self.add_and_select(shape)
    }

    /// Continuation of a background upload: stretch the image over the canvas.
    pub fn install_background_image(
        &mut self,
        decoded: Result<DecodedImage, ImageLoadError>,
    ) -> Result<(), EditorError> {
        let canvas = self.canvas_size()?;
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(e) => {
                self.warn(format!("Could not load background image: {e}"));
                return Err(e.into());
            }
        };
        let background = BackgroundImage::covering(
            &decoded.bytes,
            decoded.format,
            decoded.width,
            decoded.height,
            canvas.width,
            canvas.height,
        );
        self.set_background(Background::Image(background))
    }

    // --- Clipboard ---

    /// Copy the selection. Returns the number of copied objects.
    pub fn copy(&mut self) -> usize {
        let ids = self.selected_in_z_order();
        let Some(document) = self.document.as_ref() else {
            return 0;
        };
        self.clipboard
            .copy(ids.iter().filter_map(|id| document.get_shape(*id)));
        self.clipboard.len()
    }

    pub fn cut(&mut self) -> Result<usize, EditorError> {
        if self.copy() == 0 {
            return Ok(0);
        }
        self.delete_selected()
    }

    /// Paste the clipboard on top, offset from the previous paste, and
    /// select the pasted objects.
    pub fn paste(&mut self) -> Result<Vec<ShapeId>, EditorError> {
        self.doc()?;
        let Some(shapes) = self.clipboard.paste() else {
            return Ok(Vec::new());
        };
        let document = self.doc_mut()?;
        let ids: Vec<ShapeId> = shapes.into_iter().map(|s| document.add_shape(s)).collect();
        self.select_only(ids.iter().copied());
        self.commit()?;
        Ok(ids)
    }

    /// Clone the selection one paste offset away, leaving the clipboard alone.
    pub fn duplicate_selected(&mut self) -> Result<Vec<ShapeId>, EditorError> {
        let ids = self.selected_in_z_order();
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        let document = self.doc_mut()?;
        let copies: Vec<Shape> = ids
            .iter()
            .filter_map(|id| document.get_shape(*id))
            .cloned()
            .map(|mut shape| {
                shape.translate(offset);
                shape.regenerate_id();
                shape
            })
            .collect();
        if copies.is_empty() {
            return Ok(Vec::new());
        }
        let new_ids: Vec<ShapeId> = copies.into_iter().map(|s| document.add_shape(s)).collect();
        self.select_only(new_ids.iter().copied());
        self.commit()?;
        Ok(new_ids)
    }

    // --- History ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the previous snapshot. Returns false at the earliest step.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.step_history(true)
    }

    /// Restore the next snapshot. Returns false at the latest step.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.step_history(false)
    }

    fn step_history(&mut self, back: bool) -> Result<bool, EditorError> {
        self.doc()?;
        let mut restored = None;
        let restore = |snapshot: &Snapshot| {
            snapshot.restore().map(|document| restored = Some(document))
        };
        let outcome = if back {
            self.history.undo(restore)
        } else {
            self.history.redo(restore)
        };

        match outcome {
            Ok(false) => Ok(false),
            Ok(true) => {
                if let Some(document) = restored {
                    self.document = Some(document);
                }
                self.selection.clear();
                self.render();
                self.events.push_back(EditorEvent::DocumentChanged);
                self.push_selection_event();
                self.push_history_event();
                log::debug!(
                    "{} to step {:?}",
                    if back { "Undo" } else { "Redo" },
                    self.history.cursor()
                );
                Ok(true)
            }
            Err(e) => {
                self.warn(format!("Could not restore history step: {e}"));
                Err(e.into())
            }
        }
    }

    // --- Persistence and export ---

    /// Serialized document, the same form history snapshots use.
    pub fn serialize(&self) -> Result<String, EditorError> {
        Ok(self.doc()?.to_json()?)
    }

    /// Replace the document with an externally supplied one and start a
    /// fresh history. A malformed payload leaves the session untouched.
    pub fn load_document(&mut self, json: &str) -> Result<(), EditorError> {
        match DesignDocument::from_json(json) {
            Ok(document) => self.start(document),
            Err(e) => {
                self.warn(format!("Could not load design: {e}"));
                Err(e.into())
            }
        }
    }

    /// Encode the canvas as a raster image. Never mutates the document.
    pub fn export_raster(&self, options: RasterOptions) -> Result<Vec<u8>, EditorError> {
        Ok(self.engine.rasterize(self.doc()?, options)?)
    }

    /// Build a download. An empty title falls back to the configured name.
    pub fn download(&self, format: DownloadFormat, title: &str) -> Result<Download, EditorError> {
        let title = if title.trim().is_empty() {
            self.config.download_name.as_str()
        } else {
            title
        };
        Ok(export::download(self.doc()?, &self.engine, format, title)?)
    }

    fn save_request(&self, title: &str) -> Result<SaveRequest, EditorError> {
        let document = self.doc()?;
        let title = match title.trim() {
            "" => self.config.default_title.clone(),
            title => title.to_string(),
        };
        let thumbnail =
            export::thumbnail_data_url(document, &self.engine, self.config.thumbnail_scale)?;
        Ok(SaveRequest {
            id: self.design_id.clone(),
            title,
            canvas_data: document.to_json()?,
            thumbnail,
        })
    }

    /// Capture the document and thumbnail now and save them in the background.
    ///
    /// The returned future owns everything it needs, so editing can continue
    /// while it runs. Feed the response back through
    /// [`EditorSession::on_saved`] to keep updating the same record.
    pub fn persist(&self, title: &str) -> BoxFuture<'static, SaveResponse> {
        let request = match self.save_request(title) {
            Ok(request) => request,
            Err(e) => {
                log::error!("Failed to prepare save: {}", e);
                let response = SaveResponse::failed(e.to_string());
                return Box::pin(async move { response });
            }
        };
        let store = Arc::clone(&self.store);
        Box::pin(async move {
            let response = SaveResponse::from(store.save(request).await);
            match &response.error {
                Some(error) => log::error!("Failed to save design: {}", error),
                None => log::info!("Saved design {:?}", response.design_id),
            }
            response
        })
    }

    /// Remember the id a successful save assigned.
    pub fn on_saved(&mut self, response: &SaveResponse) {
        if let (true, Some(id)) = (response.success, response.design_id.as_ref()) {
            self.design_id = Some(id.clone());
        }
    }

    /// Load a stored design into the session.
    pub async fn open_design(&mut self, id: &str) -> Result<(), EditorError> {
        let store = Arc::clone(&self.store);
        let record = match store.load(id).await {
            Ok(record) => record,
            Err(e) => {
                self.warn(format!("Could not open design: {e}"));
                return Err(e.into());
            }
        };
        self.load_document(&record.canvas_data)?;
        self.design_id = Some(record.id);
        log::info!("Opened design {}", id);
        Ok(())
    }

    // --- Keyboard ---

    /// Run the action bound to a key press, if any.
    pub fn handle_shortcut(&mut self, press: &KeyPress) -> Result<Option<ShortcutAction>, EditorError> {
        let editing_text = self.selection.editing().is_some();
        let Some(action) = ShortcutRegistry::resolve(press, editing_text) else {
            return Ok(None);
        };
        match action {
            ShortcutAction::Undo => {
                self.undo()?;
            }
            ShortcutAction::Redo => {
                self.redo()?;
            }
            ShortcutAction::Delete => {
                self.delete_selected()?;
            }
            ShortcutAction::Copy => {
                self.copy();
            }
            ShortcutAction::Cut => {
                self.cut()?;
            }
            ShortcutAction::Paste => {
                self.paste()?;
            }
            ShortcutAction::Duplicate => {
                self.duplicate_selected()?;
            }
            ShortcutAction::SelectAll => self.select_all()?,
            ShortcutAction::Group => {
                self.group_selected()?;
            }
            ShortcutAction::Ungroup => {
                self.ungroup_selected()?;
            }
        }
        Ok(Some(action))
    }
}
