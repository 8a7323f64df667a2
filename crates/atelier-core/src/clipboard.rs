//! Copy/paste buffer with compounding paste offset.

use crate::shapes::Shape;
use kurbo::Vec2;

/// Default distance each paste moves from the previous one.
pub const DEFAULT_PASTE_OFFSET: f64 = 20.0;

/// Holds one copied object or multi-object selection.
///
/// The entry is a deep copy; later edits to the source never reach it.
#[derive(Debug, Clone)]
pub struct Clipboard {
    entry: Vec<Shape>,
    offset: Vec2,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new(DEFAULT_PASTE_OFFSET)
    }
}

impl Clipboard {
    pub fn new(offset: f64) -> Self {
        Self {
            entry: Vec::new(),
            offset: Vec2::new(offset, offset),
        }
    }

    /// Replace the entry with copies of `objects` (bottom-most first).
    pub fn copy<'a>(&mut self, objects: impl IntoIterator<Item = &'a Shape>) {
        self.entry = objects.into_iter().cloned().collect();
        log::debug!("Copied {} object(s) to clipboard", self.entry.len());
    }

    /// Produce the next paste: the stored entry is shifted by the offset, so
    /// successive pastes step further from the original, and a fresh copy with
    /// new identifiers is returned.
    pub fn paste(&mut self) -> Option<Vec<Shape>> {
        if self.entry.is_empty() {
            return None;
        }
        for shape in &mut self.entry {
            shape.translate(self.offset);
        }
        let pasted = self
            .entry
            .iter()
            .cloned()
            .map(|mut shape| {
                shape.regenerate_id();
                shape
            })
            .collect();
        Some(pasted)
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }

    /// Number of objects in the entry.
    pub fn len(&self) -> usize {
        self.entry.len()
    }

    pub fn clear(&mut self) {
        self.entry.clear();
    }
}
