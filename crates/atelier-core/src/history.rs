//! Linear undo/redo over full-document snapshots.
//!
//! Every committed mutation records one snapshot. Undo and redo move a cursor
//! through the timeline and restore the snapshot under it; a restore always
//! replaces the whole live document.

use crate::document::{DesignDocument, DocumentError};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of snapshots kept by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize snapshot: {0}")]
    Capture(#[source] serde_json::Error),
    #[error("corrupt snapshot: {0}")]
    Corrupt(#[from] DocumentError),
}

/// Immutable, self-contained serialization of a document.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<str>);

impl Snapshot {
    /// Serialize the full document (background, size and every object).
    pub fn capture(document: &DesignDocument) -> Result<Self, SnapshotError> {
        document
            .to_json()
            .map(|json| Snapshot(json.into()))
            .map_err(SnapshotError::Capture)
    }

    /// Wrap an already serialized document.
    pub fn from_json(json: impl Into<Arc<str>>) -> Self {
        Snapshot(json.into())
    }

    /// Rebuild the document this snapshot describes.
    pub fn restore(&self) -> Result<DesignDocument, SnapshotError> {
        Ok(DesignDocument::from_json(&self.0)?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size of the serialized form in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot({} bytes)", self.0.len())
    }
}

/// Where the cursor sits in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    NoHistory,
    /// Nothing left to undo; redo is available.
    AtEarliest,
    /// Nothing left to redo. A one-snapshot timeline is here too.
    AtLatest,
    MidTimeline,
}

/// Snapshot timeline with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    timeline: VecDeque<Snapshot>,
    /// Index of the current state. Only meaningful when the timeline is non-empty.
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create an empty history retaining at most `limit` snapshots.
    pub fn new(limit: usize) -> Self {
        Self {
            timeline: VecDeque::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Drop the redo branch, append `snapshot` and make it current.
    /// The oldest snapshot is evicted once the limit is exceeded.
    pub fn record(&mut self, snapshot: Snapshot) {
        if !self.timeline.is_empty() {
            self.timeline.truncate(self.cursor + 1);
        }
        self.timeline.push_back(snapshot);

        if self.timeline.len() > self.limit {
            self.timeline.pop_front();
            log::debug!("History limit {} reached, evicted oldest snapshot", self.limit);
        }
        self.cursor = self.timeline.len() - 1;
        log::debug!(
            "Recorded snapshot (timeline length {}, cursor {})",
            self.timeline.len(),
            self.cursor
        );
    }

    /// Step back one snapshot, handing it to `restore` first.
    ///
    /// Returns `Ok(false)` at the earliest step. The cursor only moves when
    /// `restore` succeeds, so a failed restore leaves everything in place.
    pub fn undo<E>(
        &mut self,
        restore: impl FnOnce(&Snapshot) -> Result<(), E>,
    ) -> Result<bool, E> {
        if !self.can_undo() {
            return Ok(false);
        }
        restore(&self.timeline[self.cursor - 1])?;
        self.cursor -= 1;
        Ok(true)
    }

    /// Step forward one snapshot; mirror of [`History::undo`].
    pub fn redo<E>(
        &mut self,
        restore: impl FnOnce(&Snapshot) -> Result<(), E>,
    ) -> Result<bool, E> {
        if !self.can_redo() {
            return Ok(false);
        }
        restore(&self.timeline[self.cursor + 1])?;
        self.cursor += 1;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.timeline.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.timeline.is_empty() && self.cursor + 1 < self.timeline.len()
    }

    pub fn state(&self) -> HistoryState {
        if self.timeline.is_empty() {
            HistoryState::NoHistory
        } else if self.cursor + 1 == self.timeline.len() {
            HistoryState::AtLatest
        } else if self.cursor == 0 {
            HistoryState::AtEarliest
        } else {
            HistoryState::MidTimeline
        }
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> Option<&Snapshot> {
        self.timeline.get(self.cursor)
    }

    /// Current step, or None without history.
    pub fn cursor(&self) -> Option<usize> {
        (!self.timeline.is_empty()).then_some(self.cursor)
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.timeline.clear();
        self.cursor = 0;
    }

    /// Start a fresh timeline whose only entry is `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.clear();
        self.record(initial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(n: usize) -> Snapshot {
        Snapshot::from_json(format!("{{\"step\":{n}}}"))
    }

    fn restore_into(target: &mut Option<Snapshot>) -> impl FnOnce(&Snapshot) -> Result<(), ()> + '_ {
        move |s| {
            *target = Some(s.clone());
            Ok(())
        }
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::default();
        assert_eq!(history.state(), HistoryState::NoHistory);
        assert_eq!(history.cursor(), None);
        assert_eq!(history.undo(|_| Ok::<(), ()>(())), Ok(false));
        assert_eq!(history.redo(|_| Ok::<(), ()>(())), Ok(false));
    }

    #[test]
    fn test_single_snapshot_is_latest() {
        let mut history = History::default();
        history.record(snap(0));
        assert_eq!(history.state(), HistoryState::AtLatest);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_walks_timeline() {
        let mut history = History::default();
        for n in 0..3 {
            history.record(snap(n));
        }

        let mut restored = None;
        assert_eq!(history.undo(restore_into(&mut restored)), Ok(true));
        assert_eq!(restored, Some(snap(1)));
        assert_eq!(history.state(), HistoryState::MidTimeline);

        assert_eq!(history.undo(restore_into(&mut restored)), Ok(true));
        assert_eq!(restored, Some(snap(0)));
        assert_eq!(history.state(), HistoryState::AtEarliest);
        assert_eq!(history.undo(restore_into(&mut restored)), Ok(false));

        assert_eq!(history.redo(restore_into(&mut restored)), Ok(true));
        assert_eq!(restored, Some(snap(1)));
        assert_eq!(history.current(), Some(&snap(1)));
    }

    #[test]
    fn test_record_discards_redo_branch() {
        let mut history = History::default();
        for n in 0..4 {
            history.record(snap(n));
        }
        history.undo(|_| Ok::<(), ()>(())).unwrap();
        history.undo(|_| Ok::<(), ()>(())).unwrap();
        history.record(snap(10));

        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&snap(10)));
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = History::default();
        for n in 0..60 {
            history.record(snap(n));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(history.cursor(), Some(49));
        assert_eq!(history.current(), Some(&snap(59)));

        // The oldest retained state is the new undo floor
        while history.undo(|_| Ok::<(), ()>(())).unwrap() {}
        assert_eq!(history.current(), Some(&snap(10)));
    }

    #[test]
    fn test_eviction_keeps_relative_cursor() {
        let mut history = History::new(3);
        for n in 0..3 {
            history.record(snap(n));
        }
        history.undo(|_| Ok::<(), ()>(())).unwrap();
        // Recording from mid-timeline truncates first, so nothing is evicted
        history.record(snap(3));
        assert_eq!(history.len(), 3);
        history.record(snap(4));
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(history.current(), Some(&snap(4)));
    }

    #[test]
    fn test_failed_restore_keeps_cursor() {
        let mut history = History::default();
        history.record(snap(0));
        history.record(snap(1));

        assert_eq!(history.undo(|_| Err("corrupt")), Err("corrupt"));
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.state(), HistoryState::AtLatest);
    }

    #[test]
    fn test_reset() {
        let mut history = History::default();
        history.record(snap(0));
        history.record(snap(1));
        history.reset(snap(7));
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&snap(7)));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let doc = DesignDocument::new(640.0, 480.0);
        let snapshot = Snapshot::capture(&doc).unwrap();
        assert_eq!(snapshot.restore().unwrap(), doc);
        assert!(matches!(
            Snapshot::from_json("{\"broken\":").restore(),
            Err(SnapshotError::Corrupt(_))
        ));
    }
}
