//! Snapshot-based undo/redo history.
//!
//! The history is an append-only sequence of immutable snapshots with a
//! cursor. Mutations record a new snapshot after the cursor (pruning any
//! redo branch); undo and redo move the cursor and hand the snapshot at
//! the new position back to the caller to apply.
//!
//! Three modes govern what recording does:
//!
//! - `Recording`: the normal state; every recorded snapshot appends.
//! - `Frozen`: a composite gesture (drag, resize cascade) is in progress.
//!   Recordings are coalesced; the state is captured once at unfreeze.
//! - `Replaying`: an undo/redo is being applied. Recordings are dropped
//!   so applying a snapshot can never itself create history.
//!
//! Snapshots are shared `Arc`s: undo keeps no copies of anything the
//! caller already holds, and restoring clones only the handle.

use std::sync::Arc;

/// What the history does with recorded snapshots right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryMode {
    /// Every recorded snapshot appends to the sequence.
    Recording,
    /// A gesture is in progress; recordings coalesce until unfreeze.
    Frozen,
    /// An undo/redo is being applied; recordings are dropped.
    Replaying,
}

/// Snapshot sequence with a cursor and a mode.
#[derive(Clone, Debug)]
pub struct HistoryEngine<T> {
    snapshots: Vec<Arc<T>>,
    cursor: usize,
    creation_index: usize,
    mode: HistoryMode,
    frozen_dirty: bool,
}

impl<T> HistoryEngine<T> {
    /// Creates a history whose first snapshot is the state at creation.
    pub fn new(initial: T) -> Self {
        Self {
            snapshots: vec![Arc::new(initial)],
            cursor: 0,
            creation_index: 0,
            mode: HistoryMode::Recording,
            frozen_dirty: false,
        }
    }

    /// The current mode.
    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// A history always holds at least the creation snapshot.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Position of the cursor within the sequence.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> &Arc<T> {
        &self.snapshots[self.cursor]
    }

    /// True when the cursor can move backwards.
    pub fn can_undo(&self) -> bool {
        self.cursor > self.creation_index
    }

    /// True when the cursor can move forwards.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Records a snapshot of the tree after a mutation.
    ///
    /// In `Recording` mode this prunes everything after the cursor and
    /// appends. While frozen the snapshot is discarded and the gesture is
    /// marked dirty so unfreeze captures its end state. While replaying
    /// the snapshot is dropped entirely.
    pub fn record(&mut self, snapshot: T) {
        match self.mode {
            HistoryMode::Recording => {
                self.snapshots.truncate(self.cursor + 1);
                self.snapshots.push(Arc::new(snapshot));
                self.cursor += 1;
            }
            HistoryMode::Frozen => {
                self.frozen_dirty = true;
            }
            HistoryMode::Replaying => {}
        }
    }

    /// Enters the frozen state for the duration of a composite gesture.
    /// A no-op when already frozen or replaying.
    pub fn freeze(&mut self) {
        if self.mode == HistoryMode::Recording {
            self.mode = HistoryMode::Frozen;
        }
    }

    /// Leaves the frozen state, capturing the gesture's end state as one
    /// snapshot if any mutation was recorded while frozen.
    pub fn unfreeze(&mut self, snapshot: T) {
        if self.mode != HistoryMode::Frozen {
            return;
        }
        self.mode = HistoryMode::Recording;
        if self.frozen_dirty {
            self.frozen_dirty = false;
            self.record(snapshot);
        }
    }

    /// Moves the cursor back one step and returns the snapshot to apply.
    ///
    /// The history enters `Replaying` until [`resume`](Self::resume) is
    /// called, so applying the snapshot cannot record new history.
    pub fn undo(&mut self) -> Option<Arc<T>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.mode = HistoryMode::Replaying;
        Some(Arc::clone(&self.snapshots[self.cursor]))
    }

    /// Moves the cursor forward one step and returns the snapshot to
    /// apply. Enters `Replaying` like [`undo`](Self::undo).
    pub fn redo(&mut self) -> Option<Arc<T>> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.mode = HistoryMode::Replaying;
        Some(Arc::clone(&self.snapshots[self.cursor]))
    }

    /// Jumps the cursor back to the creation index and returns that
    /// snapshot to apply. Later snapshots are kept, so the jump can be
    /// redone forward again. Enters `Replaying`.
    pub fn reset(&mut self) -> Arc<T> {
        self.cursor = self.creation_index;
        self.mode = HistoryMode::Replaying;
        Arc::clone(&self.snapshots[self.cursor])
    }

    /// Returns to `Recording` after the caller has applied a replayed
    /// snapshot.
    pub fn resume(&mut self) {
        if self.mode == HistoryMode::Replaying {
            self.mode = HistoryMode::Recording;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_states(states: &[i32]) -> HistoryEngine<i32> {
        let mut engine = HistoryEngine::new(states[0]);
        for &state in &states[1..] {
            engine.record(state);
        }
        engine
    }

    #[test]
    fn test_cannot_undo_at_creation_index() {
        let engine = HistoryEngine::new(0);
        assert!(!engine.can_undo());
        assert!(!engine.can_redo());
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut engine = engine_with_states(&[0, 1, 2]);

        assert_eq!(*engine.undo().expect("one step back"), 1);
        engine.resume();
        assert_eq!(*engine.undo().expect("two steps back"), 0);
        engine.resume();
        assert!(engine.undo().is_none());

        assert_eq!(*engine.redo().expect("forward again"), 1);
        engine.resume();
        assert_eq!(*engine.redo().expect("to the end"), 2);
        engine.resume();
        assert!(engine.redo().is_none());
    }

    #[test]
    fn test_record_after_undo_prunes_redo_branch() {
        let mut engine = engine_with_states(&[0, 1, 2]);
        engine.undo();
        engine.resume();

        engine.record(7);
        assert_eq!(engine.len(), 3);
        assert!(!engine.can_redo());
        assert_eq!(**engine.current(), 7);
    }

    #[test]
    fn test_freeze_coalesces_gesture_into_one_snapshot() {
        let mut engine = HistoryEngine::new(0);

        engine.freeze();
        assert_eq!(engine.mode(), HistoryMode::Frozen);
        engine.record(1);
        engine.record(2);
        engine.record(3);
        assert_eq!(engine.len(), 1);

        engine.unfreeze(3);
        assert_eq!(engine.mode(), HistoryMode::Recording);
        assert_eq!(engine.len(), 2);
        assert_eq!(**engine.current(), 3);
    }

    #[test]
    fn test_unfreeze_without_mutation_records_nothing() {
        let mut engine = HistoryEngine::new(0);
        engine.freeze();
        engine.unfreeze(0);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_record_during_replay_is_dropped() {
        let mut engine = engine_with_states(&[0, 1]);
        engine.undo();
        assert_eq!(engine.mode(), HistoryMode::Replaying);

        engine.record(9);
        assert_eq!(engine.len(), 2);
        assert_eq!(**engine.current(), 0);

        engine.resume();
        assert_eq!(engine.mode(), HistoryMode::Recording);
    }

    #[test]
    fn test_reset_returns_to_creation_and_keeps_redo() {
        let mut engine = engine_with_states(&[0, 1, 2, 3]);

        assert_eq!(*engine.reset(), 0);
        engine.resume();
        assert!(!engine.can_undo());
        assert!(engine.can_redo());

        assert_eq!(*engine.redo().expect("redo after reset"), 1);
    }

    #[test]
    fn test_freeze_while_replaying_is_ignored() {
        let mut engine = engine_with_states(&[0, 1]);
        engine.undo();
        engine.freeze();
        assert_eq!(engine.mode(), HistoryMode::Replaying);
        engine.resume();
    }
}
