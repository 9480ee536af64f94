//! Replayable move history
//!
//! The history is a linear list of board snapshots with a cursor at the
//! current position. Undo and redo move the cursor by a fixed unit:
//! one snapshot per step when both seats are driven the same way, two
//! when exactly one seat is interactive, so an interactive player's
//! undo rewinds the opponent's reply along with their own move.
//!
//! Recording a snapshot truncates any redo tail and reports how many
//! times the resulting position has now occurred, which feeds the
//! threefold-repetition draw rule.

use crate::game::board::BoardSnapshot;

/// Snapshot list with an undo/redo cursor
#[derive(Clone, Debug)]
pub struct GameHistory {
    snapshots: Vec<BoardSnapshot>,
    cursor: usize,
    undo_unit: usize,
}

impl GameHistory {
    /// Start a history at the given initial position
    pub fn new(initial: BoardSnapshot, undo_unit: usize) -> Self {
        debug_assert!(undo_unit >= 1);
        Self {
            snapshots: vec![initial],
            cursor: 0,
            undo_unit,
        }
    }

    pub fn undo_unit(&self) -> usize {
        self.undo_unit
    }

    /// Whether one undo step lands on a recorded snapshot
    pub fn can_undo(&self) -> bool {
        self.cursor >= self.undo_unit
    }

    /// Whether one redo step lands on a recorded snapshot
    pub fn can_redo(&self) -> bool {
        self.cursor + self.undo_unit < self.snapshots.len()
    }

    /// Whether stepping the cursor also passes the turn to the other side
    pub fn flips_turn(&self) -> bool {
        self.undo_unit % 2 == 1
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current(&self) -> &BoardSnapshot {
        &self.snapshots[self.cursor]
    }

    /// Append a snapshot after the cursor, dropping any redo tail
    ///
    /// Returns the number of times this position now appears in the
    /// surviving history, the new snapshot included.
    pub fn record(&mut self, snapshot: BoardSnapshot) -> usize {
        self.snapshots.truncate(self.cursor + 1);
        let occurrences = 1 + self
            .snapshots
            .iter()
            .filter(|&past| *past == snapshot)
            .count();
        self.snapshots.push(snapshot);
        self.cursor += 1;
        occurrences
    }

    /// Step the cursor back one unit
    pub fn undo(&mut self) -> Option<&BoardSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= self.undo_unit;
        Some(&self.snapshots[self.cursor])
    }

    /// Step the cursor forward one unit
    pub fn redo(&mut self) -> Option<&BoardSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += self.undo_unit;
        Some(&self.snapshots[self.cursor])
    }
}
