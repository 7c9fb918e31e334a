//! Bounded log of past invasions.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::HISTORY_CAPACITY;
use crate::invasion::InvasionHistoryEntry;
use crate::objectives::InvasionOutcome;

/// Wins and losses across the retained history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefenseRecord {
    pub victories: u32,
    pub defeats: u32,
}

impl DefenseRecord {
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.victories.saturating_add(self.defeats)
    }
}

/// Most recent invasions, oldest first, capped at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvasionHistory {
    entries: VecDeque<InvasionHistoryEntry>,
}

impl InvasionHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the history with `entry` appended and the oldest entries dropped
    /// past capacity.
    #[must_use]
    pub fn push(&self, entry: InvasionHistoryEntry) -> Self {
        let mut entries = self.entries.clone();
        entries.push_back(entry);
        while entries.len() > HISTORY_CAPACITY {
            entries.pop_front();
        }
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InvasionHistoryEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&InvasionHistoryEntry> {
        self.entries.back()
    }

    #[must_use]
    pub fn defense_record(&self) -> DefenseRecord {
        self.entries
            .iter()
            .fold(DefenseRecord::default(), |record, entry| match entry.outcome {
                InvasionOutcome::Victory => DefenseRecord {
                    victories: record.victories.saturating_add(1),
                    ..record
                },
                InvasionOutcome::Defeat => DefenseRecord {
                    defeats: record.defeats.saturating_add(1),
                    ..record
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invasion::{InvasionEndReason, InvasionKind};

    fn entry(day: u32, outcome: InvasionOutcome) -> InvasionHistoryEntry {
        InvasionHistoryEntry {
            day,
            kind: InvasionKind::Scheduled,
            outcome,
            end_reason: InvasionEndReason::TurnLimitReached,
            invader_count: 2,
            invaders_killed: 1,
            defender_count: 3,
            defenders_lost: 0,
            turns_taken: 30,
        }
    }

    #[test]
    fn push_leaves_original_untouched() {
        let empty = InvasionHistory::new();
        let one = empty.push(entry(10, InvasionOutcome::Victory));
        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(one.latest().map(|e| e.day), Some(10));
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut history = InvasionHistory::new();
        for day in 0..60 {
            history = history.push(entry(day, InvasionOutcome::Victory));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.iter().next().map(|e| e.day), Some(10));
        assert_eq!(history.latest().map(|e| e.day), Some(59));
    }

    #[test]
    fn record_counts_outcomes() {
        let history = InvasionHistory::new()
            .push(entry(10, InvasionOutcome::Victory))
            .push(entry(17, InvasionOutcome::Defeat))
            .push(entry(24, InvasionOutcome::Victory));
        let record = history.defense_record();
        assert_eq!(record.victories, 2);
        assert_eq!(record.defeats, 1);
        assert_eq!(record.total(), 3);
    }
}
