//! Todo extension model and completion resolution.
//!
//! # Responsibility
//! - Define the TODO extension record owned 1:1 by a base item.
//! - Keep the two progress representations mutually exclusive by type.
//! - Derive completion status purely from extension state.
//!
//! # Invariants
//! - `id` equals the owning item's id.
//! - Exactly one progress representation exists at a time; the tagged enum
//!   makes the inactive one unrepresentable.
//! - `Plain` never participates in status derivation.

use crate::model::item::{ItemId, ItemStatus};
use crate::model::subtask::Subtask;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Urgency level of a todo. Required on every extension record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Coarse progress-mode label used for mismatch reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Plain,
    Counter,
    Checklist,
}

impl Display for ProgressKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Plain => "plain",
            Self::Counter => "counter",
            Self::Checklist => "checklist",
        };
        write!(f, "{label}")
    }
}

/// Progress representation of a todo.
///
/// Replaces the legacy nullable tri-state (`progress_mode` NULL/1/0 plus
/// counter columns plus a subtask blob) with one tagged value; the repository
/// maps variants back onto the legacy columns for stored-data compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProgressState {
    /// No automatic completion; status flips only by explicit toggle.
    Plain,
    /// Numeric counter. `current` is clamped into `[0, total]` by mutations.
    Counter { current: u32, total: u32 },
    /// Ordered checklist. Order is insertion order and stays stable.
    Checklist { subtasks: Vec<Subtask> },
}

impl ProgressState {
    /// Returns the coarse mode label for guard checks and error messages.
    pub fn kind(&self) -> ProgressKind {
        match self {
            Self::Plain => ProgressKind::Plain,
            Self::Counter { .. } => ProgressKind::Counter,
            Self::Checklist { .. } => ProgressKind::Checklist,
        }
    }

    /// Derives the completion status for the current progress state.
    ///
    /// Pure function over the extension state; plain todos yield `None`:
    /// - counter: completed once `current >= total`;
    /// - checklist: completed once non-empty and every entry is done. An
    ///   empty checklist is always active.
    pub fn resolved_status(&self) -> Option<ItemStatus> {
        match self {
            Self::Plain => None,
            Self::Counter { current, total } => Some(if current >= total {
                ItemStatus::Completed
            } else {
                ItemStatus::Active
            }),
            Self::Checklist { subtasks } => {
                let done = !subtasks.is_empty() && subtasks.iter().all(|entry| entry.completed);
                Some(if done {
                    ItemStatus::Completed
                } else {
                    ItemStatus::Active
                })
            }
        }
    }
}

/// Type-specific payload for an item with `kind == ItemType::Todo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoExtension {
    /// Equals the owning item's id; the pair shares one identity.
    pub id: ItemId,
    /// Due date. Required and preserved when updates omit it.
    pub deadline: NaiveDate,
    /// Required and preserved when updates omit it.
    pub priority: Priority,
    /// Active progress representation.
    pub progress: ProgressState,
}

#[cfg(test)]
mod tests {
    use super::{ProgressState, Subtask};
    use crate::model::item::ItemStatus;

    #[test]
    fn plain_makes_no_decision() {
        assert_eq!(ProgressState::Plain.resolved_status(), None);
    }

    #[test]
    fn counter_completes_at_total() {
        let active = ProgressState::Counter {
            current: 2,
            total: 3,
        };
        let done = ProgressState::Counter {
            current: 3,
            total: 3,
        };
        assert_eq!(active.resolved_status(), Some(ItemStatus::Active));
        assert_eq!(done.resolved_status(), Some(ItemStatus::Completed));
    }

    #[test]
    fn zero_total_counter_counts_as_completed() {
        let state = ProgressState::Counter {
            current: 0,
            total: 0,
        };
        assert_eq!(state.resolved_status(), Some(ItemStatus::Completed));
    }

    #[test]
    fn empty_checklist_stays_active() {
        let state = ProgressState::Checklist {
            subtasks: Vec::new(),
        };
        assert_eq!(state.resolved_status(), Some(ItemStatus::Active));
    }

    #[test]
    fn checklist_completes_only_when_every_entry_is_done() {
        let mut subtasks = vec![Subtask::new("a"), Subtask::new("b")];
        subtasks[0].completed = true;

        let partial = ProgressState::Checklist {
            subtasks: subtasks.clone(),
        };
        assert_eq!(partial.resolved_status(), Some(ItemStatus::Active));

        subtasks[1].completed = true;
        let done = ProgressState::Checklist { subtasks };
        assert_eq!(done.resolved_status(), Some(ItemStatus::Completed));
    }
}
