//! Base item domain model.
//!
//! # Responsibility
//! - Define the canonical base record shared by todo/habit/reminder items.
//! - Keep the type discriminator and the derived status cache in one place.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `title` is non-empty after trimming.
//! - `status` is a derived cache for counter/checklist todos; only plain
//!   items flip it through explicit user action.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a base item and its extension record.
///
/// The extension shares this id; the pair is one logical entity.
pub type ItemId = Uuid;

/// Validated owner identity supplied by the auth collaborator.
pub type OwnerId = Uuid;

/// Type discriminator selecting which extension payload an item owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Deadline-driven task with optional progress tracking.
    Todo,
    /// Recurring habit. Extension logic not implemented yet.
    Habit,
    /// One-shot reminder. Extension logic not implemented yet.
    Reminder,
}

/// Completion state of a base item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Active,
    Completed,
}

impl ItemStatus {
    /// Returns the opposite state, used by the explicit toggle path.
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Completed,
            Self::Completed => Self::Active,
        }
    }
}

/// Validation failures for item construction and persistence writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemValidationError {
    NilId,
    NilOwner,
    EmptyTitle,
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "item id must not be the nil uuid"),
            Self::NilOwner => write!(f, "item owner must not be the nil uuid"),
            Self::EmptyTitle => write!(f, "item title must not be empty"),
        }
    }
}

impl Error for ItemValidationError {}

/// Canonical base record for every memo item.
///
/// Type-specific data lives in the extension record selected by `kind`;
/// this struct intentionally stays small so every list/query path can use
/// one storage shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable global id, shared with the extension record.
    pub id: ItemId,
    /// Owning user, validated by the auth collaborator.
    pub owner_id: OwnerId,
    /// Serialized as `type` to match the external schema naming.
    #[serde(rename = "type")]
    pub kind: ItemType,
    /// Short display title.
    pub title: String,
    /// Optional free-form body text.
    pub body: Option<String>,
    /// Derived for counter/checklist todos, explicit for everything else.
    pub status: ItemStatus,
    /// Manual ordering key within an owner's board.
    pub sort_order: i64,
    /// Unix epoch milliseconds, assigned at construction.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by storage on every write.
    pub updated_at: i64,
}

impl Item {
    /// Creates a new active item with a generated stable id.
    pub fn new(owner_id: OwnerId, kind: ItemType, title: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            title: title.into(),
            body: None,
            status: ItemStatus::Active,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an item with a caller-provided stable id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: ItemId,
        owner_id: OwnerId,
        kind: ItemType,
        title: impl Into<String>,
    ) -> Result<Self, ItemValidationError> {
        if id.is_nil() {
            return Err(ItemValidationError::NilId);
        }
        let item = Self {
            id,
            ..Self::new(owner_id, kind, title)
        };
        item.validate()?;
        Ok(item)
    }

    /// Checks invariants enforced before every persistence write.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id.is_nil() {
            return Err(ItemValidationError::NilId);
        }
        if self.owner_id.is_nil() {
            return Err(ItemValidationError::NilOwner);
        }
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Returns whether the item still needs attention.
    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }
}

/// Current wall-clock time in unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Item, ItemStatus, ItemType, ItemValidationError};
    use uuid::Uuid;

    #[test]
    fn new_sets_defaults() {
        let owner = Uuid::new_v4();
        let item = Item::new(owner, ItemType::Todo, "ship firmware");

        assert!(!item.id.is_nil());
        assert_eq!(item.owner_id, owner);
        assert_eq!(item.kind, ItemType::Todo);
        assert_eq!(item.status, ItemStatus::Active);
        assert_eq!(item.sort_order, 0);
        assert!(item.is_active());
    }

    #[test]
    fn with_id_rejects_nil_uuid() {
        let err = Item::with_id(Uuid::nil(), Uuid::new_v4(), ItemType::Todo, "x").unwrap_err();
        assert_eq!(err, ItemValidationError::NilId);
    }

    #[test]
    fn validate_rejects_blank_title() {
        let item = Item::new(Uuid::new_v4(), ItemType::Reminder, "   ");
        assert_eq!(item.validate(), Err(ItemValidationError::EmptyTitle));
    }

    #[test]
    fn toggled_flips_both_ways() {
        assert_eq!(ItemStatus::Active.toggled(), ItemStatus::Completed);
        assert_eq!(ItemStatus::Completed.toggled(), ItemStatus::Active);
    }
}
