//! Todo mutation engine.
//!
//! # Responsibility
//! - Validate mode-specific preconditions and apply one mutation per call.
//! - Keep the base item's status cache consistent with the extension's
//!   progress state after every resolving mutation.
//!
//! # Invariants
//! - Every public operation is one explicit SQLite transaction: load,
//!   mutate in memory, persist, conditionally resolve, commit.
//! - Resolution always runs against the post-mutation extension state,
//!   never a stale copy.
//! - Text-only subtask edits never touch the status cache.

use crate::model::item::{Item, ItemId, ItemType, OwnerId};
use crate::model::subtask::Subtask;
use crate::model::todo::{Priority, ProgressKind, ProgressState, TodoExtension};
use crate::repo::item_repo::{ItemRepository, RepoError, SqliteItemRepository};
use crate::repo::todo_repo::{SqliteTodoRepository, TodoExtensionRepository};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TodoResult<T> = Result<T, TodoError>;

/// Request-scoped error surface of the mutation engine.
///
/// Every variant maps to one caller-visible failure kind; nothing here is
/// retried internally or treated as fatal to the process.
#[derive(Debug)]
pub enum TodoError {
    /// Referenced item or its extension does not exist.
    NotFound(ItemId),
    /// Missing required field or empty text input.
    Validation(String),
    /// Operation is invalid for the item's current progress mode.
    ModeMismatch {
        required: ProgressKind,
        actual: ProgressKind,
    },
    /// Subtask index outside the current list.
    IndexOutOfRange { index: usize, len: usize },
    /// Persisted state failed to decode; non-recoverable for that record.
    CorruptState(String),
    /// Storage commit/transport failure; effects were rolled back.
    Transaction(String),
}

impl Display for TodoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "todo item not found: {id}"),
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::ModeMismatch { required, actual } => write!(
                f,
                "operation requires {required} mode but the todo is in {actual} mode"
            ),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "subtask index {index} out of range for list of {len}")
            }
            Self::CorruptState(message) => write!(f, "corrupt persisted state: {message}"),
            Self::Transaction(message) => write!(f, "storage transaction failed: {message}"),
        }
    }
}

impl Error for TodoError {}

impl From<RepoError> for TodoError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::InvalidData(message) => Self::CorruptState(message),
            RepoError::CorruptSubtasks { .. } => Self::CorruptState(value.to_string()),
            RepoError::Db(_)
            | RepoError::UninitializedConnection { .. }
            | RepoError::MissingRequiredTable(_)
            | RepoError::MissingRequiredColumn { .. } => Self::Transaction(value.to_string()),
        }
    }
}

/// Request model for creating a TODO item plus its extension.
///
/// Deadline and priority are required; they stay optional here because the
/// transport layer hands over client payloads as-is, and the engine is the
/// single place that rejects incomplete ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub owner_id: OwnerId,
    pub title: String,
    pub body: Option<String>,
    pub sort_order: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub priority: Option<Priority>,
    /// `None` = plain, `Some(true)` = counter, `Some(false)` = checklist.
    pub progress_mode: Option<bool>,
    /// Required when `progress_mode = Some(true)`. Not clamped at creation.
    pub progress_total: Option<u32>,
    /// Used when `progress_mode = Some(false)`; defaults to an empty list.
    pub subtasks: Option<Vec<Subtask>>,
}

impl CreateTodoRequest {
    fn initial_progress(&self) -> TodoResult<ProgressState> {
        match self.progress_mode {
            None => Ok(ProgressState::Plain),
            Some(true) => {
                let total = self.progress_total.ok_or_else(|| {
                    TodoError::Validation("progress_total is required for counter mode".to_string())
                })?;
                Ok(ProgressState::Counter { current: 0, total })
            }
            Some(false) => Ok(ProgressState::Checklist {
                subtasks: self.subtasks.clone().unwrap_or_default(),
            }),
        }
    }
}

/// Request model for updating base text fields and deadline/priority.
///
/// Omitted fields preserve prior values; progress state is never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub priority: Option<Priority>,
}

/// Typed extension payload attached to a loaded item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemDetails {
    /// `extension` is `None` for todos predating extension creation.
    Todo { extension: Option<TodoExtension> },
    Habit,
    Reminder,
}

/// One logical entity: base item plus its type-selected details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWithDetails {
    pub item: Item,
    pub details: ItemDetails,
}

/// Mutation engine over one SQLite connection.
///
/// Holds the connection mutably so each operation can open an explicit
/// transaction; concurrent callers on other connections are serialized by
/// the storage layer (busy timeout + row locking).
pub struct TodoService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> TodoService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Creates the base item and its TODO extension atomically.
    ///
    /// The initial status is always `Active`; no resolution happens at
    /// creation, the first resolving mutation establishes the cache.
    pub fn create_todo(&mut self, request: &CreateTodoRequest) -> TodoResult<Item> {
        let deadline = request
            .deadline
            .ok_or_else(|| TodoError::Validation("deadline is required".to_string()))?;
        let priority = request
            .priority
            .ok_or_else(|| TodoError::Validation("priority is required".to_string()))?;
        let progress = request.initial_progress()?;

        let mut item = Item::new(request.owner_id, ItemType::Todo, request.title.clone());
        item.body = request.body.clone();
        item.sort_order = request.sort_order.unwrap_or(0);
        item.validate()
            .map_err(|err| TodoError::Validation(err.to_string()))?;

        let extension = TodoExtension {
            id: item.id,
            deadline,
            priority,
            progress,
        };

        let tx = self.conn.transaction().map_err(transaction_error)?;
        {
            let items = SqliteItemRepository::try_new(&tx)?;
            let todos = SqliteTodoRepository::try_new(&tx)?;
            items.create_item(&item)?;
            todos.create_extension(&extension)?;
        }
        tx.commit().map_err(transaction_error)?;

        info!(
            "event=todo_create module=todo status=ok item_id={} mode={}",
            item.id,
            extension.progress.kind()
        );
        Ok(item)
    }

    /// Updates base text fields and/or deadline/priority.
    ///
    /// Creates the extension for an item that predates extension creation,
    /// in which case deadline and priority are both required. Never touches
    /// progress state and never resolves.
    pub fn update_todo(&mut self, item_id: ItemId, request: &UpdateTodoRequest) -> TodoResult<Item> {
        let tx = self.conn.transaction().map_err(transaction_error)?;
        let item = {
            let items = SqliteItemRepository::try_new(&tx)?;
            let todos = SqliteTodoRepository::try_new(&tx)?;

            let mut item = items
                .get_item(item_id)?
                .ok_or(TodoError::NotFound(item_id))?;
            if item.kind != ItemType::Todo {
                return Err(TodoError::Validation(format!(
                    "item {item_id} is not a TODO item"
                )));
            }

            if let Some(title) = &request.title {
                item.title = title.clone();
            }
            if let Some(body) = &request.body {
                item.body = Some(body.clone());
            }
            items.update_item(&item)?;

            match todos.get_extension(item_id)? {
                Some(mut extension) => {
                    if let Some(deadline) = request.deadline {
                        extension.deadline = deadline;
                    }
                    if let Some(priority) = request.priority {
                        extension.priority = priority;
                    }
                    todos.update_extension(&extension)?;
                }
                None => {
                    let deadline = request.deadline.ok_or_else(|| {
                        TodoError::Validation(
                            "deadline is required to create a missing extension".to_string(),
                        )
                    })?;
                    let priority = request.priority.ok_or_else(|| {
                        TodoError::Validation(
                            "priority is required to create a missing extension".to_string(),
                        )
                    })?;
                    todos.create_extension(&TodoExtension {
                        id: item_id,
                        deadline,
                        priority,
                        progress: ProgressState::Plain,
                    })?;
                }
            }

            item
        };
        tx.commit().map_err(transaction_error)?;

        debug!("event=todo_update module=todo status=ok item_id={item_id}");
        Ok(item)
    }

    /// Advances a counter todo by one, saturating at `total`.
    ///
    /// Resolution runs even when the counter was already saturated.
    pub fn increment_progress(&mut self, item_id: ItemId) -> TodoResult<TodoExtension> {
        self.mutate_extension(item_id, true, "increment_progress", |ext| {
            let (current, total) = counter_mut(ext)?;
            if *current < *total {
                *current += 1;
            }
            Ok(())
        })
    }

    /// Rewinds a counter todo by one, saturating at zero.
    pub fn decrement_progress(&mut self, item_id: ItemId) -> TodoResult<TodoExtension> {
        self.mutate_extension(item_id, true, "decrement_progress", |ext| {
            let (current, _) = counter_mut(ext)?;
            *current = current.saturating_sub(1);
            Ok(())
        })
    }

    /// Sets the counter directly, clamping `current` into `[0, total]`.
    ///
    /// When a new `total` is supplied it takes effect first, so the clamp
    /// uses the effective total.
    pub fn set_progress(
        &mut self,
        item_id: ItemId,
        current: u32,
        total: Option<u32>,
    ) -> TodoResult<TodoExtension> {
        self.mutate_extension(item_id, true, "set_progress", |ext| {
            let (current_slot, total_slot) = counter_mut(ext)?;
            if let Some(new_total) = total {
                *total_slot = new_total;
            }
            *current_slot = current.min(*total_slot);
            Ok(())
        })
    }

    /// Flips the completion flag of one checklist entry.
    pub fn toggle_subtask(&mut self, item_id: ItemId, index: usize) -> TodoResult<TodoExtension> {
        self.mutate_extension(item_id, true, "toggle_subtask", |ext| {
            let subtasks = checklist_mut(ext)?;
            let len = subtasks.len();
            let entry = subtasks
                .get_mut(index)
                .ok_or(TodoError::IndexOutOfRange { index, len })?;
            entry.completed = !entry.completed;
            Ok(())
        })
    }

    /// Appends a new not-yet-completed entry. Text must be non-empty after
    /// trimming; the trimmed text is what gets stored.
    pub fn add_subtask(&mut self, item_id: ItemId, text: &str) -> TodoResult<TodoExtension> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TodoError::Validation(
                "subtask text must not be empty".to_string(),
            ));
        }
        let entry = Subtask::new(trimmed);

        self.mutate_extension(item_id, true, "add_subtask", move |ext| {
            checklist_mut(ext)?.push(entry);
            Ok(())
        })
    }

    /// Replaces the text of one checklist entry.
    ///
    /// Text edits cannot affect derived status, so this is the one subtask
    /// mutation that skips resolution.
    pub fn update_subtask(
        &mut self,
        item_id: ItemId,
        index: usize,
        text: &str,
    ) -> TodoResult<TodoExtension> {
        self.mutate_extension(item_id, false, "update_subtask", |ext| {
            let subtasks = checklist_mut(ext)?;
            let len = subtasks.len();
            let entry = subtasks
                .get_mut(index)
                .ok_or(TodoError::IndexOutOfRange { index, len })?;
            entry.text = text.to_string();
            Ok(())
        })
    }

    /// Removes one checklist entry, preserving the order of the rest.
    pub fn delete_subtask(&mut self, item_id: ItemId, index: usize) -> TodoResult<TodoExtension> {
        self.mutate_extension(item_id, true, "delete_subtask", |ext| {
            let subtasks = checklist_mut(ext)?;
            if index >= subtasks.len() {
                return Err(TodoError::IndexOutOfRange {
                    index,
                    len: subtasks.len(),
                });
            }
            subtasks.remove(index);
            Ok(())
        })
    }

    /// Recomputes the status cache from the stored extension state.
    ///
    /// Public heal path for callers that observed a commit failure between
    /// the extension write and the status write. No-op for non-TODO items
    /// and for plain todos.
    pub fn resolve_and_sync(&mut self, item_id: ItemId) -> TodoResult<Item> {
        let tx = self.conn.transaction().map_err(transaction_error)?;
        let item = {
            let items = SqliteItemRepository::try_new(&tx)?;
            let todos = SqliteTodoRepository::try_new(&tx)?;

            let mut item = items
                .get_item(item_id)?
                .ok_or(TodoError::NotFound(item_id))?;
            if item.kind == ItemType::Todo {
                let extension = todos
                    .get_extension(item_id)?
                    .ok_or(TodoError::NotFound(item_id))?;
                if let Some(status) = extension.progress.resolved_status() {
                    if status != item.status {
                        items.set_status(item_id, status)?;
                        item.status = status;
                    }
                }
            }
            item
        };
        tx.commit().map_err(transaction_error)?;
        Ok(item)
    }

    /// Loads one item together with its type-selected details.
    pub fn get_item_with_details(&self, item_id: ItemId) -> TodoResult<ItemWithDetails> {
        let items = SqliteItemRepository::try_new(&*self.conn)?;
        let todos = SqliteTodoRepository::try_new(&*self.conn)?;

        let item = items
            .get_item(item_id)?
            .ok_or(TodoError::NotFound(item_id))?;
        let details = match item.kind {
            ItemType::Todo => ItemDetails::Todo {
                extension: todos.get_extension(item_id)?,
            },
            ItemType::Habit => ItemDetails::Habit,
            ItemType::Reminder => ItemDetails::Reminder,
        };

        Ok(ItemWithDetails { item, details })
    }

    /// Shared transaction skeleton for every extension mutation.
    ///
    /// Loads item + extension, applies `mutate`, persists the extension and
    /// (when `resolve` is set) writes the derived status back to the base
    /// item, all inside one transaction.
    fn mutate_extension<F>(
        &mut self,
        item_id: ItemId,
        resolve: bool,
        op: &'static str,
        mutate: F,
    ) -> TodoResult<TodoExtension>
    where
        F: FnOnce(&mut TodoExtension) -> TodoResult<()>,
    {
        let tx = self.conn.transaction().map_err(transaction_error)?;
        let extension = {
            let items = SqliteItemRepository::try_new(&tx)?;
            let todos = SqliteTodoRepository::try_new(&tx)?;

            let item = items
                .get_item(item_id)?
                .ok_or(TodoError::NotFound(item_id))?;
            let mut extension = todos
                .get_extension(item_id)?
                .ok_or(TodoError::NotFound(item_id))?;

            mutate(&mut extension)?;
            todos.update_extension(&extension)?;

            if resolve {
                if let Some(status) = extension.progress.resolved_status() {
                    if status != item.status {
                        items.set_status(item_id, status)?;
                    }
                }
            }

            extension
        };
        tx.commit().map_err(transaction_error)?;

        debug!("event=todo_mutation module=todo status=ok op={op} item_id={item_id}");
        Ok(extension)
    }
}

fn counter_mut(ext: &mut TodoExtension) -> TodoResult<(&mut u32, &mut u32)> {
    match &mut ext.progress {
        ProgressState::Counter { current, total } => Ok((current, total)),
        other => Err(TodoError::ModeMismatch {
            required: ProgressKind::Counter,
            actual: other.kind(),
        }),
    }
}

fn checklist_mut(ext: &mut TodoExtension) -> TodoResult<&mut Vec<Subtask>> {
    match &mut ext.progress {
        ProgressState::Checklist { subtasks } => Ok(subtasks),
        other => Err(TodoError::ModeMismatch {
            required: ProgressKind::Checklist,
            actual: other.kind(),
        }),
    }
}

fn transaction_error(err: rusqlite::Error) -> TodoError {
    TodoError::Transaction(err.to_string())
}
