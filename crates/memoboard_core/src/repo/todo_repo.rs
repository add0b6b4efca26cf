//! Todo extension repository keyed by the owning item id.
//!
//! # Responsibility
//! - Persist the TODO extension record in the legacy column layout.
//! - Map `ProgressState` onto `progress_mode`/counters/`subtasks` columns,
//!   clearing whichever representation is inactive on every write.
//!
//! # Invariants
//! - `todo_items.uuid` equals the owning `items.uuid` (shared identity).
//! - Stored subtask blobs that fail to decode surface as corrupt state,
//!   never as an empty list.

use crate::model::item::ItemId;
use crate::model::subtask::{decode_subtasks, encode_subtasks};
use crate::model::todo::{Priority, ProgressState, TodoExtension};
use crate::repo::item_repo::{ensure_connection_ready, parse_uuid_column, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const TODO_SELECT_SQL: &str = "SELECT
    uuid,
    deadline,
    priority,
    progress_mode,
    progress_current,
    progress_total,
    subtasks
FROM todo_items";

/// Repository interface for the 1:1 TODO extension store.
pub trait TodoExtensionRepository {
    fn create_extension(&self, ext: &TodoExtension) -> RepoResult<()>;
    fn update_extension(&self, ext: &TodoExtension) -> RepoResult<()>;
    fn get_extension(&self, id: ItemId) -> RepoResult<Option<TodoExtension>>;
}

/// SQLite-backed todo extension repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

/// Column-level image of one `ProgressState` value.
struct ProgressColumns {
    mode: Option<i64>,
    current: Option<i64>,
    total: Option<i64>,
    subtasks: Option<String>,
}

fn progress_to_columns(id: ItemId, progress: &ProgressState) -> RepoResult<ProgressColumns> {
    Ok(match progress {
        ProgressState::Plain => ProgressColumns {
            mode: None,
            current: None,
            total: None,
            subtasks: None,
        },
        ProgressState::Counter { current, total } => ProgressColumns {
            mode: Some(1),
            current: Some(i64::from(*current)),
            total: Some(i64::from(*total)),
            subtasks: None,
        },
        ProgressState::Checklist { subtasks } => ProgressColumns {
            mode: Some(0),
            current: None,
            total: None,
            subtasks: Some(
                encode_subtasks(subtasks)
                    .map_err(|source| RepoError::CorruptSubtasks { id, source })?,
            ),
        },
    })
}

impl TodoExtensionRepository for SqliteTodoRepository<'_> {
    fn create_extension(&self, ext: &TodoExtension) -> RepoResult<()> {
        let columns = progress_to_columns(ext.id, &ext.progress)?;

        self.conn.execute(
            "INSERT INTO todo_items (
                uuid,
                deadline,
                priority,
                progress_mode,
                progress_current,
                progress_total,
                subtasks
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                ext.id.to_string(),
                ext.deadline.to_string(),
                priority_to_db(ext.priority),
                columns.mode,
                columns.current,
                columns.total,
                columns.subtasks.as_deref(),
            ],
        )?;

        Ok(())
    }

    fn update_extension(&self, ext: &TodoExtension) -> RepoResult<()> {
        let columns = progress_to_columns(ext.id, &ext.progress)?;

        let changed = self.conn.execute(
            "UPDATE todo_items
             SET
                deadline = ?1,
                priority = ?2,
                progress_mode = ?3,
                progress_current = ?4,
                progress_total = ?5,
                subtasks = ?6
             WHERE uuid = ?7;",
            params![
                ext.deadline.to_string(),
                priority_to_db(ext.priority),
                columns.mode,
                columns.current,
                columns.total,
                columns.subtasks.as_deref(),
                ext.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(ext.id));
        }

        Ok(())
    }

    fn get_extension(&self, id: ItemId) -> RepoResult<Option<TodoExtension>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }

        Ok(None)
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<TodoExtension> {
    let id = parse_uuid_column(row, "uuid")?;

    let deadline_text: String = row.get("deadline")?;
    let deadline = NaiveDate::parse_from_str(&deadline_text, "%Y-%m-%d").map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid deadline `{deadline_text}` in todo_items.deadline"
        ))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in todo_items.priority"
        ))
    })?;

    let progress = match row.get::<_, Option<i64>>("progress_mode")? {
        None => ProgressState::Plain,
        Some(1) => {
            let current = require_counter_column(row, id, "progress_current")?;
            let total = require_counter_column(row, id, "progress_total")?;
            ProgressState::Counter { current, total }
        }
        Some(0) => {
            let raw: Option<String> = row.get("subtasks")?;
            let subtasks = decode_subtasks(raw.as_deref())
                .map_err(|source| RepoError::CorruptSubtasks { id, source })?;
            ProgressState::Checklist { subtasks }
        }
        Some(other) => {
            return Err(RepoError::InvalidData(format!(
                "invalid progress_mode value `{other}` in todo_items.progress_mode"
            )));
        }
    };

    Ok(TodoExtension {
        id,
        deadline,
        priority,
        progress,
    })
}

fn require_counter_column(row: &Row<'_>, id: ItemId, column: &'static str) -> RepoResult<u32> {
    let value = row
        .get::<_, Option<i64>>(column)?
        .ok_or_else(|| RepoError::InvalidData(format!("counter todo {id} has NULL {column}")))?;
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative {column} value `{value}` for {id}")))
}

fn priority_to_db(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        _ => None,
    }
}
