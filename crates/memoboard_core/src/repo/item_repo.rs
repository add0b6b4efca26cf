//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `items` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Item::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Hard delete cascades into the extension row via the shared primary key.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{Item, ItemId, ItemStatus, ItemType, ItemValidationError, OwnerId};
use crate::model::subtask::SubtaskCodecError;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    type,
    title,
    body,
    status,
    sort_order,
    created_at,
    updated_at
FROM items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    NotFound(ItemId),
    InvalidData(String),
    /// Stored subtask blob failed to decode. Non-recoverable for that row.
    CorruptSubtasks {
        id: ItemId,
        source: SubtaskCodecError,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::CorruptSubtasks { id, source } => {
                write!(f, "corrupt subtask blob for item {id}: {source}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::CorruptSubtasks { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing a user's items.
#[derive(Debug, Clone, Default)]
pub struct ItemListQuery {
    pub owner: Option<OwnerId>,
    pub kind: Option<ItemType>,
    pub status: Option<ItemStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for item CRUD operations.
pub trait ItemRepository {
    fn create_item(&self, item: &Item) -> RepoResult<ItemId>;
    fn update_item(&self, item: &Item) -> RepoResult<()>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>>;
    /// Writes only the derived status cache, bumping `updated_at`.
    fn set_status(&self, id: ItemId, status: ItemStatus) -> RepoResult<()>;
    /// Hard delete; the extension row goes with it (shared-id cascade).
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository after verifying the connection is migrated
    /// and carries the required schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &Item) -> RepoResult<ItemId> {
        item.validate()?;

        self.conn.execute(
            "INSERT INTO items (
                uuid,
                owner_id,
                type,
                title,
                body,
                status,
                sort_order,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                item.id.to_string(),
                item.owner_id.to_string(),
                item_type_to_db(item.kind),
                item.title.as_str(),
                item.body.as_deref(),
                item_status_to_db(item.status),
                item.sort_order,
                item.created_at,
                item.updated_at,
            ],
        )?;

        Ok(item.id)
    }

    fn update_item(&self, item: &Item) -> RepoResult<()> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE items
             SET
                owner_id = ?1,
                type = ?2,
                title = ?3,
                body = ?4,
                status = ?5,
                sort_order = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?7;",
            params![
                item.owner_id.to_string(),
                item_type_to_db(item.kind),
                item.title.as_str(),
                item.body.as_deref(),
                item_status_to_db(item.status),
                item.sort_order,
                item.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(item.id));
        }

        Ok(())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner) = query.owner {
            sql.push_str(" AND owner_id = ?");
            bind_values.push(Value::Text(owner.to_string()));
        }

        if let Some(kind) = query.kind {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(item_type_to_db(kind).to_string()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(item_status_to_db(status).to_string()));
        }

        sql.push_str(" ORDER BY sort_order ASC, created_at ASC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn set_status(&self, id: ItemId, status: ItemStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![item_status_to_db(status), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Verifies schema version and required tables/columns for item storage.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    ensure_table_with_columns(
        conn,
        "items",
        &[
            "uuid",
            "owner_id",
            "type",
            "title",
            "body",
            "status",
            "sort_order",
            "created_at",
            "updated_at",
        ],
    )?;
    ensure_table_with_columns(
        conn,
        "todo_items",
        &[
            "uuid",
            "deadline",
            "priority",
            "progress_mode",
            "progress_current",
            "progress_total",
            "subtasks",
        ],
    )?;

    Ok(())
}

pub(crate) fn ensure_table_with_columns(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let table_count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        [table],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut present = Vec::new();
    while let Some(row) = rows.next()? {
        present.push(row.get::<_, String>("name")?);
    }

    for column in columns {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id = parse_uuid_column(row, "uuid")?;
    let owner_id = parse_uuid_column(row, "owner_id")?;

    let type_text: String = row.get("type")?;
    let kind = parse_item_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid item type `{type_text}` in items.type"))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_item_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in items.status"))
    })?;

    let item = Item {
        id,
        owner_id,
        kind,
        title: row.get("title")?,
        body: row.get("body")?,
        status,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    item.validate()?;
    Ok(item)
}

pub(crate) fn parse_uuid_column(row: &Row<'_>, column: &'static str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in `{column}`")))
}

pub(crate) fn item_type_to_db(kind: ItemType) -> &'static str {
    match kind {
        ItemType::Todo => "TODO",
        ItemType::Habit => "HABIT",
        ItemType::Reminder => "REMINDER",
    }
}

pub(crate) fn parse_item_type(value: &str) -> Option<ItemType> {
    match value {
        "TODO" => Some(ItemType::Todo),
        "HABIT" => Some(ItemType::Habit),
        "REMINDER" => Some(ItemType::Reminder),
        _ => None,
    }
}

pub(crate) fn item_status_to_db(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Active => "active",
        ItemStatus::Completed => "completed",
    }
}

pub(crate) fn parse_item_status(value: &str) -> Option<ItemStatus> {
    match value {
        "active" => Some(ItemStatus::Active),
        "completed" => Some(ItemStatus::Completed),
        _ => None,
    }
}
