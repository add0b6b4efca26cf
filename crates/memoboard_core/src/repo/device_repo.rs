//! Device registry repository.
//!
//! # Responsibility
//! - Persist registered hardware devices and their auth tokens.
//! - Answer token lookups for the auth collaborator.
//!
//! # Invariants
//! - `devices.token` stays unique (enforced by the schema).
//! - `last_online` is only moved forward by `touch_last_online`.

use crate::model::device::{Device, DeviceId};
use crate::model::item::OwnerId;
use crate::repo::item_repo::{ensure_table_with_columns, parse_uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const DEVICE_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    name,
    token,
    mac_address,
    enabled,
    last_online,
    created_at
FROM devices";

/// Repository interface for device registration and token lookup.
pub trait DeviceRepository {
    fn register_device(&self, device: &Device) -> RepoResult<DeviceId>;
    fn find_by_token(&self, token: &str) -> RepoResult<Option<Device>>;
    fn list_by_owner(&self, owner: OwnerId) -> RepoResult<Vec<Device>>;
    fn touch_last_online(&self, id: DeviceId) -> RepoResult<()>;
    fn delete_device(&self, id: DeviceId) -> RepoResult<()>;
}

/// SQLite-backed device repository.
pub struct SqliteDeviceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeviceRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_with_columns(
            conn,
            "devices",
            &[
                "uuid",
                "owner_id",
                "name",
                "token",
                "mac_address",
                "enabled",
                "last_online",
                "created_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl DeviceRepository for SqliteDeviceRepository<'_> {
    fn register_device(&self, device: &Device) -> RepoResult<DeviceId> {
        if device.name.trim().is_empty() || device.token.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "device name and token must be non-empty".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO devices (
                uuid,
                owner_id,
                name,
                token,
                mac_address,
                enabled,
                last_online,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                device.id.to_string(),
                device.owner_id.to_string(),
                device.name.as_str(),
                device.token.as_str(),
                device.mac_address.as_deref(),
                i64::from(device.enabled),
                device.last_online,
                device.created_at,
            ],
        )?;

        Ok(device.id)
    }

    fn find_by_token(&self, token: &str) -> RepoResult<Option<Device>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DEVICE_SELECT_SQL} WHERE token = ?1;"))?;

        let mut rows = stmt.query(params![token])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_device_row(row)?));
        }

        Ok(None)
    }

    fn list_by_owner(&self, owner: OwnerId) -> RepoResult<Vec<Device>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DEVICE_SELECT_SQL} WHERE owner_id = ?1 ORDER BY created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query(params![owner.to_string()])?;
        let mut devices = Vec::new();
        while let Some(row) = rows.next()? {
            devices.push(parse_device_row(row)?);
        }

        Ok(devices)
    }

    fn touch_last_online(&self, id: DeviceId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE devices
             SET last_online = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_device(&self, id: DeviceId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM devices WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_device_row(row: &Row<'_>) -> RepoResult<Device> {
    let enabled = match row.get::<_, i64>("enabled")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid enabled value `{other}` in devices.enabled"
            )));
        }
    };

    Ok(Device {
        id: parse_uuid_column(row, "uuid")?,
        owner_id: parse_uuid_column(row, "owner_id")?,
        name: row.get("name")?,
        token: row.get("token")?,
        mac_address: row.get("mac_address")?,
        enabled,
        last_online: row.get("last_online")?,
        created_at: row.get("created_at")?,
    })
}
