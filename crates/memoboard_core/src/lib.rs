//! Core domain logic for memoboard.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::device::{Device, DeviceId};
pub use model::item::{Item, ItemId, ItemStatus, ItemType, ItemValidationError, OwnerId};
pub use model::subtask::{decode_subtasks, encode_subtasks, Subtask, SubtaskCodecError};
pub use model::todo::{Priority, ProgressKind, ProgressState, TodoExtension};
pub use repo::device_repo::{DeviceRepository, SqliteDeviceRepository};
pub use repo::item_repo::{
    ItemListQuery, ItemRepository, RepoError, RepoResult, SqliteItemRepository,
};
pub use repo::todo_repo::{SqliteTodoRepository, TodoExtensionRepository};
pub use service::device_service::DeviceService;
pub use service::item_service::ItemService;
pub use service::todo_service::{
    CreateTodoRequest, ItemDetails, ItemWithDetails, TodoError, TodoResult, TodoService,
    UpdateTodoRequest,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
