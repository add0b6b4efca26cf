//! Domain model for memoboard items and their typed extensions.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one base-item shape plus type-selected extension payloads.
//!
//! # Invariants
//! - A base item and its extension share one stable `ItemId`.
//! - Exactly one progress representation is active per todo, by construction.

pub mod device;
pub mod item;
pub mod subtask;
pub mod todo;
