//! Generic item use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points over the base item store.
//! - Own the explicit status toggle used by plain items.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Derived status writes stay in the todo mutation engine; this service
//!   only flips status on explicit user action.

use crate::model::item::{Item, ItemId, ItemStatus, ItemType, OwnerId};
use crate::repo::item_repo::{ItemListQuery, ItemRepository, RepoResult};

/// Use-case service wrapper for item CRUD operations.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new base item through repository persistence.
    pub fn create_item(&self, item: &Item) -> RepoResult<ItemId> {
        self.repo.create_item(item)
    }

    /// Gets one item by id.
    pub fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.repo.get_item(id)
    }

    /// Lists an owner's items in manual sort order.
    pub fn list_items(&self, owner: OwnerId) -> RepoResult<Vec<Item>> {
        self.repo.list_items(&ItemListQuery {
            owner: Some(owner),
            ..ItemListQuery::default()
        })
    }

    /// Lists an owner's items of one type.
    pub fn list_items_by_type(&self, owner: OwnerId, kind: ItemType) -> RepoResult<Vec<Item>> {
        self.repo.list_items(&ItemListQuery {
            owner: Some(owner),
            kind: Some(kind),
            ..ItemListQuery::default()
        })
    }

    /// Lists an owner's items in one completion state.
    pub fn list_items_by_status(&self, owner: OwnerId, status: ItemStatus) -> RepoResult<Vec<Item>> {
        self.repo.list_items(&ItemListQuery {
            owner: Some(owner),
            status: Some(status),
            ..ItemListQuery::default()
        })
    }

    /// Updates an existing item by stable id.
    pub fn update_item(&self, item: &Item) -> RepoResult<()> {
        self.repo.update_item(item)
    }

    /// Flips completion state by explicit user action.
    ///
    /// This is the only status path for plain todos; counter/checklist
    /// todos get their status rewritten by the next resolving mutation.
    pub fn toggle_status(&self, id: ItemId) -> RepoResult<Item> {
        let mut item = self
            .repo
            .get_item(id)?
            .ok_or(crate::repo::item_repo::RepoError::NotFound(id))?;
        item.status = item.status.toggled();
        self.repo.set_status(id, item.status)?;
        Ok(item)
    }

    /// Hard-deletes an item; the extension row cascades with it.
    pub fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        self.repo.delete_item(id)
    }
}
