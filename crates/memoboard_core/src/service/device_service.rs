//! Device registry use-case service.
//!
//! # Responsibility
//! - Register hardware devices and resolve their tokens to owners.
//! - Act as the auth collaborator for hardware-side mutation calls.
//!
//! # Invariants
//! - Only enabled devices resolve to an owner.
//! - Successful resolution bumps the device's `last_online` marker.

use crate::model::device::{Device, DeviceId};
use crate::model::item::OwnerId;
use crate::repo::device_repo::DeviceRepository;
use crate::repo::item_repo::RepoResult;
use log::debug;

/// Use-case service wrapper for device registration and auth lookups.
pub struct DeviceService<R: DeviceRepository> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a device; new devices start enabled.
    pub fn register_device(&self, device: &Device) -> RepoResult<DeviceId> {
        self.repo.register_device(device)
    }

    /// Resolves an auth token to the owning user.
    ///
    /// Returns `None` for unknown tokens and for disabled devices; a hit
    /// records the device as online.
    pub fn resolve_owner(&self, token: &str) -> RepoResult<Option<OwnerId>> {
        let Some(device) = self.repo.find_by_token(token)? else {
            return Ok(None);
        };
        if !device.enabled {
            debug!(
                "event=device_auth module=device status=rejected device_id={} reason=disabled",
                device.id
            );
            return Ok(None);
        }

        self.repo.touch_last_online(device.id)?;
        Ok(Some(device.owner_id))
    }

    /// Lists all devices registered to one owner.
    pub fn list_devices(&self, owner: OwnerId) -> RepoResult<Vec<Device>> {
        self.repo.list_by_owner(owner)
    }

    /// Removes a device registration; its token stops resolving.
    pub fn delete_device(&self, id: DeviceId) -> RepoResult<()> {
        self.repo.delete_device(id)
    }
}
