//! Hardware device domain model.
//!
//! # Responsibility
//! - Define the registered-device record used for token authentication.
//!
//! # Invariants
//! - `token` is unique across all devices.
//! - Disabled devices never resolve to an owner.

use crate::model::item::OwnerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a registered device.
pub type DeviceId = Uuid;

/// A hardware client bound to one owner through its auth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub owner_id: OwnerId,
    /// Human-readable label shown in device management.
    pub name: String,
    /// Opaque auth token presented by the device on every call.
    pub token: String,
    pub mac_address: Option<String>,
    /// Disabled devices keep their registration but cannot authenticate.
    pub enabled: bool,
    /// Unix epoch milliseconds of the last successful token resolution.
    pub last_online: Option<i64>,
    /// Unix epoch milliseconds, assigned at registration.
    pub created_at: i64,
}

impl Device {
    /// Creates an enabled device with a generated stable id.
    pub fn new(owner_id: OwnerId, name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            token: token.into(),
            mac_address: None,
            enabled: true,
            last_online: None,
            created_at: super::item::now_epoch_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Device;
    use uuid::Uuid;

    #[test]
    fn new_devices_start_enabled_and_never_seen() {
        let device = Device::new(Uuid::new_v4(), "desk display", "tok-1");
        assert!(device.enabled);
        assert_eq!(device.last_online, None);
        assert!(!device.id.is_nil());
    }
}
