// ── Home / hub domain types ──

use serde::{Deserialize, Serialize};

use super::device::Device;

/// A home as listed by the account, with its hubs once resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Home {
    pub id: String,
    pub name: String,
    /// Empty until fetched with `Homgar::get_home_devices`.
    pub hubs: Vec<Hub>,
}

impl Home {
    /// Iterate every device in the home, hubs first within each hub group.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.hubs.iter().flat_map(|hub| hub.all_devices())
    }

    /// Find a device anywhere in the home by its vendor id.
    pub fn device(&self, did: &str) -> Option<&Device> {
        self.devices().find(|d| d.did == did)
    }
}

/// A gateway and the sensors/controllers paired to it.
///
/// The hub is itself addressable (address 1) and reports its own status
/// alongside its sub-devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hub {
    pub device: Device,
    pub devices: Vec<Device>,
}

impl Hub {
    /// The hub followed by its sub-devices, in vendor order.
    pub fn all_devices(&self) -> impl Iterator<Item = &Device> {
        std::iter::once(&self.device).chain(self.devices.iter())
    }

    /// Resolve a device by address within this hub's sensor network.
    ///
    /// The hub wins if a sub-device reports the same address.
    pub fn device_at(&self, address: u32) -> Option<&Device> {
        self.all_devices().find(|d| d.address == Some(address))
    }
}
