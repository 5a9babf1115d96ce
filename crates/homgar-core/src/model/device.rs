// ── Device domain types ──

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

/// Address every hub occupies in its own sensor network.
pub const HUB_ADDRESS: u32 = 1;

/// What a device is, as far as the model catalog knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum DeviceKind {
    DisplayHub,
    SoilMoistureSensor,
    RainSensor,
    AirSensor,
    WaterTimer,
    /// Model code absent from the catalog. Kept, never dropped.
    Unknown,
}

/// Position of a device in the hub tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceRole {
    Hub,
    SubDevice,
}

/// A hub or sub-device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Vendor device id, unique per account.
    pub did: String,
    /// Id of the sensor network (hub) this device reports through. Lookup
    /// only; the owning `Hub` is the one holding this device.
    pub mid: String,
    /// Address within the sensor network; status entries are keyed by it.
    pub address: Option<u32>,
    pub name: String,
    /// Vendor model name, e.g. `HWS019WRF-V2`.
    pub model: Option<String>,
    pub model_code: Option<i64>,
    pub kind: DeviceKind,
    pub role: DeviceRole,
    /// Number of outlets on multi-zone controllers.
    pub port_count: Option<u32>,
    /// Alert configuration, passed through untouched.
    pub alerts: Option<Value>,
}

impl Device {
    pub fn is_hub(&self) -> bool {
        self.role == DeviceRole::Hub
    }

    /// Status id carrying this device's `general;specific` value, e.g. `D03`.
    pub fn status_id(&self) -> Option<String> {
        self.address.map(|addr| format!("D{addr:02}"))
    }

    /// Whether a `subDeviceStatus` entry id belongs to this device.
    ///
    /// Sub-devices own exactly their `Dxx` id; hubs also own every id that
    /// is not a device address (`state`, `connected`, ...).
    pub fn owns_status(&self, id: &str) -> bool {
        match parse_status_address(id) {
            Some(addr) => self.address == Some(addr),
            None => self.is_hub(),
        }
    }
}

/// Parse a `Dxx` status id into the device address it refers to.
pub fn parse_status_address(id: &str) -> Option<u32> {
    let digits = id.strip_prefix('D')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(role: DeviceRole, address: u32) -> Device {
        Device {
            did: "100".into(),
            mid: "42".into(),
            address: Some(address),
            name: "dev".into(),
            model: None,
            model_code: None,
            kind: DeviceKind::Unknown,
            role,
            port_count: None,
            alerts: None,
        }
    }

    #[test]
    fn status_id_is_zero_padded() {
        assert_eq!(device(DeviceRole::SubDevice, 3).status_id().as_deref(), Some("D03"));
        assert_eq!(device(DeviceRole::SubDevice, 12).status_id().as_deref(), Some("D12"));
    }

    #[test]
    fn parse_status_address_accepts_only_d_digits() {
        assert_eq!(parse_status_address("D01"), Some(1));
        assert_eq!(parse_status_address("D15"), Some(15));
        assert_eq!(parse_status_address("D"), None);
        assert_eq!(parse_status_address("Dx1"), None);
        assert_eq!(parse_status_address("state"), None);
    }

    #[test]
    fn hub_owns_non_address_ids() {
        let hub = device(DeviceRole::Hub, HUB_ADDRESS);
        let sensor = device(DeviceRole::SubDevice, 2);

        assert!(hub.owns_status("D01"));
        assert!(hub.owns_status("state"));
        assert!(!hub.owns_status("D02"));
        assert!(sensor.owns_status("D02"));
        assert!(!sensor.owns_status("connected"));
    }
}
