// ── API-to-domain type conversions ──
//
// Bridges raw `homgar_api` response types into `homgar_core::model`
// domain types. Device conversion needs the model catalog, so it is a
// pair of functions rather than `From` impls.

use homgar_api::models::{RawDevice, RawHome};
use tracing::warn;

use crate::catalog::ModelCatalog;
use crate::model::{Device, DeviceKind, DeviceRole, HUB_ADDRESS, Home, Hub};

/// Sub-device id under which some hubs echo themselves.
const HUB_ECHO_DID: &str = "1";

// ── Home ─────────────────────────────────────────────────────────────

impl From<RawHome> for Home {
    fn from(raw: RawHome) -> Self {
        Home {
            name: raw.home_name.unwrap_or_default(),
            id: raw.hid,
            hubs: Vec::new(),
        }
    }
}

// ── Hub / Device ─────────────────────────────────────────────────────

/// Build a hub and its sub-devices, preserving vendor order.
///
/// The display hub lists itself as a sub-device with did `1`; that echo
/// is skipped. Devices with unknown model codes are kept as
/// `DeviceKind::Unknown`.
pub fn hub_from_raw(raw: &RawDevice, catalog: &ModelCatalog) -> Hub {
    let devices = raw
        .sub_devices
        .iter()
        .filter(|sub| sub.did != HUB_ECHO_DID)
        .map(|sub| device_from_raw(sub, DeviceRole::SubDevice, catalog))
        .collect();

    Hub {
        device: device_from_raw(raw, DeviceRole::Hub, catalog),
        devices,
    }
}

pub fn device_from_raw(raw: &RawDevice, role: DeviceRole, catalog: &ModelCatalog) -> Device {
    let kind = catalog.kind_of(raw.model_code);
    if kind == DeviceKind::Unknown {
        warn!(
            did = %raw.did,
            model = raw.model.as_deref().unwrap_or("?"),
            model_code = ?raw.model_code,
            "unknown device model, status will not be decoded"
        );
    }

    let address = match role {
        DeviceRole::Hub => Some(HUB_ADDRESS),
        DeviceRole::SubDevice => raw.addr,
    };

    Device {
        did: raw.did.clone(),
        mid: raw.mid.clone(),
        address,
        name: raw
            .name
            .clone()
            .or_else(|| raw.model.clone())
            .unwrap_or_else(|| raw.did.clone()),
        model: raw.model.clone(),
        model_code: raw.model_code,
        kind,
        role,
        port_count: raw.port_number,
        alerts: raw.alerts.clone(),
    }
}
