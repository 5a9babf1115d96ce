//! Device listing across the home → hub → sensor hierarchy.

use serde::Serialize;
use tabled::Tabled;

use homgar_core::{Device, Home};

use crate::cli::{GlobalOpts, HomeFilterArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

/// One device with the home and hub it belongs to.
#[derive(Debug, Serialize)]
pub(crate) struct DeviceListing {
    pub home_id: String,
    pub home_name: String,
    /// Device id of the hub; equals `did` for the hub itself.
    pub hub: String,
    #[serde(flatten)]
    pub device: Device,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Home")]
    home: String,
    #[tabled(rename = "Hub")]
    hub: String,
    #[tabled(rename = "DID")]
    did: String,
    #[tabled(rename = "Addr")]
    address: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Model")]
    model: String,
}

impl From<&DeviceListing> for DeviceRow {
    fn from(l: &DeviceListing) -> Self {
        let d = &l.device;
        Self {
            home: l.home_name.clone(),
            hub: l.hub.clone(),
            did: d.did.clone(),
            address: d.address.map(|a| a.to_string()).unwrap_or_default(),
            name: d.name.clone(),
            kind: d.kind.to_string(),
            model: match (d.model.as_deref(), d.model_code) {
                (Some(model), Some(code)) => format!("{model} ({code})"),
                (Some(model), None) => model.to_owned(),
                (None, Some(code)) => code.to_string(),
                (None, None) => String::new(),
            },
        }
    }
}

/// Flatten homes into one listing per device, hubs before their sensors.
pub(crate) fn flatten(homes: &[Home]) -> Vec<DeviceListing> {
    homes
        .iter()
        .flat_map(|home| {
            home.hubs.iter().flat_map(move |hub| {
                hub.all_devices().map(move |device| DeviceListing {
                    home_id: home.id.clone(),
                    home_name: home.name.clone(),
                    hub: hub.device.did.clone(),
                    device: device.clone(),
                })
            })
        })
        .collect()
}

pub async fn handle(
    ctx: &Context,
    args: &HomeFilterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let homes = super::resolve_homes(ctx, args).await?;
    let listing = flatten(&homes);
    let out = output::render_list(&global.output, &listing, |l| DeviceRow::from(l), |l| {
        l.device.did.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use homgar_core::{DeviceKind, DeviceRole, Hub};

    fn device(did: &str, address: u32, role: DeviceRole) -> Device {
        Device {
            did: did.into(),
            mid: "m1".into(),
            address: Some(address),
            name: did.into(),
            model: None,
            model_code: None,
            kind: DeviceKind::Unknown,
            role,
            port_count: None,
            alerts: None,
        }
    }

    #[test]
    fn flatten_lists_hub_before_its_sensors() {
        let homes = vec![Home {
            id: "h1".into(),
            name: "Garden".into(),
            hubs: vec![Hub {
                device: device("hub", 1, DeviceRole::Hub),
                devices: vec![
                    device("soil", 2, DeviceRole::SubDevice),
                    device("rain", 3, DeviceRole::SubDevice),
                ],
            }],
        }];

        let listing = flatten(&homes);
        let dids: Vec<&str> = listing.iter().map(|l| l.device.did.as_str()).collect();
        assert_eq!(dids, ["hub", "soil", "rain"]);
        assert!(listing.iter().all(|l| l.hub == "hub" && l.home_name == "Garden"));
    }

    #[test]
    fn row_shows_model_name_and_code() {
        let mut d = device("soil", 2, DeviceRole::SubDevice);
        d.model = Some("HCS021FRF".into());
        d.model_code = Some(72);
        let row = DeviceRow::from(&DeviceListing {
            home_id: "h1".into(),
            home_name: "Garden".into(),
            hub: "hub".into(),
            device: d,
        });
        assert_eq!(row.model, "HCS021FRF (72)");
        assert_eq!(row.address, "2");
    }
}
