//! Current readings for every device, one status call per hub.

use serde::Serialize;
use tabled::Tabled;

use homgar_core::{Home, SensorReading};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

/// One reading with the device it came from.
#[derive(Debug, Serialize)]
pub(crate) struct ReadingListing {
    pub home_id: String,
    pub did: String,
    pub device: String,
    #[serde(flatten)]
    pub reading: SensorReading,
}

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&ReadingListing> for ReadingRow {
    fn from(l: &ReadingListing) -> Self {
        Self {
            device: l.device.clone(),
            code: l.reading.code.clone(),
            metric: l.reading.metric.to_string(),
            value: l.reading.display_value(),
            time: l
                .reading
                .timestamp
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}

async fn collect(
    ctx: &Context,
    homes: &[Home],
    hide_unknown: bool,
) -> Result<Vec<ReadingListing>, CliError> {
    let mut listing = Vec::new();
    for home in homes {
        for hub in &home.hubs {
            let data = ctx.homgar.get_hub_data(hub).await?;
            for (did, readings) in data {
                let device = hub
                    .all_devices()
                    .find(|d| d.did == did)
                    .map_or_else(|| did.clone(), |d| d.name.clone());
                listing.extend(
                    readings
                        .into_iter()
                        .filter(|r| !(hide_unknown && r.is_unknown()))
                        .map(|reading| ReadingListing {
                            home_id: home.id.clone(),
                            did: did.clone(),
                            device: device.clone(),
                            reading,
                        }),
                );
            }
        }
    }
    Ok(listing)
}

pub async fn handle(ctx: &Context, args: &StatusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let homes = super::resolve_homes(ctx, &args.filter).await?;
    let listing = collect(ctx, &homes, args.hide_unknown).await?;
    let out = output::render_list(&global.output, &listing, |l| ReadingRow::from(l), |l| {
        format!("{}\t{}\t{}", l.did, l.reading.code, l.reading.display_value())
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
