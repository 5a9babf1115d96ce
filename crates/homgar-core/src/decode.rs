// ── Status decoding ──
//
// Turns `subDeviceStatus` entries into `SensorReading`s using the
// `ModelCatalog` tables. Decoding never fails: anything the tables do not
// describe, or that does not parse, comes out as a `Metric::Unknown`
// reading carrying the vendor text.
//
// `Dxx` values look like `1,-60,1;766,52,G=31351`: a general part shared
// by every device (the middle field is the RF RSSI), then a
// device-specific part laid out per model.

use chrono::{DateTime, Utc};
use homgar_api::models::RawStatusEntry;
use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::{FieldSpec, ModelCatalog};
use crate::model::device::parse_status_address;
use crate::model::{Device, Hub, Metric, ReadingValue, SensorReading, Unit};

/// Decoder bound to one catalog and one fetch.
#[derive(Debug, Clone, Copy)]
pub struct StatusDecoder<'a> {
    catalog: &'a ModelCatalog,
    fetched_at: DateTime<Utc>,
}

impl<'a> StatusDecoder<'a> {
    /// `fetched_at` stamps readings whose entry carries no vendor time.
    pub fn new(catalog: &'a ModelCatalog, fetched_at: DateTime<Utc>) -> Self {
        Self {
            catalog,
            fetched_at,
        }
    }

    /// Readings for a single device, in vendor order.
    pub fn decode_device(&self, device: &Device, entries: &[RawStatusEntry]) -> Vec<SensorReading> {
        entries
            .iter()
            .filter(|entry| device.owns_status(&entry.id))
            .flat_map(|entry| self.decode_entry(device, entry))
            .collect()
    }

    /// Readings for the hub and every sub-device, keyed by device id.
    ///
    /// Every device of the hub has a key, even without readings. `Dxx`
    /// entries whose address matches no device are kept on the hub as
    /// unknown readings.
    pub fn decode_hub(
        &self,
        hub: &Hub,
        entries: &[RawStatusEntry],
    ) -> IndexMap<String, Vec<SensorReading>> {
        let mut readings: IndexMap<String, Vec<SensorReading>> = hub
            .all_devices()
            .map(|d| (d.did.clone(), Vec::new()))
            .collect();

        for entry in entries {
            let owner = match parse_status_address(&entry.id) {
                Some(address) => hub.device_at(address),
                None => Some(&hub.device),
            };

            let (did, decoded) = match owner {
                Some(device) => (device.did.as_str(), self.decode_entry(device, entry)),
                None => {
                    debug!(id = %entry.id, hub = %hub.device.did, "status entry for unpaired address");
                    let unclaimed = entry
                        .value
                        .as_deref()
                        .map(|value| unknown(&entry.id, value, self.timestamp(entry)))
                        .into_iter()
                        .collect();
                    (hub.device.did.as_str(), unclaimed)
                }
            };

            if let Some(list) = readings.get_mut(did) {
                list.extend(decoded);
            }
        }

        readings
    }

    /// Decode one entry as reported for `device`.
    pub fn decode_entry(&self, device: &Device, entry: &RawStatusEntry) -> Vec<SensorReading> {
        let Some(value) = entry.value.as_deref() else {
            debug!(id = %entry.id, "status entry without value");
            return Vec::new();
        };
        let ts = self.timestamp(entry);

        if parse_status_address(&entry.id).is_some() {
            let layout = device
                .model_code
                .and_then(|code| self.catalog.model(code))
                .and_then(|model| model.fields.as_deref());
            return decode_device_value(&entry.id, value, layout, ts);
        }

        match self.catalog.hub_field(&entry.id) {
            Some(fields) => decode_hub_value(&entry.id, value, fields, ts),
            None => vec![unknown(&entry.id, value, ts)],
        }
    }

    fn timestamp(&self, entry: &RawStatusEntry) -> DateTime<Utc> {
        entry
            .time
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(self.fetched_at)
    }
}

// ── Dxx values ───────────────────────────────────────────────────────

fn decode_device_value(
    id: &str,
    value: &str,
    layout: Option<&[FieldSpec]>,
    ts: DateTime<Utc>,
) -> Vec<SensorReading> {
    let Some((general, specific)) = value.split_once(';') else {
        return vec![unknown(id, value, ts)];
    };

    let mut readings = decode_general(id, general, ts);

    if specific.is_empty() {
        return readings;
    }
    let Some(layout) = layout else {
        readings.push(unknown(&format!("{id}.s"), specific, ts));
        return readings;
    };

    // Some models end the specific part with a trailing comma.
    for (i, field) in specific.split(',').enumerate().filter(|(_, f)| !f.is_empty()) {
        let code = format!("{id}.s{i}");
        match layout.get(i) {
            Some(spec) => readings.extend(decode_field(&code, field, spec, ts)),
            None => readings.push(unknown(&code, field, ts)),
        }
    }
    readings
}

/// `x,rssi,y`: only the RSSI is understood.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn decode_general(id: &str, general: &str, ts: DateTime<Utc>) -> Vec<SensorReading> {
    let fields: Vec<&str> = general.split(',').collect();
    let [first, rssi, last] = fields.as_slice() else {
        return vec![unknown(&format!("{id}.g"), general, ts)];
    };

    let rssi_code = format!("{id}.g1");
    let rssi = match rssi.parse::<i64>() {
        Ok(dbm) => SensorReading {
            code: rssi_code,
            metric: Metric::RfRssi,
            value: ReadingValue::Number(dbm as f64),
            unit: Some(Unit::Dbm),
            timestamp: ts,
        },
        Err(_) => unknown(&rssi_code, rssi, ts),
    };

    vec![
        unknown(&format!("{id}.g0"), first, ts),
        rssi,
        unknown(&format!("{id}.g2"), last, ts),
    ]
}

// ── Hub-level values ─────────────────────────────────────────────────

fn decode_hub_value(
    id: &str,
    value: &str,
    fields: &[FieldSpec],
    ts: DateTime<Utc>,
) -> Vec<SensorReading> {
    let parts: Vec<&str> = value.split(',').collect();
    if let ([part], [spec]) = (parts.as_slice(), fields) {
        return decode_field(id, part, spec, ts);
    }

    parts
        .iter()
        .enumerate()
        .flat_map(|(i, part)| {
            let code = format!("{id}.{i}");
            match fields.get(i) {
                Some(spec) => decode_field(&code, part, spec, ts),
                None => vec![unknown(&code, part, ts)],
            }
        })
        .collect()
}

// ── Single fields ────────────────────────────────────────────────────

/// Decode `[X=]current[(a/b/c)]` per `spec`. All or nothing: any part
/// that does not parse turns the whole field into one unknown reading.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn decode_field(
    code: &str,
    text: &str,
    spec: &FieldSpec,
    ts: DateTime<Utc>,
) -> Vec<SensorReading> {
    let Some(parsed) = parse_field(text, spec.prefix.as_deref()) else {
        return vec![unknown(code, text, ts)];
    };

    let mut readings = Vec::with_capacity(1 + parsed.stats.len());
    readings.push(SensorReading {
        code: code.to_owned(),
        metric: spec.metric,
        value: spec.conversion.apply(parsed.current),
        unit: spec.unit,
        timestamp: ts,
    });

    for (k, raw) in parsed.stats.iter().enumerate() {
        let stat_code = format!("{code}.{k}");
        let reading = match spec.stats.get(k).copied().flatten() {
            Some(metric) if metric.is_trend() => SensorReading {
                code: stat_code,
                metric,
                value: ReadingValue::Number(*raw as f64),
                unit: None,
                timestamp: ts,
            },
            Some(metric) => SensorReading {
                code: stat_code,
                metric,
                value: spec.conversion.apply(*raw),
                unit: spec.unit,
                timestamp: ts,
            },
            None => unknown(&stat_code, &raw.to_string(), ts),
        };
        readings.push(reading);
    }

    readings
}

fn unknown(code: &str, raw: &str, ts: DateTime<Utc>) -> SensorReading {
    SensorReading {
        code: code.to_owned(),
        metric: Metric::Unknown,
        value: ReadingValue::Raw(raw.to_owned()),
        unit: None,
        timestamp: ts,
    }
}

// ── Field grammar ────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct ParsedField {
    current: i64,
    stats: Vec<i64>,
}

fn parse_field(text: &str, prefix: Option<&str>) -> Option<ParsedField> {
    let body = match prefix {
        Some(prefix) => text.strip_prefix(prefix)?.strip_prefix('=')?,
        None => text,
    };

    let (current, stats) = match body.split_once('(') {
        Some((current, rest)) => {
            let inner = rest.strip_suffix(')')?;
            let stats = inner
                .split('/')
                .map(|s| s.parse::<i64>().ok())
                .collect::<Option<Vec<_>>>()?;
            (current, stats)
        }
        None => (body, Vec::new()),
    };

    Some(ParsedField {
        current: current.parse().ok()?,
        stats,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{DeviceRole, HUB_ADDRESS};

    fn fetched_at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn device(did: &str, role: DeviceRole, address: u32, model_code: i64) -> Device {
        let catalog = ModelCatalog::builtin();
        Device {
            did: did.into(),
            mid: "42".into(),
            address: Some(address),
            name: did.into(),
            model: None,
            model_code: Some(model_code),
            kind: catalog.kind_of(Some(model_code)),
            role,
            port_count: None,
            alerts: None,
        }
    }

    fn entry(id: &str, value: &str) -> RawStatusEntry {
        RawStatusEntry {
            id: id.into(),
            value: Some(value.into()),
            time: None,
        }
    }

    fn metrics(readings: &[SensorReading]) -> Vec<Metric> {
        readings.iter().map(|r| r.metric).collect()
    }

    fn number(readings: &[SensorReading], metric: Metric) -> f64 {
        readings
            .iter()
            .find(|r| r.metric == metric)
            .and_then(|r| r.value.as_f64())
            .unwrap()
    }

    #[test]
    fn soil_sensor_value_decodes_temperature_moisture_and_light() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let sensor = device("200", DeviceRole::SubDevice, 2, 72);

        let readings = decoder.decode_entry(&sensor, &entry("D02", "1,-60,1;766,52,G=31351"));

        assert_eq!(
            metrics(&readings),
            vec![
                Metric::Unknown,
                Metric::RfRssi,
                Metric::Unknown,
                Metric::Temperature,
                Metric::SoilMoisture,
                Metric::Illuminance,
            ]
        );
        assert!((number(&readings, Metric::RfRssi) + 60.0).abs() < 1e-9);
        // 76.6 °F
        assert!((number(&readings, Metric::Temperature) - 24.777_78).abs() < 1e-3);
        assert!((number(&readings, Metric::SoilMoisture) - 52.0).abs() < 1e-9);
        assert!((number(&readings, Metric::Illuminance) - 3135.1).abs() < 1e-9);
        assert_eq!(readings[5].code, "D02.s2");
        assert_eq!(readings[5].unit, Some(Unit::Lux));
        assert!(readings.iter().all(|r| r.timestamp == fetched_at()));
    }

    #[test]
    fn display_hub_value_decodes_stats_and_ignores_trailing_comma() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let hub = device("100", DeviceRole::Hub, HUB_ADDRESS, 264);

        let readings = decoder.decode_entry(
            &hub,
            &entry("D01", "1,-48,1;781(781/723/1),52(64/50/1),P=10213(10222/10205/1),"),
        );

        // 3 general + 3 fields x (current + 3 stats)
        assert_eq!(readings.len(), 15);
        // 78.1 °F
        assert!((number(&readings, Metric::Temperature) - 25.611_11).abs() < 1e-3);
        assert!((number(&readings, Metric::TemperatureDailyMin) - 22.388_89).abs() < 1e-3);
        assert!((number(&readings, Metric::TemperatureTrend) - 1.0).abs() < 1e-9);
        assert!((number(&readings, Metric::HumidityDailyMax) - 64.0).abs() < 1e-9);
        assert!((number(&readings, Metric::Pressure) - 10213.0).abs() < 1e-9);
        assert!((number(&readings, Metric::PressureDailyMin) - 10205.0).abs() < 1e-9);

        let trend = readings
            .iter()
            .find(|r| r.metric == Metric::TemperatureTrend)
            .unwrap();
        assert_eq!(trend.unit, None);
        assert_eq!(trend.code, "D01.s0.2");
    }

    #[test]
    fn rain_sensor_converts_tenths_of_millimetres() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let sensor = device("300", DeviceRole::SubDevice, 3, 87);

        let readings = decoder.decode_entry(&sensor, &entry("D03", "1,-70,1;R=270(0/0/270)"));

        assert!((number(&readings, Metric::RainfallTotal) - 27.0).abs() < 1e-9);
        assert!(number(&readings, Metric::RainfallLastHour).abs() < 1e-9);
        assert!((number(&readings, Metric::RainfallLastWeek) - 27.0).abs() < 1e-9);
    }

    #[test]
    fn model_without_layout_keeps_specific_part_raw() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let timer = device("400", DeviceRole::SubDevice, 4, 261);

        let readings =
            decoder.decode_entry(&timer, &entry("D04", "1,-55,1;0,9,0,0,0,0|0,1291,0,0,0,0"));

        let last = readings.last().unwrap();
        assert_eq!(last.code, "D04.s");
        assert!(last.is_unknown());
        assert_eq!(last.value, ReadingValue::Raw("0,9,0,0,0,0|0,1291,0,0,0,0".into()));
        assert!((number(&readings, Metric::RfRssi) + 55.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_model_keeps_specific_part_raw() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let mystery = device("500", DeviceRole::SubDevice, 5, 9999);

        let readings = decoder.decode_entry(&mystery, &entry("D05", "1,-80,1;42,Z=7"));

        assert_eq!(readings.len(), 4);
        assert_eq!(readings[3].value, ReadingValue::Raw("42,Z=7".into()));
    }

    #[test]
    fn unparseable_or_extra_fields_become_unknown_readings() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let sensor = device("200", DeviceRole::SubDevice, 2, 72);

        let readings = decoder.decode_entry(&sensor, &entry("D02", "1,-60,1;766,wet,X=5,99"));

        let specific: Vec<_> = readings.iter().skip(3).collect();
        assert_eq!(specific.len(), 4);
        assert_eq!(specific[0].metric, Metric::Temperature);
        assert!(specific[1].is_unknown());
        assert_eq!(specific[1].value, ReadingValue::Raw("wet".into()));
        // Wrong prefix for the light field.
        assert!(specific[2].is_unknown());
        assert_eq!(specific[2].value, ReadingValue::Raw("X=5".into()));
        // Beyond the layout.
        assert!(specific[3].is_unknown());
        assert_eq!(specific[3].code, "D02.s3");
    }

    #[test]
    fn value_without_separator_is_one_unknown_reading() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let sensor = device("200", DeviceRole::SubDevice, 2, 72);

        let readings = decoder.decode_entry(&sensor, &entry("D02", "garbage"));

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].code, "D02");
        assert!(readings[0].is_unknown());
    }

    #[test]
    fn hub_state_and_connected_are_decoded() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let hub = device("100", DeviceRole::Hub, HUB_ADDRESS, 264);

        let state = decoder.decode_entry(&hub, &entry("state", "3,-52"));
        assert_eq!(metrics(&state), vec![Metric::BatteryState, Metric::WifiRssi]);
        assert_eq!(state[1].code, "state.1");
        assert_eq!(state[1].unit, Some(Unit::Dbm));

        let connected = decoder.decode_entry(&hub, &entry("connected", "1"));
        assert_eq!(connected.len(), 1);
        assert_eq!(connected[0].code, "connected");
        assert_eq!(connected[0].value, ReadingValue::Flag(true));
    }

    #[test]
    fn unrecognised_hub_id_is_kept_as_unknown() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let hub = device("100", DeviceRole::Hub, HUB_ADDRESS, 264);

        let readings = decoder.decode_entry(&hub, &entry("fwVersion", "1.0.42"));

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].code, "fwVersion");
        assert_eq!(readings[0].value, ReadingValue::Raw("1.0.42".into()));
    }

    #[test]
    fn vendor_time_wins_over_fetch_time() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let hub = device("100", DeviceRole::Hub, HUB_ADDRESS, 264);
        let mut connected = entry("connected", "0");
        connected.time = Some(1_600_000_000_000);

        let readings = decoder.decode_entry(&hub, &connected);

        assert_eq!(readings[0].timestamp, DateTime::from_timestamp(1_600_000_000, 0).unwrap());
        assert_eq!(readings[0].value, ReadingValue::Flag(false));
    }

    #[test]
    fn decode_hub_routes_entries_by_address() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let hub = Hub {
            device: device("100", DeviceRole::Hub, HUB_ADDRESS, 264),
            devices: vec![
                device("200", DeviceRole::SubDevice, 2, 72),
                device("300", DeviceRole::SubDevice, 3, 87),
            ],
        };
        let entries = vec![
            entry("connected", "1"),
            entry("D02", "1,-60,1;766,52,G=31351"),
            entry("D09", "1,-90,1;1,2,3"),
        ];

        let readings = decoder.decode_hub(&hub, &entries);

        assert_eq!(readings.keys().collect::<Vec<_>>(), vec!["100", "200", "300"]);
        assert_eq!(readings["200"].len(), 6);
        assert!(readings["300"].is_empty());

        let hub_readings = &readings["100"];
        assert_eq!(hub_readings.len(), 2);
        assert_eq!(hub_readings[0].metric, Metric::Connected);
        assert_eq!(hub_readings[1].code, "D09");
        assert!(hub_readings[1].is_unknown());
    }

    #[test]
    fn decode_device_filters_to_owned_entries() {
        let catalog = ModelCatalog::builtin();
        let decoder = StatusDecoder::new(&catalog, fetched_at());
        let sensor = device("300", DeviceRole::SubDevice, 3, 87);
        let entries = vec![
            entry("connected", "1"),
            entry("D02", "1,-60,1;766,52,G=31351"),
            entry("D03", "1,-70,1;R=270(0/0/270)"),
        ];

        let readings = decoder.decode_device(&sensor, &entries);

        assert!(readings.iter().all(|r| r.code.starts_with("D03")));
        assert_eq!(readings.len(), 7);
    }

    #[test]
    fn parse_field_grammar() {
        assert_eq!(
            parse_field("P=10213(10222/10205/1)", Some("P")),
            Some(ParsedField {
                current: 10213,
                stats: vec![10222, 10205, 1],
            })
        );
        assert_eq!(
            parse_field("-5", None),
            Some(ParsedField {
                current: -5,
                stats: vec![],
            })
        );
        assert_eq!(parse_field("P=10213", Some("G")), None);
        assert_eq!(parse_field("781(781/723", None), None);
        assert_eq!(parse_field("781(a/b/c)", None), None);
    }
}
