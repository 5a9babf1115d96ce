// ── Model catalog ──
//
// Table mapping vendor model codes to device kinds and to the layout of
// their device-specific status values. The decoder in `decode.rs` is
// driven entirely by these tables; supporting a new model means
// registering a `DeviceModel`, not writing a parser.

use std::collections::HashMap;

use crate::model::{DeviceKind, Metric, ReadingValue, Unit};

// ── Conversions ──────────────────────────────────────────────────────

/// How a raw integer field becomes a reading value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Value as reported.
    Identity,
    /// Vendor reports tenths of the unit (0.1 mm, 0.1 lx).
    Tenths,
    /// Vendor reports tenths of a degree Fahrenheit; converted to °C.
    TenthFahrenheitToCelsius,
    /// `1` means true, anything else false.
    Flag,
}

impl Conversion {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn apply(self, raw: i64) -> ReadingValue {
        match self {
            Self::Identity => ReadingValue::Number(raw as f64),
            Self::Tenths => ReadingValue::Number(raw as f64 / 10.0),
            Self::TenthFahrenheitToCelsius => {
                let fahrenheit = raw as f64 / 10.0;
                ReadingValue::Number((fahrenheit - 32.0) * 5.0 / 9.0)
            }
            Self::Flag => ReadingValue::Flag(raw == 1),
        }
    }
}

// ── Field layout ─────────────────────────────────────────────────────

/// Layout of one comma-separated field of a status value.
///
/// A field looks like `781`, `P=10213` or `781(781/723/1)`: an optional
/// `X=` prefix, the current value, and optionally bracketed stats.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Letter before `=`, when the vendor tags the field.
    pub prefix: Option<String>,
    pub metric: Metric,
    pub conversion: Conversion,
    pub unit: Option<Unit>,
    /// Metric for each bracketed stat; `None` slots decode as unknown.
    pub stats: Vec<Option<Metric>>,
}

impl FieldSpec {
    pub fn new(metric: Metric) -> Self {
        Self {
            prefix: None,
            metric,
            conversion: Conversion::Identity,
            unit: None,
            stats: Vec::new(),
        }
    }

    pub fn prefixed(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn stats(mut self, stats: impl IntoIterator<Item = Option<Metric>>) -> Self {
        self.stats = stats.into_iter().collect();
        self
    }
}

// ── Models ───────────────────────────────────────────────────────────

/// Everything known about one vendor model code.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceModel {
    pub kind: DeviceKind,
    pub description: String,
    /// Layout of the device-specific status part. `None` when the format
    /// has not been worked out; the whole part is then kept as unknown.
    pub fields: Option<Vec<FieldSpec>>,
}

impl DeviceModel {
    pub fn new(kind: DeviceKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            fields: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Lookup tables used to classify devices and decode their status.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: HashMap<i64, DeviceModel>,
    hub_fields: HashMap<String, Vec<FieldSpec>>,
}

impl ModelCatalog {
    /// A catalog that knows nothing: every device and value is unknown.
    pub fn empty() -> Self {
        Self {
            models: HashMap::new(),
            hub_fields: HashMap::new(),
        }
    }

    /// Catalog of the RainPoint models seen in the field.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();

        catalog.register(
            264,
            DeviceModel::new(DeviceKind::DisplayHub, "Irrigation Display Hub").with_fields(vec![
                temperature_field(),
                humidity_field(),
                FieldSpec::new(Metric::Pressure)
                    .prefixed("P")
                    .unit(Unit::Pascal)
                    .stats([
                        Some(Metric::PressureDailyMax),
                        Some(Metric::PressureDailyMin),
                        Some(Metric::PressureTrend),
                    ]),
            ]),
        );
        catalog.register(
            72,
            DeviceModel::new(DeviceKind::SoilMoistureSensor, "Soil Moisture Sensor").with_fields(
                vec![
                    FieldSpec::new(Metric::Temperature)
                        .conversion(Conversion::TenthFahrenheitToCelsius)
                        .unit(Unit::Celsius),
                    FieldSpec::new(Metric::SoilMoisture).unit(Unit::Percent),
                    FieldSpec::new(Metric::Illuminance)
                        .prefixed("G")
                        .conversion(Conversion::Tenths)
                        .unit(Unit::Lux),
                ],
            ),
        );
        catalog.register(
            87,
            DeviceModel::new(DeviceKind::RainSensor, "High Precision Rain Sensor").with_fields(
                vec![
                    FieldSpec::new(Metric::RainfallTotal)
                        .prefixed("R")
                        .conversion(Conversion::Tenths)
                        .unit(Unit::Millimeter)
                        .stats([
                            Some(Metric::RainfallLastHour),
                            Some(Metric::RainfallLastDay),
                            Some(Metric::RainfallLastWeek),
                        ]),
                ],
            ),
        );
        catalog.register(
            262,
            DeviceModel::new(DeviceKind::AirSensor, "Outdoor Air Humidity Sensor")
                .with_fields(vec![temperature_field(), humidity_field()]),
        );
        // Zones are `|`-separated; the per-zone fields are not understood yet.
        catalog.register(
            261,
            DeviceModel::new(DeviceKind::WaterTimer, "2-Zone Water Timer"),
        );

        catalog.register_hub_field(
            "state",
            vec![
                FieldSpec::new(Metric::BatteryState),
                FieldSpec::new(Metric::WifiRssi).unit(Unit::Dbm),
            ],
        );
        catalog.register_hub_field(
            "connected",
            vec![FieldSpec::new(Metric::Connected).conversion(Conversion::Flag)],
        );

        catalog
    }

    /// Add or replace a model. Returns the previous entry, if any.
    pub fn register(&mut self, model_code: i64, model: DeviceModel) -> Option<DeviceModel> {
        self.models.insert(model_code, model)
    }

    /// Describe a hub-level status id such as `state`.
    pub fn register_hub_field(&mut self, id: impl Into<String>, fields: Vec<FieldSpec>) {
        self.hub_fields.insert(id.into(), fields);
    }

    pub fn model(&self, model_code: i64) -> Option<&DeviceModel> {
        self.models.get(&model_code)
    }

    pub fn hub_field(&self, id: &str) -> Option<&[FieldSpec]> {
        self.hub_fields.get(id).map(Vec::as_slice)
    }

    /// Device kind for a model code; `Unknown` when absent.
    pub fn kind_of(&self, model_code: Option<i64>) -> DeviceKind {
        model_code
            .and_then(|code| self.model(code))
            .map_or(DeviceKind::Unknown, |m| m.kind)
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn temperature_field() -> FieldSpec {
    FieldSpec::new(Metric::Temperature)
        .conversion(Conversion::TenthFahrenheitToCelsius)
        .unit(Unit::Celsius)
        .stats([
            Some(Metric::TemperatureDailyMax),
            Some(Metric::TemperatureDailyMin),
            Some(Metric::TemperatureTrend),
        ])
}

fn humidity_field() -> FieldSpec {
    FieldSpec::new(Metric::Humidity)
        .unit(Unit::Percent)
        .stats([
            Some(Metric::HumidityDailyMax),
            Some(Metric::HumidityDailyMin),
            Some(Metric::HumidityTrend),
        ])
}
