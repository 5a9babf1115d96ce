// ── Sensor reading domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Semantic meaning of a decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum Metric {
    // Radio / power
    RfRssi,
    WifiRssi,
    BatteryState,
    Connected,
    // Climate
    Temperature,
    TemperatureDailyMax,
    TemperatureDailyMin,
    TemperatureTrend,
    Humidity,
    HumidityDailyMax,
    HumidityDailyMin,
    HumidityTrend,
    Pressure,
    PressureDailyMax,
    PressureDailyMin,
    PressureTrend,
    // Soil
    SoilMoisture,
    Illuminance,
    // Rain
    RainfallTotal,
    RainfallLastHour,
    RainfallLastDay,
    RainfallLastWeek,
    /// Value the decode tables do not describe; the raw text is kept.
    Unknown,
}

impl Metric {
    /// Trend slots are small vendor enums, not measurements; they are
    /// never unit-converted.
    pub fn is_trend(self) -> bool {
        matches!(
            self,
            Self::TemperatureTrend | Self::HumidityTrend | Self::PressureTrend
        )
    }
}

/// Unit of a converted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "°C")]
    Celsius,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "Pa")]
    Pascal,
    #[serde(rename = "lx")]
    Lux,
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "dBm")]
    Dbm,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Percent => "%",
            Self::Pascal => "Pa",
            Self::Lux => "lx",
            Self::Millimeter => "mm",
            Self::Dbm => "dBm",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A decoded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Number(f64),
    Flag(bool),
    /// Vendor text passed through uninterpreted.
    Raw(String),
}

impl ReadingValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

/// One value reported by a device.
///
/// `code` locates the value in the vendor status: the status id alone
/// (`state`) when the reading covers the whole entry, otherwise
/// `{id}.g{n}` for the n-th general field, `{id}.s{n}` for the n-th
/// device-specific field, `{id}.s{n}.{k}` for its k-th bracketed stat and
/// `{id}.{n}` for the n-th field of a hub-level entry such as `state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub code: String,
    pub metric: Metric,
    pub value: ReadingValue,
    pub unit: Option<Unit>,
    /// Vendor update time, or the fetch time when the vendor sends none.
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    pub fn is_unknown(&self) -> bool {
        self.metric == Metric::Unknown
    }

    /// Human-readable value with its unit, e.g. `24.78 °C`.
    pub fn display_value(&self) -> String {
        match (&self.value, self.unit) {
            (ReadingValue::Number(n), Some(unit)) => format!("{} {unit}", round2(*n)),
            (ReadingValue::Number(n), None) => round2(*n).to_string(),
            (value, _) => value.to_string(),
        }
    }
}

fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: ReadingValue, unit: Option<Unit>) -> SensorReading {
        SensorReading {
            code: "D02.s0".into(),
            metric: Metric::Temperature,
            value,
            unit,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn display_value_rounds_numbers_and_appends_unit() {
        let r = reading(ReadingValue::Number(24.777_78), Some(Unit::Celsius));
        assert_eq!(r.display_value(), "24.78 °C");
    }

    #[test]
    fn display_value_passes_raw_text_through() {
        let r = reading(ReadingValue::Raw("0,9,0|0,1291".into()), None);
        assert_eq!(r.display_value(), "0,9,0|0,1291");
    }

    #[test]
    fn metric_displays_snake_case() {
        assert_eq!(Metric::RainfallLastHour.to_string(), "rainfall_last_hour");
        assert_eq!(Metric::Unknown.to_string(), "unknown");
    }
}
