// HomGar API response types
//
// Models for the vendor's JSON API. Every response is wrapped in the
// `{ code, msg, data }` envelope. Fields use `#[serde(default)]` liberally
// because the app API is undocumented and field presence varies between
// device generations; unmodelled fields land in `extra`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard HomGar response envelope.
///
/// ```json
/// { "code": 0, "msg": "success", "data": ... }
/// ```
///
/// `data` is kept as raw JSON so the result code can be inspected before
/// committing to a payload type.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

// ── Login ────────────────────────────────────────────────────────────

/// Payload of `POST /auth/basic/app/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    /// Token lifetime in seconds, as advertised by the vendor.
    #[serde(default)]
    pub token_expired: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Catch-all for undocumented fields (user profile, etc.).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Home ─────────────────────────────────────────────────────────────

/// Home object from `/app/member/appHome/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHome {
    #[serde(deserialize_with = "string_or_number")]
    pub hid: String,
    #[serde(default)]
    pub home_name: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Device object from `/app/device/getDeviceByHid`.
///
/// The top level of the response is the list of hubs; each hub carries
/// its sensors and controllers in `subDevices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDevice {
    #[serde(deserialize_with = "string_or_number")]
    pub did: String,
    /// Identifier of the sensor network (hub) the device belongs to.
    #[serde(deserialize_with = "string_or_number")]
    pub mid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub model_code: Option<i64>,
    /// Address within the sensor network.
    #[serde(default)]
    pub addr: Option<u32>,
    #[serde(default)]
    pub port_number: Option<u32>,
    #[serde(default)]
    pub alerts: Option<Value>,
    #[serde(default)]
    pub sub_devices: Vec<RawDevice>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Status ───────────────────────────────────────────────────────────

/// Payload of `/app/device/getDeviceStatus`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeviceStatus {
    #[serde(default)]
    pub sub_device_status: Vec<RawStatusEntry>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One `subDeviceStatus` entry: `D01`, `state`, `connected`, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatusEntry {
    pub id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub value: Option<String>,
    /// Epoch milliseconds of the last update, when the vendor sends it.
    #[serde(default)]
    pub time: Option<i64>,
}

// ── Helpers ──────────────────────────────────────────────────────────

/// The vendor is inconsistent about numeric vs string identifiers.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}
