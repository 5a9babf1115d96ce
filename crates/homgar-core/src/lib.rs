// homgar-core: Device hierarchy and telemetry on top of homgar-api.
//
// `Homgar` is the facade; `catalog` + `decode` turn vendor status strings
// into typed readings; `model` is the snapshot handed to consumers.

pub mod catalog;
pub mod config;
pub mod convert;
pub mod decode;
pub mod error;
pub mod homgar;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Conversion, DeviceModel, FieldSpec, ModelCatalog};
pub use config::{HomgarConfig, TlsVerification, TokenCache};
pub use decode::StatusDecoder;
pub use error::CoreError;
pub use homgar::{Homgar, HomgarBuilder};
pub use model::{
    Device, DeviceKind, DeviceRole, Home, Hub, Metric, ReadingValue, SensorReading, Unit,
};

// Session types callers need without depending on homgar-api directly.
pub use homgar_api::{Credentials, TokenBundle, TokenStore};
