// ── Domain model ──
//
// Point-in-time snapshot of an account: homes own hubs, hubs own their
// sub-devices, and readings are produced per device on demand. Every value
// is rebuilt on each fetch and never mutated in place.

pub mod device;
pub mod home;
pub mod reading;

pub use device::{Device, DeviceKind, DeviceRole, HUB_ADDRESS};
pub use home::{Home, Hub};
pub use reading::{Metric, ReadingValue, SensorReading, Unit};
