// Read-only HomGar endpoints
//
// Home listing, the per-home device tree, and per-hub status. Each method
// is one `ApiRequest` through the adapter; payloads come back raw and are
// normalized by `homgar-core`.

use tracing::debug;

use crate::api::ApiClient;
use crate::error::Error;
use crate::models::{RawDevice, RawDeviceStatus, RawHome};
use crate::request::ApiRequest;

pub const HOMES_PATH: &str = "/app/member/appHome/list";
pub const DEVICES_PATH: &str = "/app/device/getDeviceByHid";
pub const STATUS_PATH: &str = "/app/device/getDeviceStatus";

impl ApiClient {
    /// List all homes visible to the account, in vendor order.
    ///
    /// `GET /app/member/appHome/list`
    pub async fn list_homes(&self) -> Result<Vec<RawHome>, Error> {
        debug!("listing homes");
        let homes: Option<Vec<RawHome>> = self.call(&ApiRequest::get(HOMES_PATH)).await?;
        Ok(homes.unwrap_or_default())
    }

    /// List the hubs of a home, each with its sub-devices.
    ///
    /// `GET /app/device/getDeviceByHid?hid={hid}`
    pub async fn list_devices(&self, hid: &str) -> Result<Vec<RawDevice>, Error> {
        debug!(hid, "listing devices");
        let request = ApiRequest::get(DEVICES_PATH).query("hid", hid);
        let hubs: Option<Vec<RawDevice>> = self.call(&request).await?;
        Ok(hubs.unwrap_or_default())
    }

    /// Current status of a hub and all of its sub-devices.
    ///
    /// `GET /app/device/getDeviceStatus?mid={mid}`
    pub async fn device_status(&self, mid: &str) -> Result<RawDeviceStatus, Error> {
        debug!(mid, "fetching device status");
        let request = ApiRequest::get(STATUS_PATH).query("mid", mid);
        let status: Option<RawDeviceStatus> = self.call(&request).await?;
        Ok(status.unwrap_or_default())
    }
}
