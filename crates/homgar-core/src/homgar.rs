// ── HomGar facade ──
//
// Entry point for consumers: owns the auth session, the transport adapter
// and the model catalog, and resolves the home -> hub -> device hierarchy.
// Nothing is cached between calls except the session token; every fetch
// returns a fresh snapshot.

use std::sync::Arc;

use chrono::Utc;
use homgar_api::{
    ApiClient, AuthSession, Credentials, FileTokenStore, HomgarClient, MemoryTokenStore,
    TlsMode, TokenBundle, TokenStore, TransportConfig, VendorCodes,
};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::catalog::ModelCatalog;
use crate::config::{HomgarConfig, TlsVerification, TokenCache};
use crate::convert::hub_from_raw;
use crate::decode::StatusDecoder;
use crate::error::CoreError;
use crate::model::{Device, Home, Hub, SensorReading};

// ── Homgar ───────────────────────────────────────────────────────────

/// Client for one HomGar account.
///
/// Cheaply cloneable via `Arc<HomgarInner>`; clones share the session, so
/// a token obtained through one clone is seen by all of them.
#[derive(Clone)]
pub struct Homgar {
    inner: Arc<HomgarInner>,
}

struct HomgarInner {
    config: HomgarConfig,
    api: ApiClient,
    catalog: ModelCatalog,
}

impl Homgar {
    /// Build a client with the store selected by `config.token_cache` and
    /// the built-in model catalog. Does not touch the network.
    pub fn new(config: HomgarConfig) -> Result<Self, CoreError> {
        Self::builder(config).build()
    }

    pub fn builder(config: HomgarConfig) -> HomgarBuilder {
        HomgarBuilder {
            config,
            store: None,
            catalog: None,
            vendor_codes: None,
        }
    }

    pub fn config(&self) -> &HomgarConfig {
        &self.inner.config
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.inner.catalog
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        self.inner.api.session()
    }

    /// The authenticated adapter, for calls the facade does not wrap.
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Log in with the configured credentials, replacing any token.
    pub async fn login(&self) -> Result<Arc<TokenBundle>, CoreError> {
        let credentials = self.inner.config.credentials.clone().ok_or_else(|| {
            CoreError::Config {
                message: "no credentials configured".into(),
            }
        })?;
        self.login_with(&credentials).await
    }

    /// Log in with explicit credentials; they are kept for re-logins.
    pub async fn login_with(&self, credentials: &Credentials) -> Result<Arc<TokenBundle>, CoreError> {
        let token = self
            .session()
            .login(credentials)
            .await
            .map_err(|e| self.core_error(e))?;
        info!(email = %token.email, "logged in");
        Ok(token)
    }

    /// Make sure a token is available: cached, or from a fresh login.
    ///
    /// Never validates a cached token against the server.
    pub async fn ensure_logged_in(&self) -> Result<Arc<TokenBundle>, CoreError> {
        self.session()
            .get_token()
            .await
            .map_err(|e| self.core_error(e))
    }

    /// Drop the token locally and in the store.
    pub fn logout(&self) {
        self.session().logout();
    }

    // ── Hierarchy ────────────────────────────────────────────────────

    /// All homes of the account, in vendor order, without their hubs.
    pub async fn get_homes(&self) -> Result<Vec<Home>, CoreError> {
        let raw = self
            .inner
            .api
            .list_homes()
            .await
            .map_err(|e| self.core_error(e))?;
        debug!(count = raw.len(), "fetched homes");
        Ok(raw.into_iter().map(Home::from).collect())
    }

    /// A copy of `home` with its hubs and devices filled in.
    ///
    /// Fails as a whole if the device listing fails; no partial trees.
    pub async fn get_home_devices(&self, home: &Home) -> Result<Home, CoreError> {
        let raw = self
            .inner
            .api
            .list_devices(&home.id)
            .await
            .map_err(|e| self.core_error(e))?;

        let hubs: Vec<Hub> = raw
            .iter()
            .map(|hub| hub_from_raw(hub, &self.inner.catalog))
            .collect();
        debug!(home = %home.id, hubs = hubs.len(), "fetched devices");

        Ok(Home {
            id: home.id.clone(),
            name: home.name.clone(),
            hubs,
        })
    }

    /// Every home with its devices. One call for the homes, then one per
    /// home, sequentially.
    pub async fn get_hierarchy(&self) -> Result<Vec<Home>, CoreError> {
        let homes = self.get_homes().await?;
        let mut resolved = Vec::with_capacity(homes.len());
        for home in &homes {
            resolved.push(self.get_home_devices(home).await?);
        }
        Ok(resolved)
    }

    /// Home with the given id, with its devices.
    pub async fn get_home(&self, id: &str) -> Result<Home, CoreError> {
        let homes = self.get_homes().await?;
        let home = homes
            .iter()
            .find(|h| h.id == id)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "Home".into(),
                identifier: id.into(),
            })?;
        self.get_home_devices(home).await
    }

    // ── Telemetry ────────────────────────────────────────────────────

    /// Current readings of one device, in vendor order.
    ///
    /// Fetches the status of the device's whole sensor network and keeps
    /// the entries addressed to this device.
    pub async fn get_device_data(&self, device: &Device) -> Result<Vec<SensorReading>, CoreError> {
        let status = self
            .inner
            .api
            .device_status(&device.mid)
            .await
            .map_err(|e| self.core_error(e))?;

        let decoder = StatusDecoder::new(&self.inner.catalog, Utc::now());
        Ok(decoder.decode_device(device, &status.sub_device_status))
    }

    /// Current readings of a hub and all its sub-devices from a single
    /// status call, keyed by device id in hub order.
    pub async fn get_hub_data(
        &self,
        hub: &Hub,
    ) -> Result<IndexMap<String, Vec<SensorReading>>, CoreError> {
        let status = self
            .inner
            .api
            .device_status(&hub.device.mid)
            .await
            .map_err(|e| self.core_error(e))?;

        let decoder = StatusDecoder::new(&self.inner.catalog, Utc::now());
        Ok(decoder.decode_hub(hub, &status.sub_device_status))
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Convert, filling in the configured timeout the transport error lacks.
    fn core_error(&self, err: homgar_api::Error) -> CoreError {
        match CoreError::from(err) {
            CoreError::Timeout { .. } => CoreError::Timeout {
                timeout_secs: self.inner.config.timeout.as_secs(),
            },
            other => other,
        }
    }
}

impl std::fmt::Debug for Homgar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Homgar")
            .field("base_url", &self.inner.config.base_url.as_str())
            .field("token_cache", &self.inner.config.token_cache)
            .finish_non_exhaustive()
    }
}

// ── Builder ──────────────────────────────────────────────────────────

/// Builder for [`Homgar`] when the defaults need overriding.
pub struct HomgarBuilder {
    config: HomgarConfig,
    store: Option<Arc<dyn TokenStore>>,
    catalog: Option<ModelCatalog>,
    vendor_codes: Option<VendorCodes>,
}

impl HomgarBuilder {
    /// Use `store` instead of the one `config.token_cache` selects.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the built-in model catalog.
    pub fn catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Override which envelope codes mean success or a rejected token.
    pub fn vendor_codes(mut self, codes: VendorCodes) -> Self {
        self.vendor_codes = Some(codes);
        self
    }

    pub fn build(self) -> Result<Homgar, CoreError> {
        let config = self.config;

        let transport = TransportConfig {
            tls: match &config.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            },
            timeout: config.timeout,
        };
        let mut client = HomgarClient::new(config.base_url.clone(), &transport)?;
        if let Some(codes) = self.vendor_codes {
            client = client.with_vendor_codes(codes);
        }

        let store: Arc<dyn TokenStore> = match self.store {
            Some(store) => store,
            None => match &config.token_cache {
                TokenCache::File(path) => Arc::new(FileTokenStore::new(path.clone())),
                TokenCache::Memory => Arc::new(MemoryTokenStore::new()),
            },
        };

        let mut session =
            AuthSession::new(Arc::new(client), store).with_area_code(config.area_code.clone());
        if let Some(credentials) = &config.credentials {
            session = session.with_credentials(credentials.clone());
        }

        Ok(Homgar {
            inner: Arc::new(HomgarInner {
                api: ApiClient::new(Arc::new(session)),
                catalog: self.catalog.unwrap_or_default(),
                config,
            }),
        })
    }
}
