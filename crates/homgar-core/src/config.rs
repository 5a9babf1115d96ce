// ── Runtime connection configuration ──
//
// These types describe *how* to talk to the HomGar cloud. They carry
// credential data and connection tuning, but never read config files.
// The CLI (or any embedder) constructs a `HomgarConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use homgar_api::Credentials;
use homgar_api::auth::DEFAULT_AREA_CODE;
use url::Url;

/// Where the session token is persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCache {
    /// JSON record at the given path.
    File(PathBuf),
    /// Process-local only; every new process logs in again.
    Memory,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled web PKI roots.
    #[default]
    SystemDefaults,
    /// Additionally trust the CA certificate in this PEM file.
    CustomCa(PathBuf),
}

/// Configuration for one HomGar account.
#[derive(Debug, Clone)]
pub struct HomgarConfig {
    /// Cloud endpoint (defaults to the vendor's app region).
    pub base_url: Url,
    /// Account credentials. Without them only a cached token can be used.
    pub credentials: Option<Credentials>,
    /// Phone area code sent with the login request.
    pub area_code: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub tls: TlsVerification,
    pub token_cache: TokenCache,
}

impl HomgarConfig {
    /// Defaults for `credentials`: vendor endpoint, in-memory token cache.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..Self::default()
        }
    }

    pub fn with_token_cache(mut self, cache: TokenCache) -> Self {
        self.token_cache = cache;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}

impl Default for HomgarConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(homgar_api::DEFAULT_BASE_URL)
                .expect("default base URL is valid"),
            credentials: None,
            area_code: DEFAULT_AREA_CODE.into(),
            timeout: Duration::from_secs(30),
            tls: TlsVerification::default(),
            token_cache: TokenCache::Memory,
        }
    }
}
