use thiserror::Error;

/// Top-level error type for the `homgar-api` crate.
///
/// Covers every failure mode of the call path: authentication, vendor
/// result codes, transport and payload decoding. Token cache failures are
/// deliberately *not* represented here -- see [`crate::CacheError`].
/// `homgar-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the token was rejected and re-login failed.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The vendor rejected the current token with an auth-failure code.
    ///
    /// Only surfaced by [`crate::HomgarClient`]; [`crate::ApiClient`]
    /// consumes it to drive the single re-login retry.
    #[error("Token rejected by HomGar API (code {code}): {message}")]
    TokenRejected { code: i64, message: String },

    // ── Vendor API ──────────────────────────────────────────────────
    /// Non-zero result code in the `{ code, msg, data }` envelope.
    #[error("HomGar API returned code {code}: {message}")]
    Api { code: i64, message: String },

    /// Non-success HTTP status with a body that is not an envelope
    /// (proxy or load-balancer error pages). `status` is the HTTP status,
    /// never a vendor result code.
    #[error("HTTP {status} from HomGar cloud: {body}")]
    Http { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup error (bad CA bundle, client construction failure).
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the vendor rejected the token in use.
    pub fn is_token_rejected(&self) -> bool {
        matches!(self, Self::TokenRejected { .. })
    }

    /// Returns `true` for any authentication-related failure.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::TokenRejected { .. })
    }

    /// Returns `true` if this is a network-level failure.
    ///
    /// Nothing in this crate retries on it; the flag is for callers that
    /// want to apply their own policy.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Extract the vendor result code, if available.
    pub fn api_error_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } | Self::TokenRejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}
