// ── Core error types ──
//
// User-facing errors from homgar-core. Consumers never see raw envelope
// codes for auth problems or reqwest internals; the
// `From<homgar_api::Error>` impl translates transport-layer errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach HomGar cloud at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── API errors ───────────────────────────────────────────────────
    /// The vendor refused the call for a reason other than authentication.
    #[error("HomGar API error {code}: {message}")]
    Api { code: i64, message: String },

    /// The cloud answered with an HTTP error page instead of an envelope.
    #[error("HomGar cloud returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Vendor result code, when the error came from the envelope.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<homgar_api::Error> for CoreError {
    fn from(err: homgar_api::Error) -> Self {
        match err {
            homgar_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            // Normally consumed by the adapter's retry; only reachable when
            // callers drive `HomgarClient` directly.
            homgar_api::Error::TokenRejected { code, message } => {
                CoreError::AuthenticationFailed {
                    message: format!("token rejected: {message} (code {code})"),
                }
            }
            homgar_api::Error::Api { code, message } => CoreError::Api { code, message },
            homgar_api::Error::Http { status, body } => CoreError::Http {
                status,
                message: body,
            },
            homgar_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "<unknown>".into());
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            homgar_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            homgar_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            homgar_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_error_keeps_code_and_message() {
        let err = CoreError::from(homgar_api::Error::Api {
            code: 3002,
            message: "home not found".into(),
        });
        assert_eq!(err.api_code(), Some(3002));
        assert_eq!(err.to_string(), "HomGar API error 3002: home not found");
    }

    #[test]
    fn http_error_page_is_not_a_vendor_code() {
        let err = CoreError::from(homgar_api::Error::Http {
            status: 502,
            body: "<html>Bad Gateway</html>".into(),
        });
        assert_eq!(err.api_code(), None);
        assert!(matches!(err, CoreError::Http { status: 502, .. }));
    }

    #[test]
    fn authentication_maps_to_authentication_failed() {
        let err = CoreError::from(homgar_api::Error::Authentication {
            message: "bad password".into(),
        });
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }
}
