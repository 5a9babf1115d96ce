// Authentication token bundle
//
// Issued by the identity endpoint, shared read-only by every call, and
// persisted verbatim by the token store. Never mutated: a re-login
// produces a new bundle.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LoginData;

/// The opaque artifact required on every authenticated call.
///
/// Validity is never judged locally. `expires_at` records what the vendor
/// advertised at login and is informational only; a bundle stays in use
/// until the vendor rejects it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Account the bundle was issued for.
    pub email: String,
    /// Value sent in the `auth` header.
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub issued_at: DateTime<Utc>,
}

impl TokenBundle {
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
            refresh_token: None,
            expires_at: None,
            issued_at: Utc::now(),
        }
    }

    pub(crate) fn from_login(email: &str, data: LoginData, issued_at: DateTime<Utc>) -> Self {
        let expires_at = data
            .token_expired
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime));
        Self {
            email: email.to_owned(),
            token: data.token,
            refresh_token: data.refresh_token,
            expires_at,
            issued_at,
        }
    }

    /// Whether this bundle was issued for `email` (case-insensitive).
    pub fn belongs_to(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

impl fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBundle")
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_login_records_advertised_expiry() {
        let data: LoginData = serde_json::from_value(json!({
            "token": "tok",
            "tokenExpired": 3600,
            "refreshToken": "ref"
        }))
        .unwrap();
        let now = Utc::now();
        let bundle = TokenBundle::from_login("me@example.com", data, now);

        assert_eq!(bundle.token, "tok");
        assert_eq!(bundle.refresh_token.as_deref(), Some("ref"));
        assert_eq!(bundle.expires_at, Some(now + TimeDelta::seconds(3600)));
        assert!(bundle.belongs_to("ME@example.com"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut bundle = TokenBundle::new("me@example.com", "super-secret");
        bundle.refresh_token = Some("also-secret".into());
        let dbg = format!("{bundle:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(!dbg.contains("also-secret"));
        assert!(dbg.contains("me@example.com"));
    }
}
