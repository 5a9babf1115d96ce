// Identity endpoint
//
// Email/password login against `/auth/basic/app/login`. The vendor expects
// the password as an MD5 hex digest and a random per-install device id,
// along with a fixed area code.

use chrono::Utc;
use md5::{Digest, Md5};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::client::HomgarClient;
use crate::error::Error;
use crate::models::LoginData;
use crate::request::ApiRequest;
use crate::token::TokenBundle;

pub const LOGIN_PATH: &str = "/auth/basic/app/login";

/// Area code the vendor app sends by default.
pub const DEFAULT_AREA_CODE: &str = "31";

/// Account credentials. Supplied by the caller, never persisted here.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// MD5 hex digest of the password, as the identity endpoint expects.
pub fn password_digest(password: &SecretString) -> String {
    let digest = Md5::digest(password.expose_secret().as_bytes());
    format!("{digest:x}")
}

/// Random 32-hex-character device identifier.
pub fn random_device_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl HomgarClient {
    /// Exchange credentials for a fresh [`TokenBundle`].
    ///
    /// Any vendor rejection (bad password, unknown account, locked) is
    /// reported as `Error::Authentication` with the vendor's message.
    /// Transport failures pass through unchanged.
    pub async fn login(
        &self,
        credentials: &Credentials,
        area_code: &str,
    ) -> Result<TokenBundle, Error> {
        debug!(email = %credentials.email, "logging in");

        let body = json!({
            "areaCode": area_code,
            "phoneOrEmail": credentials.email,
            "password": password_digest(&credentials.password),
            "deviceId": random_device_id(),
        });
        let request = ApiRequest::post(LOGIN_PATH, body).unauthenticated();

        let data: LoginData = self.send(&request, None).await.map_err(|e| match e {
            Error::Api { code, message } | Error::TokenRejected { code, message } => {
                Error::Authentication {
                    message: if message.is_empty() {
                        format!("login rejected (code {code})")
                    } else {
                        format!("{message} (code {code})")
                    },
                }
            }
            other => other,
        })?;

        debug!("login successful");
        Ok(TokenBundle::from_login(&credentials.email, data, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_digest_is_lowercase_md5_hex() {
        let secret = SecretString::from("password".to_string());
        assert_eq!(password_digest(&secret), "5f4dcc3b5aa765d61d8327deb882cf99");
    }

    #[test]
    fn device_ids_are_random_hex() {
        let a = random_device_id();
        let b = random_device_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
