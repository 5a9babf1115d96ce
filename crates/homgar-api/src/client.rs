// Raw HomGar HTTP client
//
// Wraps `reqwest::Client` with HomGar URL construction, the static app
// headers, and `{ code, msg, data }` envelope unwrapping. It knows nothing
// about sessions: the caller passes the token in. Auth-failure codes come
// back as `Error::TokenRejected` so the adapter can decide what to do.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::Envelope;
use crate::request::ApiRequest;
use crate::transport::TransportConfig;

/// Language header the vendor app sends.
const LANG: &str = "en";
/// Application code header the vendor app sends.
const APP_CODE: &str = "1";

// ── Vendor result codes ──────────────────────────────────────────────

/// Interpretation table for the envelope `code` field.
///
/// Only success and "token no longer valid" are given meaning; every other
/// code is surfaced verbatim as [`Error::Api`]. The auth-failure set is
/// open so embedders can add codes as they are observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorCodes {
    success: i64,
    auth_failure: BTreeSet<i64>,
}

impl Default for VendorCodes {
    fn default() -> Self {
        Self {
            success: 0,
            auth_failure: BTreeSet::from([401]),
        }
    }
}

impl VendorCodes {
    /// Treat `code` as "token rejected" in addition to the defaults.
    pub fn with_auth_failure(mut self, code: i64) -> Self {
        self.auth_failure.insert(code);
        self
    }

    pub fn is_success(&self, code: i64) -> bool {
        code == self.success
    }

    pub fn is_auth_failure(&self, code: i64) -> bool {
        self.auth_failure.contains(&code)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Raw HTTP client for the HomGar cloud API.
///
/// All methods return unwrapped `data` payloads -- the envelope is stripped
/// before the caller sees it.
#[derive(Debug)]
pub struct HomgarClient {
    http: reqwest::Client,
    base_url: Url,
    codes: VendorCodes,
}

impl HomgarClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            codes: VendorCodes::default(),
        }
    }

    /// Replace the result-code interpretation table.
    pub fn with_vendor_codes(mut self, codes: VendorCodes) -> Self {
        self.codes = codes;
        self
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn vendor_codes(&self) -> &VendorCodes {
        &self.codes
    }

    /// Build a full URL: `{base}{path}`, keeping any path prefix on the base.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request and unwrap the vendor envelope.
    ///
    /// `token` is attached as the `auth` header when the request is
    /// authenticated. No retries happen here.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<T, Error> {
        let url = self.url(request.path())?;
        debug!("{} {}", request.method(), url);
        trace!(query = ?request.query_params(), body = ?request.body(), "request");

        let mut builder = self
            .http
            .request(request.method().clone(), url)
            .header("lang", LANG)
            .header("appCode", APP_CODE);

        if !request.query_params().is_empty() {
            builder = builder.query(request.query_params());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if request.is_authenticated() {
            if let Some(token) = token {
                builder = builder.header("auth", token);
            }
        }

        let resp = builder.send().await?;
        self.parse_envelope(resp).await
    }

    /// Parse the `{ code, msg, data }` envelope, returning `data` on success.
    ///
    /// HTTP 401 and auth-failure codes map to `Error::TokenRejected`; any
    /// other non-success code maps to `Error::Api`. A failing HTTP status
    /// without an envelope maps to `Error::Http`.
    async fn parse_envelope<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;
        trace!("-[{:03}]-> {}", status.as_u16(), body);

        let envelope = serde_json::from_str::<Envelope>(&body);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let message = envelope
                .ok()
                .and_then(|e| e.msg)
                .unwrap_or_else(|| "unauthorized".into());
            return Err(Error::TokenRejected {
                code: 401,
                message,
            });
        }

        let envelope = match envelope {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(Error::Http {
                    status: status.as_u16(),
                    body: preview(&body).to_owned(),
                });
            }
            Err(e) => {
                return Err(Error::Deserialization {
                    message: format!("{e} (body preview: {:?})", preview(&body)),
                    body,
                });
            }
        };

        if self.codes.is_auth_failure(envelope.code) {
            return Err(Error::TokenRejected {
                code: envelope.code,
                message: envelope.msg.unwrap_or_default(),
            });
        }

        if !self.codes.is_success(envelope.code) {
            return Err(Error::Api {
                code: envelope.code,
                message: envelope.msg.unwrap_or_default(),
            });
        }

        let data = envelope.data.unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
