// Transport adapter
//
// Turns a logical `ApiRequest` into an authenticated exchange. Auth-failure
// responses invalidate the session and are retried exactly once after a
// (coalesced) re-login. Everything else -- vendor errors, network errors --
// goes straight back to the caller.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::client::HomgarClient;
use crate::error::Error;
use crate::request::ApiRequest;
use crate::session::AuthSession;

/// Authenticated client for the HomGar cloud API.
///
/// Cheaply cloneable; clones share the same session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    session: Arc<AuthSession>,
}

impl ApiClient {
    pub fn new(session: Arc<AuthSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    fn http(&self) -> &HomgarClient {
        self.session.client()
    }

    /// Execute `request` and return its unwrapped payload.
    ///
    /// Unauthenticated requests skip the session entirely.
    pub async fn call<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, Error> {
        if !request.is_authenticated() {
            return self.http().send(request, None).await;
        }

        let token = self.session.get_token().await?;
        match self.http().send(request, Some(&token.token)).await {
            Err(err) if err.is_token_rejected() => {
                debug!(path = request.path(), error = %err, "token rejected, logging in again");
                let fresh = self.session.refresh_after_rejection(&token).await?;

                match self.http().send(request, Some(&fresh.token)).await {
                    Err(Error::TokenRejected { code, message }) => {
                        warn!(code, "fresh token rejected as well");
                        self.session.invalidate();
                        Err(Error::Authentication {
                            message: format!("token rejected after re-login: {message} (code {code})"),
                        })
                    }
                    other => other,
                }
            }
            other => other,
        }
    }
}
