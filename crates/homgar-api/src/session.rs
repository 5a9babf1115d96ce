// Auth session
//
// Owns the account's single active token. States:
//
//   NoToken --login--> Authenticated --rejection/logout--> NoToken
//
// There is no timer edge: a token is good until the vendor says otherwise.
// Every path that may hit the identity endpoint runs under `login_gate`,
// so concurrent callers that find no token share one login. The gate also
// keeps the outcome of the last attempt: callers that queued behind a
// failed login get its error instead of sending the password again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::{Credentials, DEFAULT_AREA_CODE};
use crate::client::HomgarClient;
use crate::error::Error;
use crate::store::TokenStore;
use crate::token::TokenBundle;

/// Produces a usable token on demand with as few logins as possible.
pub struct AuthSession {
    client: Arc<HomgarClient>,
    store: Arc<dyn TokenStore>,
    area_code: String,
    credentials: RwLock<Option<Credentials>>,
    token: RwLock<Option<Arc<TokenBundle>>>,
    login_gate: Mutex<LastLogin>,
    logins: AtomicU64,
    settled: AtomicU64,
}

/// Outcome of the most recent login attempt, guarded by the login gate.
#[derive(Debug, Default)]
struct LastLogin {
    failure: Option<String>,
}

impl AuthSession {
    pub fn new(client: Arc<HomgarClient>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            store,
            area_code: DEFAULT_AREA_CODE.to_owned(),
            credentials: RwLock::new(None),
            token: RwLock::new(None),
            login_gate: Mutex::new(LastLogin::default()),
            logins: AtomicU64::new(0),
            settled: AtomicU64::new(0),
        }
    }

    /// Remember credentials so the session can log in (and back in) by itself.
    pub fn with_credentials(self, credentials: Credentials) -> Self {
        *self.credentials.write().expect("credentials lock poisoned") = Some(credentials);
        self
    }

    pub fn with_area_code(mut self, area_code: impl Into<String>) -> Self {
        self.area_code = area_code.into();
        self
    }

    pub fn client(&self) -> &Arc<HomgarClient> {
        &self.client
    }

    /// Number of identity-endpoint calls this session has made.
    pub fn login_count(&self) -> u64 {
        self.logins.load(Ordering::SeqCst)
    }

    /// The in-memory token, without touching the store or the network.
    pub fn current_token(&self) -> Option<Arc<TokenBundle>> {
        self.token.read().expect("token lock poisoned").clone()
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials
            .read()
            .expect("credentials lock poisoned")
            .is_some()
    }

    // ── Token acquisition ────────────────────────────────────────────

    /// Return a usable token: memory, then store, then a fresh login.
    ///
    /// Never validates a token it already has. Fails with
    /// `Error::Authentication` only when no token exists and no
    /// credentials are available to obtain one.
    pub async fn get_token(&self) -> Result<Arc<TokenBundle>, Error> {
        if let Some(token) = self.current_token() {
            return Ok(token);
        }

        let settled_seen = self.settled.load(Ordering::SeqCst);
        let mut gate = self.login_gate.lock().await;

        // Another caller may have finished a login while we waited.
        if let Some(token) = self.current_token() {
            return Ok(token);
        }
        self.shared_failure(&gate, settled_seen)?;

        if let Some(token) = self.load_cached() {
            self.set_token(Some(Arc::clone(&token)));
            return Ok(token);
        }

        let credentials = self.credentials().ok_or_else(|| Error::Authentication {
            message: "not logged in and no credentials available".into(),
        })?;
        self.login_locked(&mut gate, &credentials).await
    }

    /// Log in with `credentials`, replacing any current token.
    ///
    /// The credentials are remembered for later re-logins.
    pub async fn login(&self, credentials: &Credentials) -> Result<Arc<TokenBundle>, Error> {
        *self.credentials.write().expect("credentials lock poisoned") = Some(credentials.clone());
        let mut gate = self.login_gate.lock().await;
        self.login_locked(&mut gate, credentials).await
    }

    /// Recover from the vendor rejecting `rejected`.
    ///
    /// If another caller already replaced the rejected token, its
    /// replacement is returned and no login happens. Otherwise the token is
    /// invalidated and exactly one login is attempted.
    pub async fn refresh_after_rejection(
        &self,
        rejected: &TokenBundle,
    ) -> Result<Arc<TokenBundle>, Error> {
        let settled_seen = self.settled.load(Ordering::SeqCst);
        let mut gate = self.login_gate.lock().await;

        if let Some(current) = self.current_token() {
            if current.token != rejected.token {
                debug!("token already replaced by a concurrent login");
                return Ok(current);
            }
        }
        self.shared_failure(&gate, settled_seen)?;

        self.invalidate();

        let credentials = self.credentials().ok_or_else(|| Error::Authentication {
            message: "token rejected and no credentials available to log in again".into(),
        })?;
        self.login_locked(&mut gate, &credentials).await
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Drop the in-memory and persisted token.
    ///
    /// The next `get_token()` goes back to the store (now empty) and then
    /// to a fresh login.
    pub fn invalidate(&self) {
        debug!("invalidating token");
        self.set_token(None);
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear token cache (non-fatal)");
        }
    }

    /// Local logout: invalidate and forget the credentials.
    ///
    /// The vendor exposes no logout endpoint, so nothing is sent.
    pub fn logout(&self) {
        self.invalidate();
        *self.credentials.write().expect("credentials lock poisoned") = None;
        info!("logged out");
    }

    // ── Internals ────────────────────────────────────────────────────

    fn credentials(&self) -> Option<Credentials> {
        self.credentials
            .read()
            .expect("credentials lock poisoned")
            .clone()
    }

    fn set_token(&self, token: Option<Arc<TokenBundle>>) {
        *self.token.write().expect("token lock poisoned") = token;
    }

    /// Read the store, degrading every failure to "no cache".
    fn load_cached(&self) -> Option<Arc<TokenBundle>> {
        let cached = match self.store.load() {
            Ok(cached) => cached?,
            Err(e) => {
                warn!(error = %e, "failed to read token cache (non-fatal)");
                return None;
            }
        };

        if let Some(credentials) = self.credentials() {
            if !cached.belongs_to(&credentials.email) {
                debug!(cached = %cached.email, "cached token belongs to another account");
                return None;
            }
        }

        debug!("using cached token");
        Some(Arc::new(cached))
    }

    /// Fail with the previous attempt's error if a login finished, and
    /// failed, while this caller was waiting for the gate.
    fn shared_failure(&self, gate: &LastLogin, settled_seen: u64) -> Result<(), Error> {
        if self.settled.load(Ordering::SeqCst) == settled_seen {
            return Ok(());
        }
        match &gate.failure {
            Some(message) => {
                debug!("joining the outcome of a failed concurrent login");
                Err(Error::Authentication {
                    message: message.clone(),
                })
            }
            None => Ok(()),
        }
    }

    /// Perform the login while holding `login_gate`, recording the outcome.
    async fn login_locked(
        &self,
        gate: &mut LastLogin,
        credentials: &Credentials,
    ) -> Result<Arc<TokenBundle>, Error> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        let outcome = self.client.login(credentials, &self.area_code).await;
        self.settled.fetch_add(1, Ordering::SeqCst);
        let token = match outcome {
            Ok(token) => Arc::new(token),
            Err(e) => {
                gate.failure = Some(match &e {
                    Error::Authentication { message } => message.clone(),
                    other => other.to_string(),
                });
                return Err(e);
            }
        };
        gate.failure = None;

        self.set_token(Some(Arc::clone(&token)));
        if let Err(e) = self.store.save(&token) {
            warn!(error = %e, "failed to write token cache (non-fatal)");
        }

        info!(email = %token.email, "logged in");
        Ok(token)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("base_url", &self.client.base_url().as_str())
            .field("area_code", &self.area_code)
            .field("authenticated", &self.current_token().is_some())
            .field("logins", &self.login_count())
            .finish_non_exhaustive()
    }
}
