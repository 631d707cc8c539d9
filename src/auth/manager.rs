//! Session lifecycle manager
//!
//! [`SessionManager`] owns the client's [`Session`] and keeps it fresh. It is
//! the only component that mutates session state, through four transitions:
//!
//! - [`SessionManager::login`] / [`SessionManager::register`] -- exchange
//!   credentials for an access token.
//! - [`SessionManager::check_auth`] -- silent refresh using the httponly
//!   refresh cookie; never fails, only updates state.
//! - [`SessionManager::logout`] -- best-effort server logout, then
//!   unconditional local reset.
//!
//! Whenever a token and expiry are held, exactly one background refresh task
//! is armed. It fires `refresh_lead` before expiry, refreshes, and re-arms
//! itself; a failed refresh signs the user out. Every token change aborts
//! the previous task before a new one is spawned, and dropping the manager
//! aborts whatever is left.
//!
//! After every token change the manager re-registers its callbacks on the
//! [`ApiClient`] so gateway requests carry the current token and a `401`
//! clears this session.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use surveyflow::auth::SessionManager;
//! use surveyflow::config::Config;
//! use surveyflow::gateway::ApiClient;
//!
//! # async fn example() -> surveyflow::error::Result<()> {
//! let config = Config::default();
//! let gateway = Arc::new(ApiClient::from_config(&config)?);
//! let session = SessionManager::from_config(&config, Arc::clone(&gateway))?;
//!
//! session.check_auth().await;
//! if !session.is_authenticated() {
//!     session.login("user@example.com", "Password123!").await?;
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use reqwest::header::AUTHORIZATION;
use tokio::task::JoinHandle;

use crate::auth::token::{Session, TokenResponse};
use crate::auth::validation::{AuthMode, CredentialsForm};
use crate::config::{Config, SessionConfig};
use crate::error::{Result, SurveyflowError};
use crate::gateway::{build_http_client, ApiClient};

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SessionState {
    session: Session,
    /// True until the first `check_auth` resolves.
    is_loading: bool,
    /// Bumped on every externally driven token change. A refresh task only
    /// writes back if the generation it was armed under is still current.
    generation: u64,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    refresh_lead: Duration,
    default_expires_in: u64,
    gateway: Arc<ApiClient>,
    state: Mutex<SessionState>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn post_credentials(&self, endpoint: &str, email: &str, password: &str) -> Result<TokenResponse> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(SurveyflowError::Http)?;

        if !response.status().is_success() {
            tracing::warn!(%url, status = %response.status(), "Credential exchange rejected");
            return Err(SurveyflowError::AuthenticationFailed.into());
        }

        Ok(response.json::<TokenResponse>().await.map_err(SurveyflowError::Http)?)
    }

    async fn request_refresh(&self) -> Result<TokenResponse> {
        let url = format!("{}/auth/refresh", self.base_url);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(SurveyflowError::Http)?;

        if !response.status().is_success() {
            return Err(SurveyflowError::Api(format!(
                "Failed to refresh token: status code {}",
                response.status()
            ))
            .into());
        }

        Ok(response.json::<TokenResponse>().await.map_err(SurveyflowError::Http)?)
    }
}

/// Replaces the session, bumps the generation, re-registers the gateway and
/// re-arms (or cancels) the refresh timer.
///
/// The timer lock is taken first and held until the new task is in the slot,
/// so concurrent callers cannot leave a timer armed for a stale generation.
fn replace_session(inner: &Arc<Inner>, session: Session) {
    let mut slot = inner.timer();
    let (generation, delay) = {
        let mut state = inner.state();
        state.session = session;
        state.generation += 1;
        (
            state.generation,
            state.session.refresh_delay(inner.refresh_lead, Utc::now()),
        )
    };

    register_gateway(inner);
    arm_refresh_timer(inner, &mut slot, generation, delay);
}

/// Resets to the signed-out state.
fn clear_session(inner: &Arc<Inner>) {
    replace_session(inner, Session::default());
}

fn register_gateway(inner: &Arc<Inner>) {
    let token = inner.state().session.access_token.clone();
    let weak: Weak<Inner> = Arc::downgrade(inner);

    inner.gateway.initialize(
        Arc::new(move || token.clone()),
        Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                tracing::info!("Gateway reported 401; clearing session");
                clear_session(&inner);
            }
        }),
    );
}

/// Cancels the live timer in `slot`, if any, then spawns a replacement when
/// `delay` is set.
fn arm_refresh_timer(
    inner: &Arc<Inner>,
    slot: &mut Option<JoinHandle<()>>,
    generation: u64,
    delay: Option<StdDuration>,
) {
    if let Some(handle) = slot.take() {
        handle.abort();
    }

    if let Some(delay) = delay {
        tracing::debug!(delay_secs = delay.as_secs(), generation, "Arming token refresh timer");
        let weak = Arc::downgrade(inner);
        *slot = Some(tokio::spawn(refresh_loop(weak, generation, delay)));
    }
}

async fn refresh_loop(inner: Weak<Inner>, generation: u64, mut delay: StdDuration) {
    loop {
        tokio::time::sleep(delay).await;

        let Some(inner) = inner.upgrade() else {
            return;
        };

        match inner.request_refresh().await {
            Ok(token) => {
                let next = {
                    let mut state = inner.state();
                    if state.generation != generation {
                        return;
                    }
                    state.session = Session::from_token(token, inner.default_expires_in, Utc::now());
                    state.session.refresh_delay(inner.refresh_lead, Utc::now())
                };
                tracing::info!("Access token refreshed");
                register_gateway(&inner);

                match next {
                    Some(next) => delay = next,
                    None => return,
                }
            }
            Err(e) => {
                tracing::warn!("Background token refresh failed: {}", e);
                let mut state = inner.state();
                if state.generation != generation {
                    return;
                }
                state.session = Session::default();
                state.generation += 1;
                drop(state);
                register_gateway(&inner);
                // The slot keeps this finished handle until the next transition.
                return;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

/// Owner of the client session and its background refresh timer.
///
/// Share it as `Arc<SessionManager>`. Dropping the last handle aborts the
/// refresh timer.
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    /// Creates a signed-out, loading manager.
    ///
    /// # Arguments
    ///
    /// * `http` - HTTP client for the auth endpoints; enable its cookie store
    ///   so the refresh cookie set at login is replayed on refresh.
    /// * `base_url` - Backend base URL.
    /// * `config` - Refresh lead and default token lifetime.
    /// * `gateway` - Gateway whose callbacks this manager keeps current.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        config: &SessionConfig,
        gateway: Arc<ApiClient>,
    ) -> Self {
        let inner = Arc::new(Inner {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            refresh_lead: Duration::seconds(config.refresh_lead_seconds as i64),
            default_expires_in: config.default_expires_in_seconds,
            gateway,
            state: Mutex::new(SessionState {
                session: Session::default(),
                is_loading: true,
                generation: 0,
            }),
            timer: Mutex::new(None),
        });
        register_gateway(&inner);
        Self { inner }
    }

    /// Creates a manager with its own cookie-enabled HTTP client.
    pub fn from_config(config: &Config, gateway: Arc<ApiClient>) -> Result<Self> {
        let http = build_http_client(config.session.request_timeout_seconds)?;
        Ok(Self::new(http, config.api_base_url(), &config.session, gateway))
    }

    /// Exchanges credentials at `/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyflowError::AuthenticationFailed`] on any non-2xx
    /// answer; the session stays signed out.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.authenticate("/auth/login", email, password).await
    }

    /// Creates an account at `/auth/register`. Same contract as
    /// [`login`](Self::login).
    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        self.authenticate("/auth/register", email, password).await
    }

    /// Validates a login/register form and submits it.
    ///
    /// No request is issued when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyflowError::ValidationFailed`] listing every violated
    /// rule, or the error from [`login`](Self::login) /
    /// [`register`](Self::register).
    pub async fn submit(&self, form: &CredentialsForm) -> Result<()> {
        form.validate()?;
        match form.mode {
            AuthMode::Login => self.login(form.email.trim(), &form.password).await,
            AuthMode::Register => self.register(form.email.trim(), &form.password).await,
        }
    }

    async fn authenticate(&self, endpoint: &str, email: &str, password: &str) -> Result<()> {
        match self.inner.post_credentials(endpoint, email, password).await {
            Ok(token) => {
                let session = Session::from_token(token, self.inner.default_expires_in, Utc::now());
                tracing::info!(endpoint, expires_at = ?session.expires_at, "Signed in");
                replace_session(&self.inner, session);
                Ok(())
            }
            Err(e) => {
                if self.is_authenticated() {
                    clear_session(&self.inner);
                }
                Err(e)
            }
        }
    }

    /// Signs out.
    ///
    /// When a token is held, `/auth/logout` is called with it as bearer. The
    /// local session is cleared and the refresh timer cancelled whatever the
    /// server answers, including transport failures.
    pub async fn logout(&self) -> Result<()> {
        if let Some(token) = self.access_token() {
            let url = format!("{}/auth/logout", self.inner.base_url);
            match self
                .inner
                .http
                .post(&url)
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .send()
                .await
            {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::warn!(status = %resp.status(), "Logout rejected by server; clearing locally");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Logout request failed: {}; clearing locally", e);
                }
            }
        }

        clear_session(&self.inner);
        tracing::info!("Signed out");
        Ok(())
    }

    /// Silent refresh using the refresh cookie.
    ///
    /// Success signs the user in; any failure signs them out. Never errors.
    /// Clears [`is_loading`](Self::is_loading) either way.
    pub async fn check_auth(&self) {
        match self.inner.request_refresh().await {
            Ok(token) => {
                let session = Session::from_token(token, self.inner.default_expires_in, Utc::now());
                replace_session(&self.inner, session);
            }
            Err(e) => {
                tracing::debug!("Auth check failed: {}", e);
                clear_session(&self.inner);
            }
        }
        self.inner.state().is_loading = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state().session.authenticated
    }

    /// True until the first [`check_auth`](Self::check_auth) resolves.
    pub fn is_loading(&self) -> bool {
        self.inner.state().is_loading
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.inner.state().session.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.state().session.access_token.clone()
    }

    /// Whether a refresh task is currently scheduled.
    pub fn has_refresh_timer(&self) -> bool {
        self.inner
            .timer()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(handle) = self.inner.timer().take() {
            handle.abort();
        }
    }
}
