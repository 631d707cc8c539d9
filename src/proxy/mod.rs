//! Edge proxy server
//!
//! Forwards browser requests under `/api/proxy/*path` to the backend and
//! guards page routes on the presence of the refresh cookie.
//!
//! - [`forward`] -- the forwarding handler and header whitelists.
//! - [`error`] -- the 503/504/500 failure classification.
//! - [`guard`] -- the refresh-cookie route guard.

pub mod error;
pub mod forward;
pub mod guard;

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::any, Router};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower::ServiceBuilder;

use crate::config::Config;
use crate::error::{Result, SurveyflowError};

pub use error::ProxyError;
pub use guard::{decide, RouteDecision};

/// Shared state of the proxy handlers.
#[derive(Debug, Clone)]
pub struct ProxyState {
    /// Upstream client. Has no cookie store: cookies belong to the browser.
    pub client: reqwest::Client,
    /// Backend base URL, no trailing slash.
    pub api_base: String,
    /// Cookie whose presence marks a signed-in browser.
    pub refresh_cookie: String,
}

impl ProxyState {
    /// Builds proxy state whose upstream calls time out after `timeout`.
    pub fn new(
        api_base: impl Into<String>,
        timeout: Duration,
        refresh_cookie: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SurveyflowError::Config(format!("Failed to build proxy client: {}", e)))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            refresh_cookie: refresh_cookie.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_base_url(),
            Duration::from_secs(config.proxy.timeout_seconds),
            config.proxy.refresh_cookie.clone(),
        )
    }
}

/// Routes of the edge proxy, with the route guard applied to all of them.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/proxy/*path", any(forward::forward))
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        )))
        .with_state(state)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Runs the proxy until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listen address is invalid or cannot be bound.
pub async fn serve(config: &Config) -> Result<()> {
    let addr: SocketAddr = config.proxy.listen_addr.parse().map_err(|e| {
        SurveyflowError::Config(format!(
            "Invalid listen address '{}': {}",
            config.proxy.listen_addr, e
        ))
    })?;
    let state = ProxyState::from_config(config)?;
    let api_base = state.api_base.clone();

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, upstream = %api_base, "Edge proxy listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Edge proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
