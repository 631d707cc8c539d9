/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `serve`:     Run the edge proxy
- `login`:     Sign in or register, and offline credential checks
- `dashboard`: Response analytics
- `surveys`:   Survey listing, detail, responses and share links
- `theme`:     Theme preference

Handlers that talk to the backend share one [`Connection`], which wires
the session manager, the gateway and the survey service to a single
cookie-enabled HTTP client.
*/

use std::sync::Arc;

use crate::auth::{CredentialsForm, SessionManager};
use crate::cli::CredentialArgs;
use crate::config::Config;
use crate::error::{Result, SurveyflowError};
use crate::gateway::{build_http_client, ApiClient};
use crate::storage::LocalStore;
use crate::surveys::SurveyService;

pub mod dashboard;
pub mod login;
pub mod surveys;
pub mod theme;

// Edge proxy command handler
pub mod serve {
    //! Edge proxy handler.
    //!
    //! Applies the command-line overrides to the proxy settings, then runs
    //! the server until it receives Ctrl+C or SIGTERM.

    use super::*;

    /// Run the edge proxy
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `listen` - Optional listen address override
    /// * `timeout` - Optional upstream timeout override, in seconds
    pub async fn run_serve(
        mut config: Config,
        listen: Option<String>,
        timeout: Option<u64>,
    ) -> Result<()> {
        if let Some(addr) = listen {
            config.proxy.listen_addr = addr;
        }
        if let Some(secs) = timeout {
            if secs == 0 {
                return Err(SurveyflowError::Config(
                    "--timeout must be greater than 0".to_string(),
                )
                .into());
            }
            config.proxy.timeout_seconds = secs;
        }
        crate::proxy::serve(&config).await
    }
}

/// Backend-facing services for one CLI invocation.
pub struct Connection {
    pub gateway: Arc<ApiClient>,
    pub session: SessionManager,
    pub surveys: SurveyService,
}

impl Connection {
    /// Wires the services together without contacting the backend.
    pub fn new(config: &Config, store: Arc<LocalStore>) -> Result<Self> {
        let http = build_http_client(config.session.request_timeout_seconds)?;
        let base = config.api_base_url();
        let gateway = Arc::new(ApiClient::new(http.clone(), base.clone()));
        let session = SessionManager::new(http, base, &config.session, Arc::clone(&gateway));
        let surveys = SurveyService::new(Arc::clone(&gateway), store);
        Ok(Self {
            gateway,
            session,
            surveys,
        })
    }
}

/// Opens a [`Connection`] and establishes a session.
///
/// Signs in when both email and password are available; otherwise tries a
/// silent refresh and carries on signed out if that fails.
pub async fn connect(config: &Config, credentials: &CredentialArgs) -> Result<Connection> {
    let store = Arc::new(LocalStore::open_default(config)?);
    let connection = Connection::new(config, store)?;

    match (&credentials.email, &credentials.password) {
        (Some(email), Some(password)) => {
            connection
                .session
                .submit(&CredentialsForm::login(email.as_str(), password.as_str()))
                .await?;
        }
        _ => {
            connection.session.check_auth().await;
            if !connection.session.is_authenticated() {
                tracing::info!("No credentials supplied; continuing without a session");
            }
        }
    }

    Ok(connection)
}

/// Email and password, or a configuration error naming what is missing.
pub fn require_credentials(credentials: &CredentialArgs) -> Result<(String, String)> {
    let email = credentials.email.clone().ok_or_else(|| {
        SurveyflowError::Config("An email is required (--email or SURVEYFLOW_EMAIL)".to_string())
    })?;
    let password = credentials.password.clone().ok_or_else(|| {
        SurveyflowError::Config(
            "A password is required (--password or SURVEYFLOW_PASSWORD)".to_string(),
        )
    })?;
    Ok((email, password))
}
