use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::MockServer;

use surveyflow::config::{Config, SessionConfig};
use surveyflow::gateway::build_http_client;
use surveyflow::storage::LocalStore;
use surveyflow::{ApiClient, SessionManager, SurveyService};

/// Token body as returned by the auth endpoints.
#[allow(dead_code)]
pub fn token_json(token: &str, expires_in: u64) -> Value {
    json!({ "access_token": token, "expires_in": expires_in })
}

/// Configuration pointing every backend call at `server`.
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.url = Some(server.uri());
    config.session.request_timeout_seconds = 5;
    config
}

/// Gateway, session manager and survey service wired to `server`, sharing
/// one HTTP client the way the CLI does.
#[allow(dead_code)]
pub struct Harness {
    pub gateway: Arc<ApiClient>,
    pub session: SessionManager,
    pub surveys: SurveyService,
    pub store: Arc<LocalStore>,
}

#[allow(dead_code)]
pub fn harness(server: &MockServer, session_config: SessionConfig) -> Harness {
    let http = build_http_client(5).expect("failed to build http client");
    let gateway = Arc::new(ApiClient::new(http.clone(), server.uri()));
    let session = SessionManager::new(http, server.uri(), &session_config, Arc::clone(&gateway));
    let store = Arc::new(LocalStore::temporary().expect("failed to open temporary store"));
    let surveys = SurveyService::new(Arc::clone(&gateway), Arc::clone(&store));
    Harness {
        gateway,
        session,
        surveys,
        store,
    }
}

/// Session settings with a short lifetime default and no refresh lead.
#[allow(dead_code)]
pub fn eager_refresh() -> SessionConfig {
    SessionConfig {
        refresh_lead_seconds: 0,
        default_expires_in_seconds: 900,
        request_timeout_seconds: 5,
    }
}

/// Polls `condition` every 20ms until it holds or `limit` elapses.
#[allow(dead_code)]
pub async fn wait_until<F: Fn() -> bool>(condition: F, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}
