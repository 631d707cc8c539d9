//! Authenticated request gateway
//!
//! [`ApiClient`] is the single choke point for backend calls that need the
//! session's access token. It does not own the token. Instead the session
//! layer registers two callbacks through [`ApiClient::initialize`]:
//!
//! - a token getter, read once per request to build the `Authorization`
//!   header;
//! - an unauthorized handler, invoked when the backend answers `401`.
//!
//! Registration is last-write-wins. A request that read its token before a
//! re-registration completes with the old token and, on `401`, invokes
//! whichever handler is registered at the time the response lands.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};

use crate::config::Config;
use crate::error::{Result, SurveyflowError};

/// Returns the access token to attach, if any.
pub type TokenGetter = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Invoked when the backend rejects a request with `401 Unauthorized`.
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
struct Callbacks {
    token_getter: TokenGetter,
    on_unauthorized: UnauthorizedHandler,
}

/// Per-request options for [`ApiClient::fetch`].
///
/// # Examples
///
/// ```
/// use surveyflow::gateway::RequestOptions;
///
/// let opts = RequestOptions::post(serde_json::json!({"title": "Pulse"}))
///     .with_header("X-Trace", "abc");
/// assert_eq!(opts.method, reqwest::Method::POST);
/// ```
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method, `GET` by default.
    pub method: Method,
    /// Caller headers. These override the gateway defaults.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<serde_json::Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn put(body: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Bearer-injecting HTTP client for the SurveyFlow backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    callbacks: RwLock<Option<Callbacks>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl ApiClient {
    /// Creates a gateway over an existing HTTP client.
    ///
    /// The client should have its cookie store enabled so the refresh cookie
    /// travels with every request.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            callbacks: RwLock::new(None),
        }
    }

    /// Creates a gateway from configuration, with its own cookie-enabled
    /// HTTP client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_http_client(config.session.request_timeout_seconds)?;
        Ok(Self::new(http, config.api_base_url()))
    }

    /// Backend base URL with no trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers the token getter and unauthorized handler, replacing any
    /// previous registration.
    pub fn initialize(&self, token_getter: TokenGetter, on_unauthorized: UnauthorizedHandler) {
        let mut slot = self
            .callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Callbacks {
            token_getter,
            on_unauthorized,
        });
    }

    /// Whether [`initialize`](Self::initialize) has been called.
    pub fn is_initialized(&self) -> bool {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current_callbacks(&self) -> Option<Callbacks> {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Issues a request to `base_url + endpoint`.
    ///
    /// Headers are merged in this order, later entries winning:
    /// `Content-Type: application/json`, `Authorization: Bearer <token>`
    /// (only when the getter yields a token), then caller headers.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyflowError::Unauthorized`] on `401`, after invoking the
    /// registered handler. Transport failures surface as
    /// [`SurveyflowError::Http`]. Every other status is returned as-is.
    pub async fn fetch(&self, endpoint: &str, options: RequestOptions) -> Result<reqwest::Response> {
        let callbacks = self.current_callbacks();
        if callbacks.is_none() {
            tracing::debug!(endpoint, "Gateway used before initialize; sending without token");
        }
        let token = callbacks.as_ref().and_then(|cb| (cb.token_getter)());

        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.send(&url, token.as_deref(), options).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!(%url, "Backend rejected access token; invalidating session");
            // Re-read so the handler registered *now* is the one invoked.
            if let Some(cb) = self.current_callbacks() {
                (cb.on_unauthorized)();
            }
            return Err(SurveyflowError::Unauthorized.into());
        }

        Ok(response)
    }

    /// Issues a request without the access token.
    ///
    /// For pages reachable through a public link: cookies still travel, but
    /// no bearer is attached and a `401` is returned as-is without touching
    /// the session.
    ///
    /// # Errors
    ///
    /// Transport failures surface as [`SurveyflowError::Http`].
    pub async fn fetch_public(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        self.send(&url, None, options).await
    }

    async fn send(
        &self,
        url: &str,
        token: Option<&str>,
        options: RequestOptions,
    ) -> Result<reqwest::Response> {
        let headers = merge_headers(token, &options.headers)?;
        tracing::debug!(method = %options.method, %url, authenticated = token.is_some(), "Gateway request");

        let mut request = self.http.request(options.method, url).headers(headers);
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        Ok(request.send().await.map_err(SurveyflowError::Http)?)
    }
}

/// Builds the shared HTTP client used for backend calls.
///
/// The cookie store keeps the httponly refresh cookie between calls.
pub fn build_http_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| SurveyflowError::Config(format!("Failed to build HTTP client: {}", e)).into())
}

fn merge_headers(token: Option<&str>, extra: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| SurveyflowError::Internal(format!("Invalid access token header: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
    }

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SurveyflowError::Internal(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| SurveyflowError::Internal(format!("Invalid header value: {}", e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_headers_without_token() {
        let headers = merge_headers(None, &[]).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_merge_headers_with_token() {
        let headers = merge_headers(Some("tok"), &[]).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[test]
    fn test_merge_headers_caller_wins() {
        let extra = vec![
            ("content-type".to_string(), "text/plain".to_string()),
            ("X-Trace".to_string(), "1".to_string()),
        ];
        let headers = merge_headers(Some("tok"), &extra).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get("x-trace").unwrap(), "1");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[test]
    fn test_merge_headers_rejects_bad_name() {
        let extra = vec![("bad header".to_string(), "v".to_string())];
        assert!(merge_headers(None, &extra).is_err());
    }

    #[test]
    fn test_initialize_replaces_callbacks() {
        let client = ApiClient::new(reqwest::Client::new(), "http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert!(!client.is_initialized());

        client.initialize(Arc::new(|| Some("first".into())), Arc::new(|| {}));
        client.initialize(Arc::new(|| Some("second".into())), Arc::new(|| {}));

        let cb = client.current_callbacks().unwrap();
        assert_eq!((cb.token_getter)().as_deref(), Some("second"));
    }

    #[test]
    fn test_request_options_defaults() {
        let opts = RequestOptions::default();
        assert_eq!(opts.method, Method::GET);
        assert!(opts.body.is_none());
        assert!(opts.headers.is_empty());
    }
}
