//! Proxy failure classification
//!
//! Every failure to reach the backend is answered with a JSON body
//! `{error, message, code, timestamp}`; clients branch on `code`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use thiserror::Error;

use crate::error::SurveyflowError;

/// Errors emitted by the edge proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Backend unreachable (connection refused, DNS failure, reset).
    #[error("Backend service is unreachable: {0}")]
    ServiceUnavailable(String),

    /// Backend did not answer within the upstream timeout.
    #[error("Backend service did not respond in time: {0}")]
    GatewayTimeout(String),

    /// Anything else, including unparseable JSON request bodies.
    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    /// Classifies a failed upstream call.
    pub fn from_upstream(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::GatewayTimeout(err.to_string())
        } else if err.is_connect() {
            ProxyError::ServiceUnavailable(err.to_string())
        } else {
            ProxyError::Internal(err.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProxyError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ProxyError::GatewayTimeout(_) => "GATEWAY_TIMEOUT",
            ProxyError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ProxyError::ServiceUnavailable(_) => "Service Unavailable",
            ProxyError::GatewayTimeout(_) => "Gateway Timeout",
            ProxyError::Internal(_) => "Internal Server Error",
        }
    }
}

impl From<ProxyError> for SurveyflowError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::ServiceUnavailable(msg) => SurveyflowError::ServiceUnavailable(msg),
            ProxyError::GatewayTimeout(msg) => SurveyflowError::GatewayTimeout(msg),
            ProxyError::Internal(msg) => SurveyflowError::Internal(msg),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::warn!(code = self.code(), error = %self, "Proxy request failed");
        let payload = json!({
            "error": self.title(),
            "message": self.to_string(),
            "code": self.code(),
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        (self.status(), Json(payload)).into_response()
    }
}
