//! Survey and response endpoints
//!
//! Authoring calls go through the authenticated [`ApiClient`]; the public
//! survey page uses its unauthenticated path. Response
//! collection degrades to the [`LocalStore`] when the backend does not offer
//! the responses endpoint (404, 405, 501) or cannot be reached.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{Result, SurveyflowError};
use crate::gateway::{ApiClient, RequestOptions};
use crate::storage::{LocalStore, RESPONSES_KEY};
use crate::surveys::model::{
    CreatedId, SubmitResponsePayload, Survey, SurveyListEnvelope, SurveyOption, SurveyPayload,
    SurveyResponse,
};

/// Typed access to the survey backend.
#[derive(Debug, Clone)]
pub struct SurveyService {
    gateway: Arc<ApiClient>,
    store: Arc<LocalStore>,
}

impl SurveyService {
    pub fn new(gateway: Arc<ApiClient>, store: Arc<LocalStore>) -> Self {
        Self { gateway, store }
    }

    /// Creates a survey, or replaces `existing_id` when given.
    ///
    /// # Errors
    ///
    /// Any non-2xx answer fails with "Failed to save survey".
    pub async fn save_survey(
        &self,
        payload: &SurveyPayload,
        existing_id: Option<&str>,
    ) -> Result<CreatedId> {
        let body = serde_json::to_value(payload)?;
        let (endpoint, options) = match existing_id {
            Some(id) => (format!("/surveys/{}", id), RequestOptions::put(body)),
            None => ("/surveys".to_string(), RequestOptions::post(body)),
        };

        let response = self.gateway.fetch(&endpoint, options).await?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), %endpoint, "Survey save rejected");
            return Err(SurveyflowError::Api("Failed to save survey".to_string()).into());
        }

        let created: CreatedId = read_json(response).await?;
        tracing::info!(id = %created.id, "Survey saved");
        Ok(created)
    }

    pub async fn fetch_survey(&self, id: &str) -> Result<Survey> {
        let response = self
            .gateway
            .fetch(&format!("/surveys/{}", id), RequestOptions::get())
            .await?;
        if !response.status().is_success() {
            return Err(SurveyflowError::Api("Failed to load survey".to_string()).into());
        }
        read_json(response).await
    }

    /// Surveys for the picker, from `/surveys/options` or, failing that,
    /// the legacy `/surveys` listing.
    pub async fn fetch_survey_options(&self) -> Result<Vec<SurveyOption>> {
        let response = self
            .gateway
            .fetch("/surveys/options", RequestOptions::get())
            .await?;
        if response.status().is_success() {
            return read_json(response).await;
        }

        tracing::warn!(status = %response.status(), "Survey options endpoint failed; trying /surveys");
        let response = self.gateway.fetch("/surveys", RequestOptions::get()).await?;
        if !response.status().is_success() {
            return Err(SurveyflowError::Api("Failed to load survey options".to_string()).into());
        }
        let envelope: SurveyListEnvelope = read_json(response).await?;
        Ok(envelope.surveys)
    }

    /// Responses collected for `survey_id`.
    ///
    /// Falls back to locally stored responses when the endpoint is missing
    /// or the backend is unreachable.
    pub async fn fetch_survey_responses(&self, survey_id: &str) -> Result<Vec<SurveyResponse>> {
        let endpoint = format!("/surveys/{}/responses", survey_id);
        match self.gateway.fetch(&endpoint, RequestOptions::get()).await {
            Ok(response) if response.status().is_success() => return read_json(response).await,
            Ok(response) if is_fallback_status(response.status()) => {
                tracing::warn!(status = %response.status(), "Responses endpoint unavailable; using local store");
            }
            Ok(response) => {
                return Err(SurveyflowError::Api(format!(
                    "Failed to fetch survey responses: {}",
                    response.status().as_u16()
                ))
                .into());
            }
            Err(e) if is_transport_error(&e) => {
                tracing::warn!(error = %e, "Responses endpoint unreachable; using local store");
            }
            Err(e) => return Err(e),
        }

        let local: Vec<serde_json::Value> = self.store.read_list(RESPONSES_KEY)?;
        Ok(local
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<SurveyResponse>(record) {
                Ok(response) => Some(response),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable local response");
                    None
                }
            })
            .filter(|r| r.survey_id == survey_id)
            .collect())
    }

    /// Submits a response, stamping `submittedAt` when absent.
    ///
    /// When the backend cannot take it, the response is appended to the
    /// local store under a `local-<millis>-<hex>` id.
    pub async fn submit_survey_response(
        &self,
        mut payload: SubmitResponsePayload,
    ) -> Result<CreatedId> {
        payload.submitted_at.get_or_insert_with(Utc::now);

        let endpoint = format!("/surveys/{}/responses", payload.survey_id);
        let body = serde_json::to_value(&payload)?;
        match self.gateway.fetch(&endpoint, RequestOptions::post(body)).await {
            Ok(response) if response.status().is_success() => return read_json(response).await,
            Ok(response) if is_fallback_status(response.status()) => {
                tracing::warn!(status = %response.status(), "Submit endpoint unavailable; storing locally");
            }
            Ok(response) => {
                return Err(SurveyflowError::Api(format!(
                    "Failed to submit survey response: {}",
                    response.status().as_u16()
                ))
                .into());
            }
            Err(e) if is_transport_error(&e) => {
                tracing::warn!(error = %e, "Submit endpoint unreachable; storing locally");
            }
            Err(e) => return Err(e),
        }

        self.store_locally(payload)
    }

    /// Loads a survey for the public response page.
    ///
    /// Sent without the access token, so a rejection never signs the
    /// current user out.
    pub async fn fetch_public_survey(&self, id: &str) -> Result<Survey> {
        let response = self
            .gateway
            .fetch_public(&format!("/surveys/{}", id), RequestOptions::get())
            .await?;
        if !response.status().is_success() {
            return Err(SurveyflowError::Api(format!(
                "Failed to load survey: {}",
                response.status().as_u16()
            ))
            .into());
        }
        read_json(response).await
    }

    fn store_locally(&self, payload: SubmitResponsePayload) -> Result<CreatedId> {
        let id = local_response_id();
        // Existing records stay untyped so ones this version cannot decode
        // are written back unchanged.
        let mut local: Vec<serde_json::Value> = self.store.read_list(RESPONSES_KEY)?;
        local.push(serde_json::to_value(SurveyResponse {
            id: id.clone(),
            survey_id: payload.survey_id,
            answers: payload.answers,
            submitted_at: payload.submitted_at,
        })?);
        self.store.write_list(RESPONSES_KEY, &local)?;
        tracing::info!(%id, "Stored survey response locally");
        Ok(CreatedId { id })
    }
}

/// Shareable link to the public response page of a survey.
///
/// # Examples
///
/// ```
/// use surveyflow::surveys::public_survey_url;
///
/// assert_eq!(
///     public_survey_url("https://app.example.com/", "abc"),
///     "https://app.example.com/survey/abc"
/// );
/// ```
pub fn public_survey_url(app_base: &str, id: &str) -> String {
    format!("{}/survey/{}", app_base.trim_end_matches('/'), id)
}

fn local_response_id() -> String {
    let suffix: u64 = rand::rng().random();
    format!("local-{}-{:x}", Utc::now().timestamp_millis(), suffix)
}

fn is_fallback_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
    )
}

fn is_transport_error(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<SurveyflowError>(),
        Some(SurveyflowError::Http(_))
    )
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(SurveyflowError::Http)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_response_id_shape() {
        let id = local_response_id();
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts[0], "local");
        assert!(parts[1].parse::<i64>().is_ok());
        assert!(u64::from_str_radix(parts[2], 16).is_ok());
    }

    #[test]
    fn test_fallback_statuses() {
        assert!(is_fallback_status(StatusCode::NOT_FOUND));
        assert!(is_fallback_status(StatusCode::METHOD_NOT_ALLOWED));
        assert!(is_fallback_status(StatusCode::NOT_IMPLEMENTED));
        assert!(!is_fallback_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_fallback_status(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_unauthorized_is_not_transport() {
        let err: anyhow::Error = SurveyflowError::Unauthorized.into();
        assert!(!is_transport_error(&err));
    }

    #[test]
    fn test_public_survey_url() {
        assert_eq!(
            public_survey_url("http://localhost:3000", "s1"),
            "http://localhost:3000/survey/s1"
        );
    }
}
