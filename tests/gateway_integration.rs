//! API gateway integration tests
//!
//! Checks the headers the gateway attaches and the 401 handling that
//! invalidates the session.

mod common;

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use surveyflow::config::SessionConfig;
use surveyflow::error::SurveyflowError;
use surveyflow::gateway::RequestOptions;

use common::{harness, token_json};

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json(token, 900)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_attaches_bearer_and_json_content_type() {
    let server = MockServer::start().await;
    mount_login(&server, "tok").await;
    Mock::given(method("GET"))
        .and(path("/surveys/options"))
        .and(header("authorization", "Bearer tok"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, SessionConfig::default());
    h.session.login("user@example.com", "pw").await.unwrap();

    let response = h
        .gateway
        .fetch("/surveys/options", RequestOptions::get())
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_fetch_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(body_json(serde_json::json!({ "a": 1 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, SessionConfig::default());
    let response = h
        .gateway
        .fetch("/echo", RequestOptions::post(serde_json::json!({ "a": 1 })))
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_caller_headers_override_defaults() {
    let server = MockServer::start().await;
    mount_login(&server, "tok").await;
    Mock::given(method("GET"))
        .and(path("/custom"))
        .and(header("authorization", "Bearer other"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, SessionConfig::default());
    h.session.login("user@example.com", "pw").await.unwrap();

    let options = RequestOptions::get().with_header("Authorization", "Bearer other");
    let response = h.gateway.fetch("/custom", options).await.unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let server = MockServer::start().await;
    mount_login(&server, "stale").await;
    Mock::given(method("GET"))
        .and(path("/surveys/options"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let h = harness(&server, SessionConfig::default());
    h.session.login("user@example.com", "pw").await.unwrap();
    assert!(h.session.is_authenticated());

    let err = h
        .gateway
        .fetch("/surveys/options", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SurveyflowError>(),
        Some(SurveyflowError::Unauthorized)
    ));
    assert!(!h.session.is_authenticated());
    assert!(!h.session.has_refresh_timer());
}

#[tokio::test]
async fn test_other_statuses_are_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let h = harness(&server, SessionConfig::default());
    let response = h
        .gateway
        .fetch("/missing", RequestOptions::get())
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_public_fetch_sends_no_bearer() {
    let server = MockServer::start().await;
    mount_login(&server, "tok").await;
    Mock::given(method("GET"))
        .and(path("/surveys/s1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/surveys/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "s1" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, SessionConfig::default());
    h.session.login("user@example.com", "pw").await.unwrap();

    let survey = h.surveys.fetch_public_survey("s1").await.unwrap();
    assert_eq!(survey.id, "s1");
}

#[tokio::test]
async fn test_public_fetch_unauthorized_keeps_session() {
    let server = MockServer::start().await;
    mount_login(&server, "tok").await;
    Mock::given(method("GET"))
        .and(path("/surveys/s1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let h = harness(&server, SessionConfig::default());
    h.session.login("user@example.com", "pw").await.unwrap();

    let err = h.surveys.fetch_public_survey("s1").await.unwrap_err();
    assert!(err.to_string().contains("401"), "error was {}", err);
    assert!(h.session.is_authenticated());
    assert!(h.session.has_refresh_timer());
}
