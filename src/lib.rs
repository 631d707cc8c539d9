//! SurveyFlow - survey authoring client and edge proxy library
//!
//! This library provides the core functionality of SurveyFlow: an
//! authenticated session with silent token refresh, an API gateway that
//! attaches the access token to every backend call, a survey builder
//! model with a 12-column grid layout, response analytics, and an edge
//! proxy that forwards `/api/proxy/*` requests to the backend.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Session manager, token payloads and credential validation
//! - `gateway`: Authenticated HTTP client for the backend API
//! - `builder`: Survey canvas, question factory, grid layouts and drag state
//! - `surveys`: Survey data model, survey service and response form
//! - `dashboard`: Response analytics across all surveys
//! - `proxy`: Edge proxy router, route guard and upstream error mapping
//! - `storage`: Local key/value store with JSON lists
//! - `theme`: Persisted light/dark theme preference
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use surveyflow::{ApiClient, Config, SessionManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let gateway = Arc::new(ApiClient::from_config(&config)?);
//!     let session = SessionManager::from_config(&config, gateway)?;
//!     session.login("user@example.com", "password123").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod builder;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod proxy;
pub mod storage;
pub mod surveys;
pub mod theme;

// Re-export commonly used types
pub use auth::SessionManager;
pub use builder::SurveyCanvas;
pub use config::Config;
pub use error::{Result, SurveyflowError};
pub use gateway::ApiClient;
pub use surveys::SurveyService;
