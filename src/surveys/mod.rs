//! Surveys and survey responses
//!
//! - [`model`] -- wire types for surveys, questions and responses.
//! - [`service`] -- [`SurveyService`], backend calls with local fallback.
//! - [`response_form`] -- answer collection for the public response page.

pub mod model;
pub mod response_form;
pub mod service;

pub use model::{
    Answer, AnswerValue, ComponentProps, Question, QuestionKind, SubmitResponsePayload, Survey,
    SurveyOption, SurveyPayload, SurveyResponse,
};
pub use response_form::ResponseDraft;
pub use service::{public_survey_url, SurveyService};
