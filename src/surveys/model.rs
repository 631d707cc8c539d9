//! Survey, question and response data types
//!
//! Field names follow the backend's JSON (camelCase). A question's
//! configuration travels as `{"component": <kind>, "option": {"optionProps":
//! {...}}}`; in Rust the kind and its props are one [`ComponentProps`] value
//! so they cannot disagree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::builder::layout::LayoutItem;
use crate::error::SurveyflowError;

// ---------------------------------------------------------------------------
// Question kinds and props
// ---------------------------------------------------------------------------

/// The three question controls a survey can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    TextInput,
    Checkbox,
    RadioBar,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 3] = [
        QuestionKind::TextInput,
        QuestionKind::Checkbox,
        QuestionKind::RadioBar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::TextInput => "TextInput",
            QuestionKind::Checkbox => "Checkbox",
            QuestionKind::RadioBar => "RadioBar",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = SurveyflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TextInput" => Ok(QuestionKind::TextInput),
            "Checkbox" => Ok(QuestionKind::Checkbox),
            "RadioBar" => Ok(QuestionKind::RadioBar),
            other => Err(SurveyflowError::ValidationFailed(vec![format!(
                "Unsupported question type: {}",
                other
            )])),
        }
    }
}

/// On/off toggle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckboxProps {
    pub active_label: String,
    pub inactive_label: String,
    pub checked: bool,
}

impl Default for CheckboxProps {
    fn default() -> Self {
        Self {
            active_label: "ON".to_string(),
            inactive_label: "OFF".to_string(),
            checked: false,
        }
    }
}

/// Free-text field configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextInputProps {
    pub label: String,
    pub placeholder: String,
    /// Pre-filled answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Default for TextInputProps {
    fn default() -> Self {
        Self {
            label: "Enter text".to_string(),
            placeholder: "Type here...".to_string(),
            value: None,
        }
    }
}

/// One choice of a radio group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioButton {
    pub label: String,
    pub value: String,
}

impl RadioButton {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: label.clone(),
            label,
        }
    }
}

/// Single-choice radio group configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadioBarProps {
    pub name: String,
    pub buttons: Vec<RadioButton>,
    /// Pre-selected value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_value: Option<String>,
}

impl Default for RadioBarProps {
    fn default() -> Self {
        Self {
            name: "Select an option".to_string(),
            buttons: QuestionKind::ALL
                .iter()
                .map(|kind| RadioButton::new(kind.as_str()))
                .collect(),
            selected_value: None,
        }
    }
}

/// Kind-specific configuration of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentProps {
    Checkbox(CheckboxProps),
    TextInput(TextInputProps),
    RadioBar(RadioBarProps),
}

impl ComponentProps {
    pub fn kind(&self) -> QuestionKind {
        match self {
            ComponentProps::Checkbox(_) => QuestionKind::Checkbox,
            ComponentProps::TextInput(_) => QuestionKind::TextInput,
            ComponentProps::RadioBar(_) => QuestionKind::RadioBar,
        }
    }

    /// Default configuration for `kind`.
    pub fn default_for(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Checkbox => ComponentProps::Checkbox(CheckboxProps::default()),
            QuestionKind::TextInput => ComponentProps::TextInput(TextInputProps::default()),
            QuestionKind::RadioBar => ComponentProps::RadioBar(RadioBarProps::default()),
        }
    }

    fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            ComponentProps::Checkbox(p) => serde_json::to_value(p),
            ComponentProps::TextInput(p) => serde_json::to_value(p),
            ComponentProps::RadioBar(p) => serde_json::to_value(p),
        }
    }

    fn from_value(kind: QuestionKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            QuestionKind::Checkbox => ComponentProps::Checkbox(serde_json::from_value(value)?),
            QuestionKind::TextInput => ComponentProps::TextInput(serde_json::from_value(value)?),
            QuestionKind::RadioBar => ComponentProps::RadioBar(serde_json::from_value(value)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// One question card of a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireQuestion", into = "WireQuestion")]
pub struct Question {
    /// Unique within its survey.
    pub id: String,
    pub question_text: String,
    pub props: ComponentProps,
    /// Card placement; older surveys may have none.
    pub layout: Option<LayoutItem>,
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        self.props.kind()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireOption {
    #[serde(rename = "optionProps")]
    option_props: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuestion {
    id: String,
    question_text: String,
    component: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    option: Option<WireOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layout: Option<LayoutItem>,
}

impl TryFrom<WireQuestion> for Question {
    type Error = serde_json::Error;

    fn try_from(wire: WireQuestion) -> Result<Self, Self::Error> {
        let props = match wire.option {
            Some(option) if !option.option_props.is_null() => {
                ComponentProps::from_value(wire.component, option.option_props)?
            }
            _ => ComponentProps::default_for(wire.component),
        };
        Ok(Self {
            id: wire.id,
            question_text: wire.question_text,
            props,
            layout: wire.layout,
        })
    }
}

impl From<Question> for WireQuestion {
    fn from(q: Question) -> Self {
        let component = q.kind();
        // Props are plain structs of strings/bools; serializing them cannot fail.
        let option_props = q.props.to_value().unwrap_or(serde_json::Value::Null);
        Self {
            id: q.id,
            question_text: q.question_text,
            component,
            option: Some(WireOption { option_props }),
            layout: q.layout,
        }
    }
}

// ---------------------------------------------------------------------------
// Surveys
// ---------------------------------------------------------------------------

/// A stored survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Survey {
    /// Title for display; blank titles read as "Untitled Survey".
    pub fn display_title(&self) -> &str {
        display_title(self.title.as_deref())
    }
}

/// Body of a save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub questions: Vec<Question>,
}

/// Listing entry returned by `/surveys/options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyOption {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl SurveyOption {
    /// Picker label: title plus the last eight characters of the id.
    pub fn label(&self) -> String {
        let tail_start = self
            .id
            .char_indices()
            .rev()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{} ({})", display_title(self.title.as_deref()), &self.id[tail_start..])
    }
}

/// Envelope returned by the legacy `/surveys` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyListEnvelope {
    #[serde(default)]
    pub surveys: Vec<SurveyOption>,
}

/// `{ "id": ... }` returned by create endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedId {
    pub id: String,
}

fn display_title(title: Option<&str>) -> &str {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => "Untitled Survey",
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A single answer value: text/radio answers are strings, checkboxes booleans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
}

impl AnswerValue {
    /// Whether the respondent has given an answer. Booleans always count.
    pub fn is_answered(&self) -> bool {
        match self {
            AnswerValue::Bool(_) => true,
            AnswerValue::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Bool(b) => write!(f, "{}", b),
            AnswerValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub value: AnswerValue,
}

/// Body of a response submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponsePayload {
    pub survey_id: String,
    pub answers: Vec<Answer>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A stored (append-only) survey response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub id: String,
    pub survey_id: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Parses a submission timestamp.
///
/// Accepts RFC 3339, offset-less date-times (read as UTC) and bare
/// `YYYY-MM-DD` dates. Anything else, including non-string values, reads as
/// `None` rather than failing the whole record.
///
/// # Examples
///
/// ```
/// use surveyflow::surveys::model::parse_timestamp;
///
/// assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
/// assert!(parse_timestamp("2024-05-01T10:00:00").is_some());
/// assert!(parse_timestamp("2024-05-01").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(raw)) => parse_timestamp(&raw),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_parses_backend_shape() {
        let q: Question = serde_json::from_value(json!({
            "id": "question-1-0",
            "questionText": "Do you like it?",
            "component": "Checkbox",
            "option": {"optionProps": {"activeLabel": "Yes", "inactiveLabel": "No", "checked": true}},
            "layout": {"i": "question-1-0", "x": 0, "y": 0, "w": 3, "h": 2}
        }))
        .unwrap();

        assert_eq!(q.kind(), QuestionKind::Checkbox);
        assert_eq!(
            q.props,
            ComponentProps::Checkbox(CheckboxProps {
                active_label: "Yes".into(),
                inactive_label: "No".into(),
                checked: true
            })
        );
        assert_eq!(q.layout.as_ref().map(|l| l.w), Some(3));
    }

    #[test]
    fn test_question_without_option_gets_kind_defaults() {
        let q: Question = serde_json::from_value(json!({
            "id": "q",
            "questionText": "Pick",
            "component": "RadioBar"
        }))
        .unwrap();
        match q.props {
            ComponentProps::RadioBar(p) => {
                assert_eq!(p.name, "Select an option");
                assert_eq!(p.buttons.len(), 3);
            }
            other => panic!("unexpected props: {other:?}"),
        }
        assert!(q.layout.is_none());
    }

    #[test]
    fn test_text_props_ignore_unknown_fields() {
        let q: Question = serde_json::from_value(json!({
            "id": "q",
            "questionText": "Name",
            "component": "TextInput",
            "option": {"optionProps": {"label": "Name", "test_id": "x"}}
        }))
        .unwrap();
        match q.props {
            ComponentProps::TextInput(p) => {
                assert_eq!(p.label, "Name");
                assert_eq!(p.placeholder, "Type here...");
            }
            other => panic!("unexpected props: {other:?}"),
        }
    }

    #[test]
    fn test_question_serializes_component_and_option_props() {
        let q = Question {
            id: "q".into(),
            question_text: "Pick".into(),
            props: ComponentProps::RadioBar(RadioBarProps {
                name: "color".into(),
                buttons: vec![RadioButton::new("red")],
                selected_value: None,
            }),
            layout: None,
        };
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["component"], "RadioBar");
        assert_eq!(v["questionText"], "Pick");
        assert_eq!(v["option"]["optionProps"]["buttons"][0]["value"], "red");
        assert!(v.get("layout").is_none());
    }

    #[test]
    fn test_unknown_component_is_rejected() {
        let result: Result<Question, _> = serde_json::from_value(json!({
            "id": "q",
            "questionText": "?",
            "component": "Slider"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_answer_value_untagged() {
        let answers: Vec<Answer> = serde_json::from_value(json!([
            {"questionId": "a", "value": true},
            {"questionId": "b", "value": "blue"}
        ]))
        .unwrap();
        assert_eq!(answers[0].value, AnswerValue::Bool(true));
        assert_eq!(answers[1].value.to_string(), "blue");
        assert_eq!(answers[0].value.to_string(), "true");
    }

    #[test]
    fn test_answer_value_is_answered() {
        assert!(AnswerValue::Bool(false).is_answered());
        assert!(!AnswerValue::Text("  ".into()).is_answered());
        assert!(AnswerValue::Text("x".into()).is_answered());
    }

    #[test]
    fn test_survey_option_label() {
        let option = SurveyOption {
            id: "65f1c2aa9be14d7c".into(),
            title: Some("  Team Pulse ".into()),
        };
        assert_eq!(option.label(), "Team Pulse (9be14d7c)");

        let untitled = SurveyOption {
            id: "abc".into(),
            title: None,
        };
        assert_eq!(untitled.label(), "Untitled Survey (abc)");
    }

    #[test]
    fn test_response_parses_iso_timestamp() {
        let r: SurveyResponse = serde_json::from_value(json!({
            "id": "r1",
            "surveyId": "s1",
            "answers": [],
            "submittedAt": "2024-03-01T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(
            r.submitted_at.unwrap().format("%Y-%m-%d").to_string(),
            "2024-03-01"
        );
    }

    #[test]
    fn test_response_list_tolerates_loose_timestamps() {
        let responses: Vec<SurveyResponse> = serde_json::from_value(json!([
            {"id": "r1", "surveyId": "s1", "answers": [], "submittedAt": "2024-05-01T10:00:00Z"},
            {"id": "r2", "surveyId": "s1", "answers": [], "submittedAt": "2024-05-01T10:00:00"},
            {"id": "r3", "surveyId": "s1", "answers": [], "submittedAt": "2024-05-02"},
            {"id": "r4", "surveyId": "s1", "answers": [], "submittedAt": "not a date"},
            {"id": "r5", "surveyId": "s1", "answers": [], "submittedAt": null}
        ]))
        .unwrap();

        assert_eq!(responses.len(), 5);
        assert_eq!(responses[0].submitted_at, responses[1].submitted_at);
        assert_eq!(
            responses[2].submitted_at.unwrap().format("%Y-%m-%d %H:%M").to_string(),
            "2024-05-02 00:00"
        );
        assert_eq!(responses[3].submitted_at, None);
        assert_eq!(responses[4].submitted_at, None);
    }

    #[test]
    fn test_submit_payload_accepts_naive_timestamp() {
        let payload: SubmitResponsePayload = serde_json::from_value(json!({
            "surveyId": "s1",
            "answers": [],
            "submittedAt": "2024-05-01 08:30:00"
        }))
        .unwrap();
        assert_eq!(
            payload.submitted_at.unwrap().to_rfc3339(),
            "2024-05-01T08:30:00+00:00"
        );
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("RadioBar".parse::<QuestionKind>().unwrap(), QuestionKind::RadioBar);
        assert!("radio".parse::<QuestionKind>().is_err());
    }
}
