//! Answer collection for the public response page

use std::collections::HashMap;

use crate::error::{Result, SurveyflowError};
use crate::surveys::model::{
    Answer, AnswerValue, ComponentProps, SubmitResponsePayload, Survey,
};

/// Answers being filled in for one survey.
#[derive(Debug, Clone)]
pub struct ResponseDraft {
    survey: Survey,
    answers: HashMap<String, AnswerValue>,
}

impl ResponseDraft {
    /// Starts a draft pre-filled from each question's configured state:
    /// checkbox `checked`, text `value`, radio `selectedValue`.
    pub fn new(survey: Survey) -> Self {
        let answers = survey
            .questions
            .iter()
            .map(|q| {
                let initial = match &q.props {
                    ComponentProps::Checkbox(p) => AnswerValue::Bool(p.checked),
                    ComponentProps::TextInput(p) => {
                        AnswerValue::Text(p.value.clone().unwrap_or_default())
                    }
                    ComponentProps::RadioBar(p) => {
                        AnswerValue::Text(p.selected_value.clone().unwrap_or_default())
                    }
                };
                (q.id.clone(), initial)
            })
            .collect();

        Self { survey, answers }
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    pub fn answer(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    /// Records an answer.
    ///
    /// # Errors
    ///
    /// Fails with `ValidationFailed` for an unknown question, a value of the
    /// wrong type for the question kind, or a radio value that is not one of
    /// the question's buttons.
    pub fn set_answer(&mut self, question_id: &str, value: AnswerValue) -> Result<()> {
        let question = self
            .survey
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| invalid(format!("Unknown question: {}", question_id)))?;

        match (&question.props, &value) {
            (ComponentProps::Checkbox(_), AnswerValue::Bool(_)) => {}
            (ComponentProps::TextInput(_), AnswerValue::Text(_)) => {}
            (ComponentProps::RadioBar(p), AnswerValue::Text(v)) => {
                if !v.is_empty() && !p.buttons.iter().any(|b| &b.value == v) {
                    return Err(invalid(format!("'{}' is not an option of {}", v, question_id)).into());
                }
            }
            _ => {
                return Err(invalid(format!(
                    "Answer type does not match {} question {}",
                    question.kind(),
                    question_id
                ))
                .into())
            }
        }

        self.answers.insert(question_id.to_string(), value);
        Ok(())
    }

    /// Answered questions; booleans always count, text counts when
    /// non-blank.
    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|v| v.is_answered()).count()
    }

    /// Completion percentage, rounded to a whole number.
    pub fn progress(&self) -> u32 {
        let total = self.survey.questions.len();
        if total == 0 {
            return 0;
        }
        ((self.answered_count() as f64 / total as f64) * 100.0).round() as u32
    }

    /// One answer per question in question order; missing answers are sent
    /// as an empty string.
    pub fn to_payload(&self) -> SubmitResponsePayload {
        let answers = self
            .survey
            .questions
            .iter()
            .map(|q| Answer {
                question_id: q.id.clone(),
                value: self
                    .answers
                    .get(&q.id)
                    .cloned()
                    .unwrap_or_else(|| AnswerValue::Text(String::new())),
            })
            .collect();

        SubmitResponsePayload {
            survey_id: self.survey.id.clone(),
            answers,
            submitted_at: None,
        }
    }
}

fn invalid(message: String) -> SurveyflowError {
    SurveyflowError::ValidationFailed(vec![message])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn survey() -> Survey {
        serde_json::from_value(json!({
            "id": "s1",
            "title": "Pulse",
            "questions": [
                {"id": "c", "questionText": "Agree?", "component": "Checkbox",
                 "option": {"optionProps": {"activeLabel": "Y", "inactiveLabel": "N", "checked": false}}},
                {"id": "t", "questionText": "Name", "component": "TextInput",
                 "option": {"optionProps": {"label": "Name", "placeholder": ""}}},
                {"id": "r", "questionText": "Color", "component": "RadioBar",
                 "option": {"optionProps": {"name": "color", "buttons": [
                    {"label": "Red", "value": "red"}, {"label": "Blue", "value": "blue"}]}}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_initial_answers_from_props() {
        let draft = ResponseDraft::new(survey());
        assert_eq!(draft.answer("c"), Some(&AnswerValue::Bool(false)));
        assert_eq!(draft.answer("t"), Some(&AnswerValue::Text(String::new())));
        // Only the checkbox counts as answered.
        assert_eq!(draft.answered_count(), 1);
        assert_eq!(draft.progress(), 33);
    }

    #[test]
    fn test_set_answer_updates_progress() {
        let mut draft = ResponseDraft::new(survey());
        draft.set_answer("t", AnswerValue::Text("Ada".into())).unwrap();
        draft.set_answer("r", AnswerValue::Text("blue".into())).unwrap();
        assert_eq!(draft.progress(), 100);
    }

    #[test]
    fn test_set_answer_rejects_mismatches() {
        let mut draft = ResponseDraft::new(survey());
        assert!(draft.set_answer("c", AnswerValue::Text("yes".into())).is_err());
        assert!(draft.set_answer("r", AnswerValue::Text("green".into())).is_err());
        assert!(draft.set_answer("missing", AnswerValue::Bool(true)).is_err());
    }

    #[test]
    fn test_to_payload_covers_every_question() {
        let mut draft = ResponseDraft::new(survey());
        draft.set_answer("c", AnswerValue::Bool(true)).unwrap();
        let payload = draft.to_payload();
        assert_eq!(payload.survey_id, "s1");
        let ids: Vec<&str> = payload.answers.iter().map(|a| a.question_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "t", "r"]);
        assert_eq!(payload.answers[0].value, AnswerValue::Bool(true));
        assert_eq!(payload.answers[2].value, AnswerValue::Text(String::new()));
        assert!(payload.submitted_at.is_none());
    }

    #[test]
    fn test_empty_survey_progress_is_zero() {
        let draft = ResponseDraft::new(Survey {
            id: "s".into(),
            title: None,
            questions: vec![],
        });
        assert_eq!(draft.progress(), 0);
    }
}
