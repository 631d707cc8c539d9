//! Question factory
//!
//! Turns a palette selection plus the creation form into a [`Question`]
//! with kind defaults filled in.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::builder::layout::{LayoutItem, CARD_HEIGHT, CARD_WIDTH};
use crate::surveys::model::{
    CheckboxProps, ComponentProps, Question, QuestionKind, RadioBarProps, RadioButton,
    TextInputProps,
};

/// Text-input part of the creation form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextInputConfig {
    pub label: Option<String>,
    pub placeholder: Option<String>,
}

/// Radio-group part of the creation form; each button label doubles as its
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RadioBarConfig {
    pub name: Option<String>,
    pub buttons: Vec<String>,
}

/// Checkbox part of the creation form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckboxConfig {
    pub active_label: Option<String>,
    pub inactive_label: Option<String>,
    pub checked: bool,
}

/// Values collected by the question creation form.
///
/// Unset fields fall back to the kind defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateConfig {
    pub question_text: String,
    pub checkbox: Option<CheckboxConfig>,
    pub text_input: Option<TextInputConfig>,
    pub radio_bar: Option<RadioBarConfig>,
}

impl CreateConfig {
    pub fn with_text(question_text: impl Into<String>) -> Self {
        Self {
            question_text: question_text.into(),
            ..Self::default()
        }
    }
}

/// Builds a question of `kind` for slot `index`.
///
/// The id is `question-<unix millis>-<index>`; the layout entry uses the
/// standard card size at that slot.
///
/// # Examples
///
/// ```
/// use surveyflow::builder::factory::{create_question, CreateConfig};
/// use surveyflow::surveys::model::QuestionKind;
///
/// let q = create_question(QuestionKind::Checkbox, &CreateConfig::default(), 0);
/// assert_eq!(q.question_text, "New Checkbox Question");
/// assert!(q.id.starts_with("question-"));
/// ```
pub fn create_question(kind: QuestionKind, config: &CreateConfig, index: usize) -> Question {
    let id = format!("question-{}-{}", Utc::now().timestamp_millis(), index);
    let question_text = if config.question_text.trim().is_empty() {
        format!("New {} Question", kind)
    } else {
        config.question_text.clone()
    };

    let props = match kind {
        QuestionKind::Checkbox => {
            let defaults = CheckboxProps::default();
            let cfg = config.checkbox.clone().unwrap_or_default();
            ComponentProps::Checkbox(CheckboxProps {
                active_label: cfg.active_label.unwrap_or(defaults.active_label),
                inactive_label: cfg.inactive_label.unwrap_or(defaults.inactive_label),
                checked: cfg.checked,
            })
        }
        QuestionKind::TextInput => {
            let defaults = TextInputProps::default();
            let cfg = config.text_input.clone().unwrap_or_default();
            ComponentProps::TextInput(TextInputProps {
                label: cfg.label.unwrap_or(defaults.label),
                placeholder: cfg.placeholder.unwrap_or(defaults.placeholder),
                value: None,
            })
        }
        QuestionKind::RadioBar => {
            let defaults = RadioBarProps::default();
            let cfg = config.radio_bar.clone().unwrap_or_default();
            let buttons = if cfg.buttons.is_empty() {
                defaults.buttons
            } else {
                cfg.buttons.into_iter().map(RadioButton::new).collect()
            };
            ComponentProps::RadioBar(RadioBarProps {
                name: cfg.name.unwrap_or(defaults.name),
                buttons,
                selected_value: None,
            })
        }
    };

    Question {
        layout: Some(LayoutItem::at_index(id.clone(), index, CARD_WIDTH, CARD_HEIGHT)),
        id,
        question_text,
        props,
    }
}
