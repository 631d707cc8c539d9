//! Survey builder canvas
//!
//! [`SurveyCanvas`] owns the question list and the per-breakpoint layout and
//! keeps them in lockstep: every question has exactly one layout entry on
//! every breakpoint, in question order.

use crate::builder::drag::{DragState, Point, Rect};
use crate::builder::factory::{create_question, CreateConfig};
use crate::builder::layout::{Breakpoint, LayoutItem, Layouts, CARD_HEIGHT, CARD_WIDTH};
use crate::error::{Result, SurveyflowError};
use crate::surveys::model::{Question, QuestionKind, Survey, SurveyPayload};

/// In-progress survey being edited.
#[derive(Debug, Clone, Default)]
pub struct SurveyCanvas {
    title: String,
    questions: Vec<Question>,
    layouts: Layouts,
    drag: DragState,
    active_survey_id: Option<String>,
}

impl SurveyCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Id of the survey this canvas was loaded from or last saved as.
    pub fn active_survey_id(&self) -> Option<&str> {
        self.active_survey_id.as_deref()
    }

    pub fn set_active_survey_id(&mut self, id: impl Into<String>) {
        self.active_survey_id = Some(id.into());
    }

    /// Creates a question of `kind` and places it in the next free slot.
    ///
    /// The generated id is made unique against the questions already on the
    /// canvas.
    pub fn add_question(&mut self, kind: QuestionKind, config: &CreateConfig) -> &Question {
        let index = self.questions.len();
        let mut question = create_question(kind, config, index);

        if self.contains(&question.id) {
            let base = question.id.clone();
            let mut n = 1;
            while self.contains(&format!("{}-{}", base, n)) {
                n += 1;
            }
            question.id = format!("{}-{}", base, n);
        }

        let item = LayoutItem::at_index(question.id.clone(), index, CARD_WIDTH, CARD_HEIGHT);
        question.layout = Some(item.clone());
        self.layouts.append(item);
        self.questions.push(question);

        tracing::debug!(kind = %kind, index, "Added question to canvas");
        &self.questions[index]
    }

    /// Removes a question and re-packs the layout of the remaining ones.
    ///
    /// Returns `false` when no question has that id.
    pub fn remove_question(&mut self, id: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != id);
        if self.questions.len() == before {
            return false;
        }
        self.regenerate_layouts();
        tracing::debug!(id, remaining = self.questions.len(), "Removed question from canvas");
        true
    }

    /// Removes every question. Title and active survey are kept.
    pub fn clear(&mut self) {
        self.questions.clear();
        self.layouts = Layouts::default();
        self.drag.cancel();
    }

    /// Replaces the canvas with a stored survey.
    pub fn load(&mut self, survey: Survey) {
        self.title = survey.title.as_deref().map(str::trim).unwrap_or_default().to_string();
        self.questions = survey.questions;
        self.active_survey_id = Some(survey.id);
        self.drag.cancel();
        self.regenerate_layouts();
    }

    /// Accepts a user move/resize on one breakpoint.
    ///
    /// Entries for unknown ids are dropped and each entry is clamped so
    /// that `x + w <= 12`.
    pub fn apply_layout_change(&mut self, breakpoint: Breakpoint, items: Vec<LayoutItem>) {
        let items = items.into_iter().filter(|item| self.contains(&item.i)).collect();
        self.layouts.set(breakpoint, items);
    }

    /// Builds the save payload from the current state.
    ///
    /// Each question carries its current large-breakpoint layout.
    ///
    /// # Errors
    ///
    /// Returns `SurveyflowError::ValidationFailed` when the title is blank.
    pub fn to_payload(&self) -> Result<SurveyPayload> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(
                SurveyflowError::ValidationFailed(vec!["Survey name is required".to_string()])
                    .into(),
            );
        }

        let questions = self
            .questions
            .iter()
            .map(|q| {
                let mut q = q.clone();
                if let Some(item) = self.layouts.find(&q.id) {
                    q.layout = Some(item.clone());
                }
                q
            })
            .collect();

        Ok(SurveyPayload {
            title: Some(title.to_string()),
            questions,
        })
    }

    /// Public response path for the active survey, e.g. `/survey/<id>`.
    pub fn share_path(&self) -> Option<String> {
        self.active_survey_id
            .as_ref()
            .map(|id| format!("/survey/{}", id))
    }

    // -----------------------------------------------------------------------
    // Drag-to-trash
    // -----------------------------------------------------------------------

    pub fn begin_drag(&mut self, id: &str) {
        if self.contains(id) {
            self.drag.pointer_down(id);
        }
    }

    pub fn drag_move(&mut self, point: Point, trash: Rect) {
        self.drag.pointer_move(point, trash);
    }

    /// Finishes a drag, deleting the question when released over the trash.
    ///
    /// Returns the id of the deleted question.
    pub fn end_drag(&mut self) -> Option<String> {
        let id = self.drag.drop()?;
        self.remove_question(&id).then_some(id)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    fn contains(&self, id: &str) -> bool {
        self.questions.iter().any(|q| q.id == id)
    }

    fn regenerate_layouts(&mut self) {
        self.layouts = Layouts::generate(self.questions.iter().map(|q| q.id.as_str()));
        for q in &mut self.questions {
            q.layout = self.layouts.find(&q.id).cloned();
        }
    }
}
