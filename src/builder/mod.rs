//! Survey builder
//!
//! - [`layout`] -- the 12-column grid and per-breakpoint layouts.
//! - [`factory`] -- question construction with kind defaults.
//! - [`drag`] -- the drag-to-trash state machine.
//! - [`canvas`] -- [`SurveyCanvas`], questions and layouts kept in lockstep.

pub mod canvas;
pub mod drag;
pub mod factory;
pub mod layout;

pub use canvas::SurveyCanvas;
pub use drag::{DragState, Point, Rect};
pub use factory::{create_question, CreateConfig};
pub use layout::{Breakpoint, LayoutItem, Layouts};
