//! Light/dark theme preference

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyflowError};
use crate::storage::{LocalStore, THEME_KEY};

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = SurveyflowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(SurveyflowError::Config(format!("Unknown theme: {}", other))),
        }
    }
}

/// Persists the theme preference in the [`LocalStore`].
#[derive(Debug, Clone)]
pub struct ThemeStore {
    store: Arc<LocalStore>,
}

impl ThemeStore {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Stored preference, or [`Theme::Dark`] when nothing valid is stored.
    pub fn load(&self) -> Result<Theme> {
        let stored = self.store.get_item(THEME_KEY)?;
        Ok(stored
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default())
    }

    pub fn set(&self, theme: Theme) -> Result<()> {
        self.store.set_item(THEME_KEY, theme.as_str())
    }

    /// Flips and persists the preference, returning the new theme.
    pub fn toggle(&self) -> Result<Theme> {
        let next = self.load()?.toggled();
        self.set(next)?;
        tracing::debug!(theme = %next, "Theme preference changed");
        Ok(next)
    }
}
