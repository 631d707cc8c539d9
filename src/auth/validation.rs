//! Client-side credential validation
//!
//! Every rule here runs before any network call. A form that fails
//! validation never reaches the backend.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, SurveyflowError};

/// Which auth form is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Existing account; only shape checks apply.
    Login,
    /// New account; password complexity and confirmation apply.
    Register,
}

/// Raw field values of the login/register form.
#[derive(Debug, Clone)]
pub struct CredentialsForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    /// Repeat-password field. Only read in [`AuthMode::Register`].
    pub confirmation: Option<String>,
}

impl CredentialsForm {
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::Login,
            email: email.into(),
            password: password.into(),
            confirmation: None,
        }
    }

    pub fn register(
        email: impl Into<String>,
        password: impl Into<String>,
        confirmation: impl Into<String>,
    ) -> Self {
        Self {
            mode: AuthMode::Register,
            email: email.into(),
            password: password.into(),
            confirmation: Some(confirmation.into()),
        }
    }

    /// Collects every rule violation for this form.
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if let Some(msg) = email_violation(&self.email) {
            violations.push(msg);
        }

        match self.mode {
            AuthMode::Login => {
                if self.password.is_empty() {
                    violations.push("Password is required".to_string());
                }
            }
            AuthMode::Register => {
                violations.extend(password_violations(&self.password));
                if self.confirmation.as_deref() != Some(self.password.as_str()) {
                    violations.push("Passwords do not match".to_string());
                }
            }
        }

        violations
    }

    /// Fails with [`SurveyflowError::ValidationFailed`] if any rule is
    /// violated.
    pub fn validate(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SurveyflowError::ValidationFailed(violations).into())
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

/// Returns a message if `email` is not shaped like `local@domain.tld`.
pub fn email_violation(email: &str) -> Option<String> {
    if email_regex().is_match(email.trim()) {
        None
    } else {
        Some("Please enter a valid email address".to_string())
    }
}

/// Password complexity rules for registration, one message per failed rule.
///
/// # Examples
///
/// ```
/// use surveyflow::auth::validation::password_violations;
///
/// assert!(password_violations("Password123!").is_empty());
///
/// let problems = password_violations("abc");
/// assert!(problems.iter().any(|p| p.contains("at least 8 characters")));
/// assert!(problems.iter().any(|p| p.contains("uppercase letter")));
/// ```
pub fn password_violations(password: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if password.chars().count() < 8 {
        violations.push("Password must be at least 8 characters".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        violations.push("Password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        violations.push("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Password must contain a number".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        violations.push("Password must contain a special character".to_string());
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_reports_length_and_uppercase() {
        let v = password_violations("abc");
        assert!(v.len() >= 2);
        assert!(v.iter().any(|m| m.contains("at least 8 characters")));
        assert!(v.iter().any(|m| m.contains("uppercase letter")));
    }

    #[test]
    fn test_strong_password_has_no_violations() {
        assert!(password_violations("Password123!").is_empty());
    }

    #[test]
    fn test_missing_special_character() {
        let v = password_violations("Password123");
        assert_eq!(v, vec!["Password must contain a special character".to_string()]);
    }

    #[test]
    fn test_email_shapes() {
        assert!(email_violation("user@example.com").is_none());
        assert!(email_violation("  user@example.com ").is_none());
        assert!(email_violation("user@example").is_some());
        assert!(email_violation("user example.com").is_some());
        assert!(email_violation("").is_some());
    }

    #[test]
    fn test_register_mismatch_blocks() {
        let form = CredentialsForm::register("user@example.com", "Password123!", "Password123?");
        let v = form.violations();
        assert_eq!(v, vec!["Passwords do not match".to_string()]);
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_register_without_confirmation_blocks() {
        let mut form = CredentialsForm::register("user@example.com", "Password123!", "");
        form.confirmation = None;
        assert!(form
            .violations()
            .contains(&"Passwords do not match".to_string()));
    }

    #[test]
    fn test_login_skips_complexity_rules() {
        let form = CredentialsForm::login("user@example.com", "abc");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_login_requires_password() {
        let form = CredentialsForm::login("user@example.com", "");
        let err = form.validate().unwrap_err();
        match err.downcast_ref::<SurveyflowError>() {
            Some(SurveyflowError::ValidationFailed(v)) => {
                assert_eq!(v, &vec!["Password is required".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
