use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;

use crate::auth::CredentialsForm;
use crate::cli::CredentialArgs;
use crate::commands::{require_credentials, Connection};
use crate::config::Config;
use crate::error::{Result, SurveyflowError};
use crate::storage::LocalStore;

/// Sign in (or register) and report the resulting session
pub async fn run_login(
    config: &Config,
    credentials: &CredentialArgs,
    register: bool,
    confirm: Option<String>,
) -> Result<()> {
    let (email, password) = require_credentials(credentials)?;
    let form = if register {
        CredentialsForm::register(&email, &password, confirm.unwrap_or_default())
    } else {
        CredentialsForm::login(&email, &password)
    };

    let store = Arc::new(LocalStore::open_default(config)?);
    let connection = Connection::new(config, store)?;
    connection.session.submit(&form).await?;

    let session = connection.session.snapshot();
    let verb = if register { "Registered" } else { "Signed in" };
    println!("{} {}", verb.green().bold(), email.cyan());
    if let Some(expires_at) = session.expires_at {
        let remaining = (expires_at - Utc::now()).num_seconds().max(0);
        println!(
            "Access token valid until {} ({}s)",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
            remaining
        );
    }

    Ok(())
}

/// Check credentials against the sign-in rules without any network call
pub fn run_validate(email: &str, password: &str, confirm: Option<&str>) -> Result<()> {
    let form = match confirm {
        Some(confirmation) => CredentialsForm::register(email, password, confirmation),
        None => CredentialsForm::login(email, password),
    };

    let violations = form.violations();
    if violations.is_empty() {
        println!("{}", "Credentials pass all checks.".green());
        return Ok(());
    }

    for violation in &violations {
        println!("  {} {}", "✗".red(), violation);
    }
    Err(SurveyflowError::ValidationFailed(violations).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_good_login() {
        assert!(run_validate("user@example.com", "anything", None).is_ok());
    }

    #[test]
    fn test_validate_reports_register_rules() {
        let err = run_validate("user@example.com", "short", Some("other")).unwrap_err();
        match err.downcast_ref::<SurveyflowError>() {
            Some(SurveyflowError::ValidationFailed(v)) => {
                assert!(v.iter().any(|m| m == "Passwords do not match"));
                assert!(v.iter().any(|m| m.contains("at least 8 characters")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
