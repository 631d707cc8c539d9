use colored::Colorize;
use prettytable::{format, Table};

use crate::cli::{CredentialArgs, SurveyCommand};
use crate::commands::connect;
use crate::config::Config;
use crate::error::Result;
use crate::surveys::{public_survey_url, ComponentProps, Question};

/// Handle survey commands
pub async fn handle_surveys(
    config: &Config,
    credentials: &CredentialArgs,
    command: SurveyCommand,
) -> Result<()> {
    if let SurveyCommand::Link { id } = &command {
        println!("{}", public_survey_url(&config.api.app_url, id));
        return Ok(());
    }

    let connection = connect(config, credentials).await?;
    let service = &connection.surveys;

    match command {
        SurveyCommand::List { json } => {
            let options = service.fetch_survey_options().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&options)?);
                return Ok(());
            }
            if options.is_empty() {
                println!("{}", "No surveys found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row!["ID".bold(), "Survey".bold()]);
            for option in &options {
                table.add_row(prettytable::row![option.id.cyan(), option.label()]);
            }
            println!();
            table.printstd();
            println!();
        }
        SurveyCommand::Show { id, json } => {
            let survey = service.fetch_survey(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&survey)?);
                return Ok(());
            }

            println!();
            println!("{} {}", survey.display_title().bold(), format!("({})", survey.id).dimmed());
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "#".bold(),
                "Question".bold(),
                "Type".bold(),
                "Options".bold()
            ]);
            for (idx, question) in survey.questions.iter().enumerate() {
                table.add_row(prettytable::row![
                    idx + 1,
                    question.question_text,
                    question.kind().to_string().cyan(),
                    describe_options(question)
                ]);
            }
            table.printstd();
            println!(
                "Share: {}",
                public_survey_url(&config.api.app_url, &survey.id).cyan()
            );
            println!();
        }
        SurveyCommand::Responses { id, json } => {
            let responses = service.fetch_survey_responses(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&responses)?);
                return Ok(());
            }
            if responses.is_empty() {
                println!("{}", "No responses yet.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "ID".bold(),
                "Submitted".bold(),
                "Answers".bold()
            ]);
            for response in &responses {
                let submitted = response
                    .submitted_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let answers = response
                    .answers
                    .iter()
                    .map(|a| format!("{}={}", a.question_id, a.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                table.add_row(prettytable::row![response.id.cyan(), submitted, answers]);
            }
            println!();
            table.printstd();
            println!();
        }
        SurveyCommand::Link { .. } => {}
    }

    Ok(())
}

fn describe_options(question: &Question) -> String {
    match &question.props {
        ComponentProps::Checkbox(p) => format!("{} / {}", p.active_label, p.inactive_label),
        ComponentProps::TextInput(p) => p.placeholder.clone(),
        ComponentProps::RadioBar(p) => p
            .buttons
            .iter()
            .map(|b| b.label.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::factory::{create_question, CreateConfig};
    use crate::surveys::QuestionKind;

    #[test]
    fn test_describe_options() {
        let q = create_question(QuestionKind::Checkbox, &CreateConfig::default(), 0);
        assert_eq!(describe_options(&q), "ON / OFF");

        let q = create_question(QuestionKind::RadioBar, &CreateConfig::default(), 0);
        assert_eq!(describe_options(&q), "TextInput, Checkbox, RadioBar");
    }

    #[tokio::test]
    async fn test_link_needs_no_backend() {
        let result = handle_surveys(
            &Config::default(),
            &CredentialArgs::default(),
            SurveyCommand::Link { id: "s1".into() },
        )
        .await;
        assert!(result.is_ok());
    }
}
