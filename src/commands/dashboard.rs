use colored::Colorize;
use prettytable::{format, Table};

use crate::cli::CredentialArgs;
use crate::commands::connect;
use crate::config::Config;
use crate::dashboard::{fetch_dashboard_data, DashboardData, SurveyStatus};
use crate::error::Result;

/// Print response analytics for every survey
pub async fn run_dashboard(config: &Config, credentials: &CredentialArgs, json: bool) -> Result<()> {
    let connection = connect(config, credentials).await?;
    let data = fetch_dashboard_data(&connection.surveys).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        render_dashboard(&data);
    }
    Ok(())
}

fn render_dashboard(data: &DashboardData) {
    let summary = &data.summary;
    println!();
    println!("{}", "Dashboard".bold());
    println!(
        "  Surveys: {}   Active: {}   Responses: {}   Avg completion: {}%",
        summary.total_surveys.to_string().cyan(),
        summary.active_surveys.to_string().green(),
        summary.total_responses.to_string().cyan(),
        summary.avg_completion_rate
    );

    if data.surveys.is_empty() {
        println!("{}", "No surveys found.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Status".bold(),
        "Responses".bold(),
        "Completion".bold(),
        "Last Response".bold()
    ]);

    for survey in &data.surveys {
        let status = match survey.status {
            SurveyStatus::Active => survey.status.to_string().green(),
            SurveyStatus::Draft => survey.status.to_string().yellow(),
        };
        let last = survey
            .trend
            .last()
            .map(|p| p.date.clone())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(prettytable::row![
            survey.survey_id.cyan(),
            survey.title,
            status,
            survey.responses_count,
            format!("{}%", survey.completion_rate),
            last
        ]);
    }

    println!();
    table.printstd();
    println!();
}
