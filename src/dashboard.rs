//! Dashboard aggregation
//!
//! Builds per-survey analytics and an overall summary from the surveys the
//! user can see and their collected responses. Each survey and its
//! responses are fetched concurrently.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::surveys::model::{Survey, SurveyOption, SurveyResponse};
use crate::surveys::service::SurveyService;

/// Where the dashboard reads surveys and responses from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SurveySource: Send + Sync {
    async fn survey_options(&self) -> Result<Vec<SurveyOption>>;
    async fn survey(&self, id: &str) -> Result<Survey>;
    async fn responses(&self, survey_id: &str) -> Result<Vec<SurveyResponse>>;
}

#[async_trait]
impl SurveySource for SurveyService {
    async fn survey_options(&self) -> Result<Vec<SurveyOption>> {
        self.fetch_survey_options().await
    }

    async fn survey(&self, id: &str) -> Result<Survey> {
        self.fetch_survey(id).await
    }

    async fn responses(&self, survey_id: &str) -> Result<Vec<SurveyResponse>> {
        self.fetch_survey_responses(survey_id).await
    }
}

// ---------------------------------------------------------------------------
// Dashboard data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    Active,
    Draft,
}

impl std::fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyStatus::Active => f.write_str("active"),
            SurveyStatus::Draft => f.write_str("draft"),
        }
    }
}

/// Responses received on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub responses: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCount {
    pub option: String,
    pub count: usize,
}

/// Tally of the answers given to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBreakdown {
    pub question_id: String,
    pub question_text: String,
    pub counts: Vec<OptionCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnalytics {
    pub survey_id: String,
    pub title: String,
    pub created_date: String,
    pub status: SurveyStatus,
    pub responses_count: usize,
    /// Percentage, one decimal.
    pub completion_rate: f64,
    pub trend: Vec<TrendPoint>,
    pub question_breakdown: Vec<QuestionBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_surveys: usize,
    pub total_responses: usize,
    pub avg_completion_rate: f64,
    pub active_surveys: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub summary: DashboardSummary,
    pub surveys: Vec<SurveyAnalytics>,
}

/// Fetches every visible survey with its responses and aggregates them.
///
/// # Errors
///
/// Fails if the survey listing, any survey, or any response listing fails.
pub async fn fetch_dashboard_data(source: &dyn SurveySource) -> Result<DashboardData> {
    let options = source.survey_options().await?;
    tracing::debug!(surveys = options.len(), "Building dashboard");

    let today = Utc::now().date_naive();
    let surveys = try_join_all(options.iter().map(|option| async move {
        let (survey, responses) =
            futures::try_join!(source.survey(&option.id), source.responses(&option.id))?;
        Ok::<_, anyhow::Error>(analyze_survey(&survey, &responses, today))
    }))
    .await?;

    Ok(DashboardData {
        summary: summarize(&surveys),
        surveys,
    })
}

/// Analytics for one survey. `today` stands in for missing submission
/// dates and is reported as the created date.
pub fn analyze_survey(
    survey: &Survey,
    responses: &[SurveyResponse],
    today: NaiveDate,
) -> SurveyAnalytics {
    let status = if responses.is_empty() {
        SurveyStatus::Draft
    } else {
        SurveyStatus::Active
    };

    SurveyAnalytics {
        survey_id: survey.id.clone(),
        title: survey.display_title().to_string(),
        created_date: today.format("%Y-%m-%d").to_string(),
        status,
        responses_count: responses.len(),
        completion_rate: completion_rate(responses, survey.questions.len()),
        trend: build_trend(responses, today),
        question_breakdown: question_breakdown(survey, responses),
    }
}

/// Mean of `answers / question_count` over all responses, as a percentage
/// rounded to one decimal.
pub fn completion_rate(responses: &[SurveyResponse], question_count: usize) -> f64 {
    if question_count == 0 || responses.is_empty() {
        return 0.0;
    }
    let sum: f64 = responses
        .iter()
        .map(|r| r.answers.len() as f64 / question_count as f64)
        .sum();
    round1(sum / responses.len() as f64 * 100.0)
}

/// Responses per submission day, oldest first.
pub fn build_trend(responses: &[SurveyResponse], today: NaiveDate) -> Vec<TrendPoint> {
    let mut grouped: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for response in responses {
        let date = response
            .submitted_at
            .map(|at| at.date_naive())
            .unwrap_or(today);
        *grouped.entry(date).or_default() += 1;
    }
    grouped
        .into_iter()
        .map(|(date, responses)| TrendPoint {
            date: date.format("%Y-%m-%d").to_string(),
            responses,
        })
        .collect()
}

/// Per question, how often each answer value was given, in first-seen order.
pub fn question_breakdown(survey: &Survey, responses: &[SurveyResponse]) -> Vec<QuestionBreakdown> {
    survey
        .questions
        .iter()
        .map(|question| {
            let mut counts: Vec<OptionCount> = Vec::new();
            let answers = responses
                .iter()
                .filter_map(|r| r.answers.iter().find(|a| a.question_id == question.id));
            for answer in answers {
                let option = answer.value.to_string();
                match counts.iter_mut().find(|c| c.option == option) {
                    Some(entry) => entry.count += 1,
                    None => counts.push(OptionCount { option, count: 1 }),
                }
            }
            QuestionBreakdown {
                question_id: question.id.clone(),
                question_text: question.question_text.clone(),
                counts,
            }
        })
        .collect()
}

fn summarize(surveys: &[SurveyAnalytics]) -> DashboardSummary {
    let avg_completion_rate = if surveys.is_empty() {
        0.0
    } else {
        round1(surveys.iter().map(|s| s.completion_rate).sum::<f64>() / surveys.len() as f64)
    };

    DashboardSummary {
        total_surveys: surveys.len(),
        total_responses: surveys.iter().map(|s| s.responses_count).sum(),
        avg_completion_rate,
        active_surveys: surveys
            .iter()
            .filter(|s| s.status == SurveyStatus::Active)
            .count(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
