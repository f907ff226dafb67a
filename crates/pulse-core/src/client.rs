//! Dashboard API client: the gamification engine's only window onto server
//! data. Every contract here is read-only; auth is a bearer token supplied by
//! config. Callers at the engine layer swallow [`ClientError`] and keep their
//! last-known-good state (staleness over crashing).

use crate::config::PulseConfig;
use crate::shared::{ActivityDay, ChapterProgress, ProductivitySummary, StudyPlanSnapshot};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("dashboard API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Thin typed wrapper over the dashboard's REST endpoints.
pub struct DashboardClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn from_config(config: &PulseConfig) -> Self {
        Self::new(config.api_base_url.clone(), config.api_token.clone())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(&url);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }
        Ok(res.json().await?)
    }

    /// Today's productive/neutral/distracting minute totals.
    pub async fn fetch_productivity_summary(&self) -> Result<ProductivitySummary, ClientError> {
        self.get_json("/api/productivity/summary").await
    }

    /// All of the user's study plans with chapters and quiz-unlock flags.
    pub async fn fetch_study_plans(&self) -> Result<Vec<StudyPlanSnapshot>, ClientError> {
        self.get_json("/api/study-plans").await
    }

    /// Chapter-level progress for one plan (overall-mastery milestone source).
    pub async fn fetch_chapter_progress(&self, plan_id: i64) -> Result<ChapterProgress, ClientError> {
        self.get_json(&format!("/api/study-plans/{}/progress", plan_id))
            .await
    }

    /// Trailing activity minutes as a date → minutes map for the focus
    /// calendar. Entries with zero minutes or unparseable dates are omitted.
    pub async fn fetch_activity_minutes(
        &self,
        days: u32,
    ) -> Result<HashMap<NaiveDate, u32>, ClientError> {
        let entries: Vec<ActivityDay> = self
            .get_json(&format!("/api/activity/minutes?days={}", days))
            .await?;
        let mut map = HashMap::new();
        for entry in entries {
            if entry.total_active_minutes == 0 {
                continue;
            }
            match NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d") {
                Ok(date) => {
                    map.insert(date, entry.total_active_minutes);
                }
                Err(_) => {
                    tracing::debug!(
                        target: "pulse::client",
                        date = %entry.date,
                        "skipping activity entry with unparseable date"
                    );
                }
            }
        }
        Ok(map)
    }
}
