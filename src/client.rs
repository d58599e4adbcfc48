//! REST access to the office-hours backend.
//!
//! Every endpoint maps to one method on [`OfficeHoursClient`]. A non-2xx
//! answer becomes [`ClientError::Status`], carrying the message the UI shows
//! for that call. Nothing is retried.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{Metrics, QueueItem, QuestionResponse, QuestionSubmission, ResolveAck, TaInfo};
use crate::simulator::{Candidate, Selection, SimulationBackend, StudentProfile};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// Non-2xx answer; `context` is the user-facing description.
    #[error("{context}")]
    Status {
        context: &'static str,
        status: StatusCode,
    },
    #[error("No students returned from API")]
    EmptyRoster,
    #[error("backend unavailable")]
    Unavailable,
}

#[derive(Deserialize)]
struct Roster {
    #[serde(default)]
    students: Vec<StudentProfile>,
}

/// REST client for the office-hours backend.
#[derive(Clone, Debug)]
pub struct OfficeHoursClient {
    http: reqwest::Client,
    api_base: String,
}

impl Default for OfficeHoursClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl OfficeHoursClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Queue WebSocket URL derived from the REST base.
    ///
    /// ```
    /// use office_hours::OfficeHoursClient;
    /// let client = OfficeHoursClient::new("http://localhost:8000");
    /// assert_eq!(client.ws_url(), "ws://localhost:8000/ws/queue");
    /// ```
    pub fn ws_url(&self) -> String {
        format!("{}/ws/queue", self.api_base.replacen("http", "ws", 1))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn read<T: DeserializeOwned>(
        resp: reqwest::Response,
        context: &'static str,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            warn!(%status, context, "backend request failed");
            return Err(ClientError::Status { context, status });
        }
        Ok(resp.json().await?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        context: &'static str,
    ) -> Result<T, ClientError> {
        debug!(path, "GET");
        let resp = self.http.get(self.url(path)).send().await?;
        Self::read(resp, context).await
    }

    pub async fn tas(&self) -> Result<Vec<TaInfo>, ClientError> {
        self.get("/api/tas", "Failed to fetch TAs").await
    }

    pub async fn queue(&self) -> Result<Vec<QueueItem>, ClientError> {
        self.get("/api/queue", "Failed to fetch queue").await
    }

    pub async fn metrics(&self) -> Result<Metrics, ClientError> {
        self.get("/api/metrics", "Failed to fetch metrics").await
    }

    pub async fn submit_question(
        &self,
        submission: &QuestionSubmission,
    ) -> Result<QuestionResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/questions"))
            .json(submission)
            .send()
            .await?;
        Self::read(resp, "Failed to submit question").await
    }

    pub async fn resolve(&self, queue_id: i64) -> Result<ResolveAck, ClientError> {
        let path = format!("/api/queue/{queue_id}/resolve");
        let resp = self.http.post(self.url(&path)).send().await?;
        Self::read(resp, "Failed to resolve question").await
    }
}

#[async_trait]
impl SimulationBackend for OfficeHoursClient {
    async fn generate_students(&self, count: usize) -> Result<Vec<StudentProfile>, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/simulate/generate-students"))
            .query(&[("count", count)])
            .send()
            .await?;
        let roster: Roster = Self::read(resp, "Failed to generate students").await?;
        if roster.students.is_empty() {
            return Err(ClientError::EmptyRoster);
        }
        Ok(roster.students)
    }

    async fn select_next(&self, candidates: &[Candidate]) -> Result<Selection, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/simulate/select-next"))
            .json(candidates)
            .send()
            .await?;
        Self::read(resp, "Failed to select next student").await
    }
}
