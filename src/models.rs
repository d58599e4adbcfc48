//! JSON shapes exchanged with the office-hours backend.
//!
//! These are pass-through types: the backend owns the data and this crate
//! only mirrors what it sends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub expertise_tags: Vec<String>,
    #[serde(default)]
    pub current_queue_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSubmission {
    pub student_name: String,
    pub course: String,
    pub question_text: String,
    pub code_snippet: Option<String>,
    pub preferred_ta_id: Option<i64>,
}

/// What the backend's analysis pipeline made of a submitted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub queue_id: i64,
    pub assigned_ta_name: String,
    pub estimated_wait_minutes: u32,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub brief_summary: String,
    #[serde(default)]
    pub similar_questions: Vec<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    #[default]
    Queued,
    InProgress,
    Done,
    /// Anything the backend adds later; shown like `Queued`.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub queue_id: i64,
    pub student_name: String,
    pub course: String,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub code_snippet: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub estimated_time_minutes: u32,
    #[serde(default)]
    pub assigned_ta_name: String,
    #[serde(default)]
    pub status: QueueStatus,
    #[serde(default)]
    pub brief_summary: String,
    #[serde(default)]
    pub suggested_answer_outline: Option<String>,
    #[serde(default)]
    pub student_friendly_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveAck {
    pub status: String,
    pub queue_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_questions: u64,
    pub resolved_count: u64,
    pub active_queue_count: u64,
    pub estimated_time_saved_minutes: u64,
    pub knowledge_base_size: u64,
}

impl Metrics {
    /// Share of submitted questions that were resolved, as a whole percent.
    ///
    /// ```
    /// use office_hours::models::Metrics;
    /// let m = Metrics { total_questions: 3, resolved_count: 2, ..Metrics::default() };
    /// assert_eq!(m.resolution_rate(), 67);
    /// ```
    pub fn resolution_rate(&self) -> u64 {
        if self.resolved_count == 0 || self.total_questions == 0 {
            return 0;
        }
        (self.resolved_count as f64 / self.total_questions as f64 * 100.0).round() as u64
    }
}

/// Messages pushed over `/ws/queue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    QueueUpdate { queue: Vec<QueueItem> },
    #[serde(other)]
    Other,
}
