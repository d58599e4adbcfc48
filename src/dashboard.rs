//! TA dashboard state: the live queue, the selected question and resolve
//! bookkeeping, plus the colours and text used to show them.

use serde::Deserialize;
use serde_json::Value;

use crate::QueueSocket;
use crate::client::{ClientError, OfficeHoursClient};
use crate::models::{QueueItem, QueueStatus, ResolveAck, ServerMessage};

/// Tags shown per queue row.
pub const VISIBLE_TAGS: usize = 3;

/// Colour for an estimated session length.
pub fn difficulty_color(minutes: u32) -> &'static str {
    match minutes {
        0..=10 => "#4ade80",
        11..=20 => "#fbbf24",
        _ => "#f87171",
    }
}

/// Badge text and colour for a queue status.
pub fn status_badge(status: QueueStatus) -> (&'static str, &'static str) {
    match status {
        QueueStatus::InProgress => ("In Progress", "#f59e0b"),
        QueueStatus::Done => ("Done", "#10b981"),
        QueueStatus::Queued | QueueStatus::Unknown => ("Queued", "#3b82f6"),
    }
}

/// Mirror of the backend queue for a TA.
///
/// The queue is only ever replaced wholesale: by the initial fetch or by a
/// `queue_update` push. Nothing is merged locally.
#[derive(Debug, Default)]
pub struct TaDashboard {
    queue: Vec<QueueItem>,
    selected: Option<i64>,
    resolving: Option<i64>,
    live: bool,
}

impl TaDashboard {
    pub fn queue(&self) -> &[QueueItem] {
        &self.queue
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn connection_label(&self) -> &'static str {
        if self.live { "Live" } else { "Connecting..." }
    }

    /// Initial snapshot over REST. Failures are logged only.
    pub async fn load(&mut self, client: &OfficeHoursClient) {
        match client.queue().await {
            Ok(queue) => self.queue = queue,
            Err(e) => tracing::error!(error = %e, "Failed to fetch queue"),
        }
    }

    /// Apply a raw socket message. Returns `true` when the queue was replaced.
    pub fn apply_message(&mut self, message: &Value) -> bool {
        self.live = true;
        match ServerMessage::deserialize(message) {
            Ok(ServerMessage::QueueUpdate { queue }) => {
                tracing::debug!(len = queue.len(), "queue update");
                self.queue = queue;
                true
            }
            Ok(ServerMessage::Other) => false,
            Err(e) => {
                tracing::warn!(error = %e, "unrecognised queue message");
                false
            }
        }
    }

    /// Wait for the next socket message and apply it. Returns `false` once the
    /// socket has closed.
    pub async fn follow(&mut self, socket: &mut QueueSocket) -> bool {
        match socket.next_message().await {
            Some(message) => {
                self.apply_message(&message);
                true
            }
            None => false,
        }
    }

    pub fn select(&mut self, queue_id: i64) {
        self.selected = Some(queue_id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&QueueItem> {
        let id = self.selected?;
        self.queue.iter().find(|item| item.queue_id == id)
    }

    pub fn is_resolving(&self, queue_id: i64) -> bool {
        self.resolving == Some(queue_id)
    }

    pub fn can_resolve(&self, item: &QueueItem) -> bool {
        !self.is_resolving(item.queue_id) && item.status != QueueStatus::Done
    }

    /// Mark `queue_id` as being resolved. Returns `false` if a resolve for
    /// it is already in flight, in which case the caller should not post.
    pub fn begin_resolve(&mut self, queue_id: i64) -> bool {
        if self.is_resolving(queue_id) {
            return false;
        }
        self.resolving = Some(queue_id);
        true
    }

    /// Record the outcome of a resolve started with [`begin_resolve`].
    ///
    /// The queue itself is left alone; the backend pushes the new state.
    /// Failures are logged only.
    ///
    /// [`begin_resolve`]: TaDashboard::begin_resolve
    pub fn finish_resolve(&mut self, queue_id: i64, outcome: Result<ResolveAck, ClientError>) -> bool {
        if self.is_resolving(queue_id) {
            self.resolving = None;
        }
        match outcome {
            Ok(_) => {
                if self.selected == Some(queue_id) {
                    self.selected = None;
                }
                true
            }
            Err(e) => {
                tracing::error!(queue_id, error = %e, "Error resolving question");
                false
            }
        }
    }

    /// [`begin_resolve`], the POST, then [`finish_resolve`].
    ///
    /// [`begin_resolve`]: TaDashboard::begin_resolve
    /// [`finish_resolve`]: TaDashboard::finish_resolve
    pub async fn resolve(&mut self, client: &OfficeHoursClient, queue_id: i64) -> bool {
        if !self.begin_resolve(queue_id) {
            return false;
        }
        let outcome = client.resolve(queue_id).await;
        self.finish_resolve(queue_id, outcome)
    }
}

/// One-line summary of a queue row.
pub fn render_row(item: &QueueItem) -> String {
    let (badge, _) = status_badge(item.status);
    let tags: Vec<&str> = item
        .tags
        .iter()
        .take(VISIBLE_TAGS)
        .map(String::as_str)
        .collect();
    format!(
        "#{} {} [{}] {} | {} | {} | ~{} min | {}",
        item.queue_id,
        item.student_name,
        item.course,
        badge,
        item.category,
        item.assigned_ta_name,
        item.estimated_time_minutes,
        tags.join(", ")
    )
}

/// Detail panel for a selected question.
pub fn render_detail(item: &QueueItem) -> Vec<String> {
    let mut lines = vec![
        format!("Name: {}", item.student_name),
        format!("Course: {}", item.course),
        format!("Assigned to: {}", item.assigned_ta_name),
        format!("Question: {}", item.question_text),
    ];
    if let Some(code) = item.code_snippet.as_deref().filter(|c| !c.is_empty()) {
        lines.push(format!("Code Snippet:\n{code}"));
    }
    lines.push(format!("Category: {}", item.category));
    lines.push(format!("Summary: {}", item.brief_summary));
    lines.push(format!("Tags: {}", item.tags.join(", ")));
    lines.push(format!(
        "Estimated Time: {} minutes",
        item.estimated_time_minutes
    ));
    if let Some(hint) = &item.student_friendly_hint {
        lines.push(format!("Student Hint: {hint}"));
    }
    if let Some(outline) = &item.suggested_answer_outline {
        lines.push(format!("Suggested Teaching Approach:\n{outline}"));
    }
    lines
}
