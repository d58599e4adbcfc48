use std::time::Duration;
use tokio::sync::watch;

use crate::AbortGuard;
use crate::client::OfficeHoursClient;
use crate::models::Metrics;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Latest metrics as seen by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MetricsState {
    #[default]
    Loading,
    Failed,
    Ready(Metrics),
}

impl MetricsState {
    pub fn metrics(&self) -> Option<&Metrics> {
        match self {
            MetricsState::Ready(m) => Some(m),
            _ => None,
        }
    }
}

/// Fetch once, folding the outcome into `state`. A failed refresh keeps the
/// previous metrics if there were any.
pub async fn refresh(client: &OfficeHoursClient, state: &MetricsState) -> MetricsState {
    match client.metrics().await {
        Ok(m) => MetricsState::Ready(m),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch metrics");
            match state {
                MetricsState::Ready(_) => state.clone(),
                _ => MetricsState::Failed,
            }
        }
    }
}

/// Background refresh of `/api/metrics`, immediately and then on a fixed
/// period, for as long as the poller is alive.
pub struct MetricsPoller {
    state: watch::Receiver<MetricsState>,
    _task: AbortGuard,
}

impl MetricsPoller {
    pub fn spawn(client: OfficeHoursClient, period: Duration) -> Self {
        let (tx, rx) = watch::channel(MetricsState::Loading);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let previous = tx.borrow().clone();
                let next = refresh(&client, &previous).await;
                tx.send_replace(next);
            }
        });
        Self {
            state: rx,
            _task: AbortGuard::new(task),
        }
    }

    pub fn current(&self) -> MetricsState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MetricsState> {
        self.state.clone()
    }
}

pub fn render(metrics: &Metrics) -> Vec<String> {
    vec![
        format!("Total Questions: {}", metrics.total_questions),
        format!("Active Queue: {}", metrics.active_queue_count),
        format!("Resolved: {}", metrics.resolved_count),
        format!("Time Saved: {} min", metrics.estimated_time_saved_minutes),
        format!("Knowledge Base: {}", metrics.knowledge_base_size),
        format!("Resolution Rate: {}%", metrics.resolution_rate()),
    ]
}
