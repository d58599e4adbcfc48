//! Office-hours queue simulation.
//!
//! [`Simulator`] holds the state and the per-tick rules; it never sleeps and
//! takes the current instant as an argument. [`SimulationHandle`] owns the
//! task that drives it on timers, and [`run_auto_demo`] scripts a full demo.

mod demo;
mod engine;
mod log;
mod runner;
mod student;

pub use demo::{DemoStep, run_auto_demo};
pub use engine::{Comparison, SimConfig, SimMetrics, SimSnapshot, SimStats, Simulator};
pub use log::{EventKind, EventLog, LogEntry};
pub use runner::SimulationHandle;
pub use student::{SimStudent, StudentProfile, StudentStatus, fallback_roster};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::ClientError;

/// A waiting student as described to the remote selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: u32,
    pub course: String,
    /// Whole minutes waited so far.
    pub wait_time: u64,
    pub complexity: u8,
    pub patience: u32,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub selected_id: u32,
    #[serde(default)]
    pub reason: String,
}

/// Remote services the simulation can lean on: roster generation and
/// AI-mode student selection.
#[async_trait]
pub trait SimulationBackend: Send + Sync {
    async fn generate_students(&self, count: usize) -> Result<Vec<StudentProfile>, ClientError>;
    async fn select_next(&self, candidates: &[Candidate]) -> Result<Selection, ClientError>;
}

/// Backend for running without a server: every call fails, so the simulation
/// uses its local roster and FIFO selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

#[async_trait]
impl SimulationBackend for Offline {
    async fn generate_students(&self, _count: usize) -> Result<Vec<StudentProfile>, ClientError> {
        Err(ClientError::Unavailable)
    }

    async fn select_next(&self, _candidates: &[Candidate]) -> Result<Selection, ClientError> {
        Err(ClientError::Unavailable)
    }
}
