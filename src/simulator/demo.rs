use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::info;

use super::engine::{SimSnapshot, Simulator};
use super::runner::SimulationHandle;
use super::SimulationBackend;

const REPORT_EVERY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoStep {
    Starting,
    BuildingUp,
    ActivatingAi,
    Optimizing,
    Complete,
}

impl DemoStep {
    pub fn label(self) -> &'static str {
        match self {
            DemoStep::Starting => "Starting midterm chaos...",
            DemoStep::BuildingUp => "Queue building up...",
            DemoStep::ActivatingAi => "Activating Claude AI...",
            DemoStep::Optimizing => "AI optimizing queue...",
            DemoStep::Complete => "Demo complete!",
        }
    }

    /// How long the demo stays on this step.
    pub fn hold(self) -> Duration {
        match self {
            DemoStep::Starting => Duration::from_secs(3),
            DemoStep::BuildingUp => Duration::from_secs(10),
            DemoStep::ActivatingAi => Duration::from_secs(5),
            DemoStep::Optimizing => Duration::from_secs(10),
            DemoStep::Complete => Duration::ZERO,
        }
    }
}

async fn hold<F>(handle: &SimulationHandle, step: DemoStep, on_progress: &mut F)
where
    F: FnMut(DemoStep, &SimSnapshot),
{
    info!(step = step.label(), "demo step");
    let end = Instant::now() + step.hold();
    loop {
        on_progress(step, &handle.snapshot());
        let now = Instant::now();
        if now >= end {
            break;
        }
        sleep(REPORT_EVERY.min(end - now)).await;
    }
}

/// Scripted walk-through: start the chaos, let the queue build, switch on AI
/// routing and let it work. `on_progress` sees the current step and snapshot
/// about once a second. The simulation keeps running in the returned handle.
pub async fn run_auto_demo<F>(
    sim: Simulator,
    backend: Arc<dyn SimulationBackend>,
    rng: StdRng,
    mut on_progress: F,
) -> SimulationHandle
where
    F: FnMut(DemoStep, &SimSnapshot),
{
    let handle = SimulationHandle::spawn(sim, backend, rng);
    hold(&handle, DemoStep::Starting, &mut on_progress).await;
    hold(&handle, DemoStep::BuildingUp, &mut on_progress).await;
    handle.activate_ai();
    hold(&handle, DemoStep::ActivatingAi, &mut on_progress).await;
    hold(&handle, DemoStep::Optimizing, &mut on_progress).await;
    hold(&handle, DemoStep::Complete, &mut on_progress).await;
    handle
}
