use rand::rngs::StdRng;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tracing::{debug, info};

use super::engine::{SimSnapshot, Simulator};
use super::log::EventKind;
use super::SimulationBackend;
use crate::abort_guard::AbortGuard;

#[derive(Debug)]
enum Command {
    ActivateAi,
}

/// Running simulation.
///
/// The simulation task owns the [`Simulator`]; the handle talks to it over a
/// command channel and reads the latest [`SimSnapshot`] from a watch channel.
/// Dropping the handle aborts the task.
///
/// Stopping is a separate one-shot signal rather than a command, so it also
/// interrupts backend calls that are still in flight: roster generation and
/// AI selection both give way to it.
#[derive(Debug)]
pub struct SimulationHandle {
    commands: mpsc::UnboundedSender<Command>,
    stop: oneshot::Sender<()>,
    snapshots: watch::Receiver<SimSnapshot>,
    task: AbortGuard,
}

impl SimulationHandle {
    /// Start `sim` on the current runtime.
    pub fn spawn(sim: Simulator, backend: Arc<dyn SimulationBackend>, rng: StdRng) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (stop, stop_rx) = oneshot::channel();
        let (tx, snapshots) = watch::channel(sim.snapshot());
        let task = tokio::spawn(drive(sim, backend, rng, rx, stop_rx, tx));
        Self {
            commands,
            stop,
            snapshots,
            task: AbortGuard::new(task),
        }
    }

    /// Switch the simulation to AI routing. Returns `false` once the task
    /// has stopped.
    pub fn activate_ai(&self) -> bool {
        self.commands.send(Command::ActivateAi).is_ok()
    }

    /// Stop ticking and clear the session, returning the final snapshot.
    ///
    /// Returns promptly even while a backend call is pending.
    pub async fn reset(self) -> SimSnapshot {
        let Self {
            commands,
            stop,
            snapshots,
            task,
        } = self;
        drop(commands);
        if stop.send(()).is_ok() {
            task.join().await;
        }
        let last = snapshots.borrow().clone();
        last
    }

    pub fn snapshot(&self) -> SimSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SimSnapshot> {
        self.snapshots.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Run `work` unless the stop signal fires first. A dropped sender counts as
/// a stop.
async fn unless_stopped<T>(
    stop: &mut oneshot::Receiver<()>,
    work: impl Future<Output = T>,
) -> Option<T> {
    tokio::select! {
        biased;
        _ = stop => None,
        out = work => Some(out),
    }
}

async fn drive(
    mut sim: Simulator,
    backend: Arc<dyn SimulationBackend>,
    mut rng: StdRng,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut stop: oneshot::Receiver<()>,
    snapshots: watch::Sender<SimSnapshot>,
) {
    sim.start();
    let roster = sim.prepare_roster(backend.as_ref(), &mut rng, Instant::now());
    if unless_stopped(&mut stop, roster).await.is_some() {
        snapshots.send_replace(sim.snapshot());
        run(&mut sim, backend.as_ref(), &mut rng, &mut commands, &mut stop, &snapshots).await;
    }
    debug!("simulation stopping");
    sim.reset();
    snapshots.send_replace(sim.snapshot());
}

/// Timer loop. Returns when stopped or when the handle goes away.
async fn run(
    sim: &mut Simulator,
    backend: &dyn SimulationBackend,
    rng: &mut StdRng,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    stop: &mut oneshot::Receiver<()>,
    snapshots: &watch::Sender<SimSnapshot>,
) {
    let config = sim.config().clone();
    let start = Instant::now();
    let mut ticks = interval_at(start + config.tick_interval, config.tick_interval);
    let mut arrivals = interval_at(start + config.arrival_interval, config.arrival_interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    arrivals.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut wave_done = false;
    let mut boost_at = None;
    let mut compare_at = None;

    loop {
        tokio::select! {
            biased;
            _ = &mut *stop => return,
            command = commands.recv() => match command {
                Some(Command::ActivateAi) => {
                    if sim.activate_ai() {
                        let now = Instant::now();
                        boost_at = Some(now + config.boost_delay);
                        compare_at = Some(now + config.comparison_delay);
                    }
                }
                None => return,
            },
            _ = ticks.tick() => {
                let step = sim.tick(Instant::now(), backend, &mut *rng);
                if unless_stopped(stop, step).await.is_none() {
                    return;
                }
            }
            _ = arrivals.tick(), if !wave_done => {
                if sim.admit_arrival(Instant::now()).is_none() {
                    wave_done = true;
                    sim.log(EventKind::Success, "Student wave complete");
                }
            }
            _ = wait_for(boost_at) => {
                boost_at = None;
                sim.boost_capacity();
            }
            _ = wait_for(compare_at) => {
                compare_at = None;
                let c = sim.compare();
                info!(
                    before = c.before_minutes,
                    after = c.after_minutes,
                    improvement = c.improvement_percent,
                    "AI comparison ready"
                );
            }
        }
        snapshots.send_replace(sim.snapshot());
    }
}
