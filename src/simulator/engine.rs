//! Rules of the office-hours simulation.
//!
//! Nothing here sleeps or spawns; every operation takes the current
//! [`Instant`] from the caller. [`SimulationHandle`](super::SimulationHandle)
//! owns the task that drives them.

use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

use super::log::{EventKind, EventLog, LogEntry};
use super::student::{SimStudent, StudentProfile, StudentStatus, fallback_roster};
use super::{Candidate, SimulationBackend};

pub const EVENT_LOG_CAPACITY: usize = 20;
pub const DECISION_LOG_CAPACITY: usize = 10;
const DANGER_WAIT_MINUTES: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Students TAs can help at once before AI mode kicks in.
    pub ta_capacity: usize,
    /// Capacity once AI routing has had time to take effect.
    pub boosted_capacity: usize,
    pub roster_size: usize,
    /// Chance per tick that an active session finishes.
    pub completion_chance: f64,
    /// Simulated minutes per real minute.
    pub time_scale: f64,
    pub tick_interval: Duration,
    pub arrival_interval: Duration,
    pub boost_delay: Duration,
    pub comparison_delay: Duration,
    /// Waiting students offered to the remote selector.
    pub selection_window: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ta_capacity: 3,
            boosted_capacity: 5,
            roster_size: 30,
            completion_chance: 0.1,
            time_scale: 1.0,
            tick_interval: Duration::from_secs(1),
            arrival_interval: Duration::from_millis(500),
            boost_delay: Duration::from_secs(2),
            comparison_delay: Duration::from_secs(5),
            selection_window: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimStats {
    pub total_wait_minutes: f64,
    pub students_helped: u32,
    pub students_left: u32,
}

/// Figures derived from the current students.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimMetrics {
    pub avg_wait_minutes: f64,
    pub queue_size: usize,
    pub active: usize,
    pub helped: usize,
    pub left: usize,
    /// 0..=10, one point per three waiting students.
    pub ta_stress: u32,
    /// Percent of finished students that were helped rather than gave up.
    pub satisfaction: u32,
    pub danger: bool,
    pub impatient: Vec<u32>,
}

/// Average wait before and after AI mode was switched on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub before_minutes: f64,
    pub after_minutes: f64,
    pub improvement_percent: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SimSnapshot {
    pub running: bool,
    pub ai_enabled: bool,
    pub ta_capacity: usize,
    pub roster_remaining: usize,
    pub stats: SimStats,
    pub metrics: SimMetrics,
    pub students: Vec<SimStudent>,
    pub events: Vec<LogEntry>,
    pub decisions: Vec<LogEntry>,
    pub comparison: Option<Comparison>,
}

/// State and rules of one simulated office-hours session.
#[derive(Debug)]
pub struct Simulator {
    config: SimConfig,
    /// Students that have arrived, in arrival order.
    students: Vec<SimStudent>,
    roster: VecDeque<SimStudent>,
    next_id: u32,
    ai_enabled: bool,
    running: bool,
    ta_capacity: usize,
    baseline_wait: f64,
    stats: SimStats,
    events: EventLog,
    decisions: EventLog,
    comparison: Option<Comparison>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Simulator {
    pub fn new(mut config: SimConfig) -> Self {
        config.completion_chance = config.completion_chance.clamp(0.0, 1.0);
        let ta_capacity = config.ta_capacity;
        Self {
            config,
            students: Vec::new(),
            roster: VecDeque::new(),
            next_id: 0,
            ai_enabled: false,
            running: false,
            ta_capacity,
            baseline_wait: 0.0,
            stats: SimStats::default(),
            events: EventLog::new(EVENT_LOG_CAPACITY),
            decisions: EventLog::new(DECISION_LOG_CAPACITY),
            comparison: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    pub fn ta_capacity(&self) -> usize {
        self.ta_capacity
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn students(&self) -> &[SimStudent] {
        &self.students
    }

    pub fn student(&self, id: u32) -> Option<&SimStudent> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn decisions(&self) -> &EventLog {
        &self.decisions
    }

    pub fn comparison(&self) -> Option<Comparison> {
        self.comparison
    }

    pub fn roster_remaining(&self) -> usize {
        self.roster.len()
    }

    pub fn count(&self, status: StudentStatus) -> usize {
        self.students.iter().filter(|s| s.status == status).count()
    }

    fn ids_with(&self, status: StudentStatus) -> Vec<u32> {
        self.students
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.id)
            .collect()
    }

    pub fn start(&mut self) {
        self.running = true;
        self.events
            .push(EventKind::Critical, "MIDTERM WEEK CHAOS INITIATED");
    }

    /// Replace the roster of students still to arrive.
    pub fn load_roster(&mut self, profiles: Vec<StudentProfile>, now: Instant) {
        let first = self.next_id;
        self.next_id += profiles.len() as u32;
        self.roster = profiles
            .into_iter()
            .zip(first..)
            .map(|(profile, id)| SimStudent::new(id, profile, now))
            .collect();
    }

    /// Ask `backend` for a roster, falling back to a locally generated one.
    pub async fn prepare_roster<R: Rng + Send>(
        &mut self,
        backend: &dyn SimulationBackend,
        rng: &mut R,
        now: Instant,
    ) {
        self.events
            .push(EventKind::Warning, "Claude generating student scenarios...");
        match backend.generate_students(self.config.roster_size).await {
            Ok(profiles) if !profiles.is_empty() => {
                let n = profiles.len();
                self.load_roster(profiles, now);
                self.events.push(
                    EventKind::Success,
                    format!("Claude generated {n} student scenarios"),
                );
            }
            outcome => {
                if let Err(e) = outcome {
                    warn!(error = %e, "student generation failed");
                }
                self.events
                    .push(EventKind::Warning, "Using fallback student generation");
                let profiles = fallback_roster(rng, self.config.roster_size);
                self.load_roster(profiles, now);
            }
        }
    }

    /// Move the next roster student into the waiting queue.
    pub fn admit_arrival(&mut self, now: Instant) -> Option<u32> {
        let mut student = self.roster.pop_front()?;
        student.status = StudentStatus::Waiting;
        student.arrival = now;
        student.wait_minutes = 0.0;
        let id = student.id;
        self.events.push(
            EventKind::Warning,
            format!(
                "{} student joined queue: \"{}\"",
                student.course(),
                student.question()
            ),
        );
        self.students.push(student);
        Some(id)
    }

    /// Recompute waits; without AI mode, students past their patience leave.
    pub fn refresh_waits(&mut self, now: Instant) {
        let scale = self.config.time_scale;
        let mut gave_up = Vec::new();
        for s in self
            .students
            .iter_mut()
            .filter(|s| s.status == StudentStatus::Waiting)
        {
            s.wait_minutes = now.saturating_duration_since(s.arrival).as_secs_f64() / 60.0 * scale;
            if !self.ai_enabled && s.has_given_up() {
                gave_up.push(s.id);
            }
        }
        for id in gave_up {
            self.leave(id);
        }
    }

    fn leave(&mut self, id: u32) {
        let Some(s) = self.students.iter_mut().find(|s| s.id == id) else {
            return;
        };
        s.status = StudentStatus::Left;
        let waited = s.wait_minutes;
        self.stats.students_left += 1;
        self.events.push(
            EventKind::Critical,
            format!("Student #{id} gave up after {} min", waited.round()),
        );
    }

    /// Hand a waiting student to a TA. Refused when every TA slot is taken.
    pub fn assign(&mut self, id: u32) -> bool {
        if self.count(StudentStatus::Active) >= self.ta_capacity {
            return false;
        }
        let Some(s) = self
            .students
            .iter_mut()
            .find(|s| s.id == id && s.status == StudentStatus::Waiting)
        else {
            return false;
        };
        s.status = StudentStatus::Active;
        let message = format!("{} student #{id} now with TA", s.course());
        self.events.push(EventKind::Success, message);
        true
    }

    /// Finish an active session.
    pub fn complete(&mut self, id: u32) -> bool {
        let Some(s) = self
            .students
            .iter_mut()
            .find(|s| s.id == id && s.status == StudentStatus::Active)
        else {
            return false;
        };
        s.status = StudentStatus::Helped;
        let waited = s.wait_minutes;
        let message = format!("{} student #{id} helped successfully!", s.course());
        self.stats.students_helped += 1;
        self.stats.total_wait_minutes += waited;
        self.events.push(EventKind::Success, message);
        true
    }

    /// The first waiting students, as offered to the remote selector.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.students
            .iter()
            .filter(|s| s.status == StudentStatus::Waiting)
            .take(self.config.selection_window)
            .map(|s| Candidate {
                id: s.id,
                course: s.profile.course.clone(),
                wait_time: s.wait_minutes.round() as u64,
                complexity: s.profile.complexity,
                patience: s.profile.patience,
                question: s.profile.question.clone(),
            })
            .collect()
    }

    async fn choose_next(&mut self, backend: &dyn SimulationBackend) -> Option<u32> {
        let waiting = self.ids_with(StudentStatus::Waiting);
        let first = *waiting.first()?;
        if !self.ai_enabled {
            return Some(first);
        }
        match backend.select_next(&self.candidates()).await {
            Ok(selection) if waiting.contains(&selection.selected_id) => {
                let id = selection.selected_id;
                let course = self
                    .student(id)
                    .map(|s| s.course().to_owned())
                    .unwrap_or_default();
                self.decisions.push(
                    EventKind::Normal,
                    format!("Selected student #{id}: {course} - {}", selection.reason),
                );
                Some(id)
            }
            Ok(selection) => {
                warn!(selected = selection.selected_id, "selector chose a student who is not waiting");
                Some(first)
            }
            Err(e) => {
                warn!(error = %e, "AI selection error");
                Some(first)
            }
        }
    }

    /// One simulation step at `now`.
    ///
    /// Waits are refreshed first, then at most one waiting student is handed
    /// to a TA if a slot is free, then each session that was already active
    /// when the step began may finish.
    pub async fn tick<R: Rng + Send>(
        &mut self,
        now: Instant,
        backend: &dyn SimulationBackend,
        rng: &mut R,
    ) {
        if !self.running {
            return;
        }
        self.refresh_waits(now);

        let active_at_start = self.ids_with(StudentStatus::Active);
        if active_at_start.len() < self.ta_capacity {
            if let Some(id) = self.choose_next(backend).await {
                self.assign(id);
            }
        }

        for id in active_at_start {
            if rng.gen_bool(self.config.completion_chance) {
                self.complete(id);
            }
        }
    }

    /// Switch to AI routing, remembering the current average wait as the
    /// baseline. Returns `false` if AI mode was already on.
    pub fn activate_ai(&mut self) -> bool {
        if self.ai_enabled {
            return false;
        }
        self.baseline_wait = self.average_wait();
        self.ai_enabled = true;
        self.events
            .push(EventKind::Success, "CLAUDE AI ACTIVATED - Optimizing queue...");
        self.decisions.push(
            EventKind::Normal,
            "AI now intelligently routing students based on wait time, complexity, and patience",
        );
        true
    }

    pub fn boost_capacity(&mut self) {
        self.ta_capacity = self.ta_capacity.max(self.config.boosted_capacity);
        self.decisions.push(
            EventKind::Normal,
            "AI optimization: Increased effective TA capacity through better routing",
        );
    }

    /// Compare the current average wait against the pre-AI baseline.
    pub fn compare(&mut self) -> Comparison {
        let before = self.baseline_wait;
        let after = self.average_wait();
        let improvement_percent = if before > 0.0 {
            ((before - after) / before * 100.0).round().max(0.0) as u32
        } else {
            0
        };
        let comparison = Comparison {
            before_minutes: before,
            after_minutes: after,
            improvement_percent,
        };
        self.comparison = Some(comparison);
        comparison
    }

    pub fn average_wait(&self) -> f64 {
        let (total, n) = self
            .students
            .iter()
            .filter(|s| s.status == StudentStatus::Waiting)
            .fold((0.0, 0usize), |(t, n), s| (t + s.wait_minutes, n + 1));
        if n == 0 { 0.0 } else { total / n as f64 }
    }

    pub fn metrics(&self) -> SimMetrics {
        let avg_wait_minutes = self.average_wait();
        let queue_size = self.count(StudentStatus::Waiting);
        let helped = self.count(StudentStatus::Helped);
        let left = self.count(StudentStatus::Left);
        let finished = helped + left;
        let satisfaction = if finished > 0 {
            (helped as f64 / finished as f64 * 100.0).round() as u32
        } else {
            100
        };
        SimMetrics {
            avg_wait_minutes,
            queue_size,
            active: self.count(StudentStatus::Active),
            helped,
            left,
            ta_stress: ((queue_size as f64 / 3.0).round() as u32).min(10),
            satisfaction,
            danger: avg_wait_minutes > DANGER_WAIT_MINUTES && !self.ai_enabled,
            impatient: self
                .students
                .iter()
                .filter(|s| s.is_impatient())
                .map(|s| s.id)
                .collect(),
        }
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            running: self.running,
            ai_enabled: self.ai_enabled,
            ta_capacity: self.ta_capacity,
            roster_remaining: self.roster.len(),
            stats: self.stats.clone(),
            metrics: self.metrics(),
            students: self.students.clone(),
            events: self.events.iter().cloned().collect(),
            decisions: self.decisions.iter().cloned().collect(),
            comparison: self.comparison,
        }
    }

    /// Back to a stopped, empty session with the original capacity.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
        self.events.push(EventKind::Normal, "System reset");
    }

    pub(crate) fn log(&mut self, kind: EventKind, message: impl Into<String>) {
        self.events.push(kind, message);
    }
}
