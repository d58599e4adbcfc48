use httpmock::prelude::*;
use office_hours::OfficeHoursClient;
use office_hours::simulator::{
    Offline, SimConfig, SimStats, Simulator, StudentProfile, StudentStatus,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;

fn profile(course: &str, patience: u32) -> StudentProfile {
    StudentProfile {
        course: course.into(),
        question: format!("{course} question"),
        complexity: 3,
        patience,
        stress_level: 7,
    }
}

/// A started simulator with `n` students already waiting since `now`.
fn waiting(config: SimConfig, n: usize, patience: u32, now: Instant) -> Simulator {
    let mut sim = Simulator::new(config);
    let courses = ["CS 400", "CS 577"];
    sim.load_roster(
        (0..n).map(|i| profile(courses[i % 2], patience)).collect(),
        now,
    );
    sim.start();
    for _ in 0..n {
        sim.admit_arrival(now);
    }
    sim
}

fn config(ta_capacity: usize, completion_chance: f64) -> SimConfig {
    SimConfig {
        ta_capacity,
        completion_chance,
        ..SimConfig::default()
    }
}

#[tokio::test]
async fn capacity_is_never_exceeded() {
    let start = Instant::now();
    let mut sim = waiting(config(3, 0.3), 12, 10, start);
    let mut rng = StdRng::seed_from_u64(42);
    for second in 1..=60 {
        sim.tick(start + Duration::from_secs(second), &Offline, &mut rng)
            .await;
        assert!(sim.count(StudentStatus::Active) <= sim.ta_capacity());
    }
    assert!(sim.stats().students_helped > 0);
}

#[tokio::test]
async fn assign_refuses_when_every_ta_is_busy() {
    let start = Instant::now();
    let mut sim = waiting(config(2, 0.0), 5, 10, start);
    let mut rng = StdRng::seed_from_u64(1);
    for second in 1..=4 {
        sim.tick(start + Duration::from_secs(second), &Offline, &mut rng)
            .await;
    }
    assert_eq!(sim.count(StudentStatus::Active), 2);
    assert!(!sim.assign(4));
    assert_eq!(sim.student(4).map(|s| s.status), Some(StudentStatus::Waiting));
}

#[tokio::test]
async fn admission_is_first_come_first_served() {
    let start = Instant::now();
    let mut sim = waiting(config(3, 0.0), 5, 10, start);
    let mut rng = StdRng::seed_from_u64(1);
    for second in 1..=3 {
        sim.tick(start + Duration::from_secs(second), &Offline, &mut rng)
            .await;
    }
    let active: Vec<u32> = sim
        .students()
        .iter()
        .filter(|s| s.status == StudentStatus::Active)
        .map(|s| s.id)
        .collect();
    assert_eq!(active, [0, 1, 2]);
}

#[tokio::test]
async fn sessions_finish_no_earlier_than_the_next_tick() {
    let start = Instant::now();
    let mut sim = waiting(config(1, 1.0), 2, 10, start);
    let mut rng = StdRng::seed_from_u64(9);

    sim.tick(start + Duration::from_secs(60), &Offline, &mut rng)
        .await;
    assert_eq!(sim.student(0).map(|s| s.status), Some(StudentStatus::Active));
    assert_eq!(sim.stats().students_helped, 0);

    sim.tick(start + Duration::from_secs(120), &Offline, &mut rng)
        .await;
    assert_eq!(sim.student(0).map(|s| s.status), Some(StudentStatus::Helped));
    // The slot was still taken when this tick looked for someone to admit.
    assert_eq!(sim.student(1).map(|s| s.status), Some(StudentStatus::Waiting));
    assert_eq!(sim.stats().students_helped, 1);
    // Student 0 stopped accumulating wait once a TA took them.
    assert!((sim.stats().total_wait_minutes - 1.0).abs() < 1e-9);

    sim.tick(start + Duration::from_secs(180), &Offline, &mut rng)
        .await;
    assert_eq!(sim.student(1).map(|s| s.status), Some(StudentStatus::Active));
}

#[tokio::test]
async fn impatient_students_leave_without_ai() {
    let start = Instant::now();
    let mut sim = waiting(config(0, 0.0), 3, 1, start);
    let mut rng = StdRng::seed_from_u64(2);

    sim.tick(start + Duration::from_secs(90), &Offline, &mut rng)
        .await;

    assert_eq!(sim.count(StudentStatus::Left), 3);
    assert_eq!(sim.stats().students_left, 3);
    let latest = sim.events().latest().map(|e| e.message.clone());
    assert_eq!(latest.as_deref(), Some("Student #2 gave up after 2 min"));
}

#[tokio::test]
async fn nobody_gives_up_in_ai_mode() {
    let start = Instant::now();
    let mut sim = waiting(config(0, 0.0), 3, 1, start);
    let mut rng = StdRng::seed_from_u64(2);
    assert!(sim.activate_ai());

    sim.tick(start + Duration::from_secs(600), &Offline, &mut rng)
        .await;

    assert_eq!(sim.count(StudentStatus::Waiting), 3);
    assert_eq!(sim.stats().students_left, 0);
}

#[tokio::test]
async fn time_scale_stretches_waits() {
    let start = Instant::now();
    let mut sim = waiting(
        SimConfig {
            ta_capacity: 0,
            time_scale: 10.0,
            ..SimConfig::default()
        },
        1,
        30,
        start,
    );
    sim.refresh_waits(start + Duration::from_secs(6));
    let wait = sim.student(0).map(|s| s.wait_minutes).unwrap_or_default();
    assert!((wait - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn ai_mode_admits_the_backend_choice() {
    let server = MockServer::start_async().await;
    let pick = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/simulate/select-next");
            then.status(200)
                .json_body(json!({"selected_id": 2, "reason": "Longest wait"}));
        })
        .await;
    let backend = OfficeHoursClient::new(server.base_url());

    let start = Instant::now();
    let mut sim = waiting(config(3, 0.0), 4, 10, start);
    sim.activate_ai();
    let mut rng = StdRng::seed_from_u64(3);
    sim.tick(start + Duration::from_secs(1), &backend, &mut rng)
        .await;

    pick.assert_async().await;
    assert_eq!(sim.student(2).map(|s| s.status), Some(StudentStatus::Active));
    assert_eq!(sim.student(0).map(|s| s.status), Some(StudentStatus::Waiting));
    let decision = sim.decisions().latest().map(|e| e.message.clone());
    assert_eq!(
        decision.as_deref(),
        Some("Selected student #2: CS 400 - Longest wait")
    );
}

#[tokio::test]
async fn ai_mode_falls_back_to_fifo() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/simulate/select-next");
            then.status(200)
                .json_body(json!({"selected_id": 99, "reason": "?"}));
        })
        .await;
    let backend = OfficeHoursClient::new(server.base_url());

    let start = Instant::now();
    let mut sim = waiting(config(3, 0.0), 3, 10, start);
    sim.activate_ai();
    let mut rng = StdRng::seed_from_u64(3);
    sim.tick(start + Duration::from_secs(1), &backend, &mut rng)
        .await;
    assert_eq!(sim.student(0).map(|s| s.status), Some(StudentStatus::Active));

    // A failing backend behaves the same way.
    sim.tick(start + Duration::from_secs(2), &Offline, &mut rng)
        .await;
    assert_eq!(sim.student(1).map(|s| s.status), Some(StudentStatus::Active));
}

#[tokio::test]
async fn roster_comes_from_backend_or_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/simulate/generate-students")
                .query_param("count", "30");
            then.status(200).json_body(json!({"students": [
                {"course": "CS 400", "question": "AVL rotations", "complexity": 2, "patience": 6, "stressLevel": 8},
                {"course": "CS 577", "question": "Max flow", "complexity": 5, "patience": 3, "stress_level": 9}
            ]}));
        })
        .await;
    let mut rng = StdRng::seed_from_u64(4);

    let mut remote = Simulator::default();
    remote
        .prepare_roster(&OfficeHoursClient::new(server.base_url()), &mut rng, Instant::now())
        .await;
    assert_eq!(remote.roster_remaining(), 2);
    assert!(
        remote
            .events()
            .iter()
            .any(|e| e.message == "Claude generated 2 student scenarios")
    );

    let mut local = Simulator::default();
    local.prepare_roster(&Offline, &mut rng, Instant::now()).await;
    assert_eq!(local.roster_remaining(), 30);
    assert!(
        local
            .events()
            .iter()
            .any(|e| e.message == "Using fallback student generation")
    );
}

#[tokio::test]
async fn metrics_reflect_the_queue() {
    let start = Instant::now();
    let mut sim = waiting(config(0, 0.0), 7, 40, start);
    sim.refresh_waits(start + Duration::from_secs(31 * 60));

    let m = sim.metrics();
    assert_eq!(m.queue_size, 7);
    assert!((m.avg_wait_minutes - 31.0).abs() < 1e-9);
    assert_eq!(m.ta_stress, 2);
    assert_eq!(m.satisfaction, 100);
    assert!(m.danger);
    assert_eq!(m.impatient.len(), 7);

    sim.activate_ai();
    assert!(!sim.metrics().danger);
}

#[tokio::test]
async fn comparison_measures_the_drop_in_wait() {
    let start = Instant::now();
    let later = start + Duration::from_secs(10 * 60);
    let mut sim = waiting(config(0, 0.0), 2, 30, start);
    sim.refresh_waits(later);
    sim.activate_ai();

    sim.load_roster(vec![profile("CS 400", 30), profile("CS 577", 30)], later);
    sim.admit_arrival(later);
    sim.admit_arrival(later);
    sim.refresh_waits(later);

    let c = sim.compare();
    assert!((c.before_minutes - 10.0).abs() < 1e-9);
    assert!((c.after_minutes - 5.0).abs() < 1e-9);
    assert_eq!(c.improvement_percent, 50);
}

#[tokio::test]
async fn comparison_never_reports_negative_gains() {
    let start = Instant::now();
    let mut fresh = Simulator::default();
    fresh.activate_ai();
    assert_eq!(fresh.compare().improvement_percent, 0);

    let mut sim = waiting(config(0, 0.0), 2, 60, start);
    sim.refresh_waits(start + Duration::from_secs(60));
    sim.activate_ai();
    sim.refresh_waits(start + Duration::from_secs(20 * 60));
    assert_eq!(sim.compare().improvement_percent, 0);
}

#[tokio::test]
async fn reset_zeroes_everything() {
    let start = Instant::now();
    let mut sim = waiting(config(3, 0.5), 8, 2, start);
    let mut rng = StdRng::seed_from_u64(8);
    for second in 1..=10 {
        sim.tick(start + Duration::from_secs(second * 30), &Offline, &mut rng)
            .await;
    }
    sim.activate_ai();
    sim.boost_capacity();
    sim.compare();
    assert_eq!(sim.ta_capacity(), 5);

    sim.reset();

    assert!(!sim.is_running());
    assert!(!sim.ai_enabled());
    assert_eq!(sim.ta_capacity(), 3);
    assert!(sim.students().is_empty());
    assert_eq!(sim.roster_remaining(), 0);
    assert_eq!(sim.stats(), &SimStats::default());
    assert!(sim.comparison().is_none());
    assert!(sim.decisions().is_empty());
    assert_eq!(sim.events().len(), 1);
    assert_eq!(
        sim.events().latest().map(|e| e.message.as_str()),
        Some("System reset")
    );
}
