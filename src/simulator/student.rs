use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    /// On the roster, not yet arrived.
    Pending,
    Waiting,
    Active,
    Helped,
    Left,
}

/// Scenario for one simulated student, as generated by the backend or the
/// local fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub course: String,
    pub question: String,
    pub complexity: u8,
    /// Minutes the student is willing to wait.
    pub patience: u32,
    #[serde(alias = "stress_level", default)]
    pub stress_level: u8,
}

#[derive(Debug, Clone)]
pub struct SimStudent {
    pub id: u32,
    pub profile: StudentProfile,
    pub arrival: Instant,
    pub wait_minutes: f64,
    pub status: StudentStatus,
}

impl SimStudent {
    pub fn new(id: u32, profile: StudentProfile, now: Instant) -> Self {
        Self {
            id,
            profile,
            arrival: now,
            wait_minutes: 0.0,
            status: StudentStatus::Pending,
        }
    }

    pub fn course(&self) -> &str {
        &self.profile.course
    }

    pub fn question(&self) -> &str {
        &self.profile.question
    }

    pub fn patience(&self) -> f64 {
        f64::from(self.profile.patience)
    }

    pub fn has_given_up(&self) -> bool {
        self.wait_minutes > self.patience()
    }

    /// Past 70% of their patience.
    pub fn is_impatient(&self) -> bool {
        self.status == StudentStatus::Waiting && self.wait_minutes > self.patience() * 0.7
    }

    pub fn tooltip(&self) -> String {
        format!(
            "{}: {}\nComplexity: {}/5\nPatience: {}/10",
            self.profile.course, self.profile.question, self.profile.complexity, self.profile.patience
        )
    }
}

const CS400_QUESTIONS: [&str; 5] = [
    "BST deletion help needed",
    "Hash table collision resolution",
    "Recursion stack overflow issue",
    "Linked list reversal confused",
    "Red-Black tree balancing",
];

const CS577_QUESTIONS: [&str; 5] = [
    "Dynamic programming matrix chain",
    "Dijkstra shortest path stuck",
    "NP-completeness reduction proof",
    "Bellman-Ford negative cycles",
    "Greedy algorithm correctness proof",
];

/// Midterm-week roster used when the backend cannot generate one.
pub fn fallback_roster<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<StudentProfile> {
    (0..count)
        .map(|_| {
            let (course, bank) = if rng.gen_bool(0.5) {
                ("CS400", &CS400_QUESTIONS)
            } else {
                ("CS577", &CS577_QUESTIONS)
            };
            let question = bank.choose(rng).copied().unwrap_or(bank[0]);
            StudentProfile {
                course: course.into(),
                question: question.into(),
                complexity: rng.gen_range(1..=5),
                patience: rng.gen_range(1..=10),
                stress_level: rng.gen_range(6..=10),
            }
        })
        .collect()
}
