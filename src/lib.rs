//! Client side of the Office Hours Oracle: typed access to the office-hours
//! backend, the state behind the student and TA screens, and a standalone
//! queue simulator.

pub mod abort_guard;
pub mod client;
pub mod dashboard;
pub mod metrics;
pub mod models;
pub mod queue_socket;
pub mod simulator;
pub mod student_view;

pub use abort_guard::AbortGuard;
pub use client::{ClientError, DEFAULT_API_BASE, OfficeHoursClient};
pub use dashboard::TaDashboard;
pub use metrics::{MetricsPoller, MetricsState};
pub use queue_socket::QueueSocket;
pub use simulator::{SimConfig, SimulationHandle, Simulator};
pub use student_view::StudentView;
