use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use office_hours::dashboard::{self, TaDashboard};
use office_hours::metrics::{self, MetricsPoller, MetricsState, REFRESH_INTERVAL};
use office_hours::simulator::{
    DemoStep, Offline, SimConfig, SimSnapshot, SimulationBackend, SimulationHandle, Simulator,
    run_auto_demo,
};
use office_hours::student_view::{self, Field, StudentView};
use office_hours::{DEFAULT_API_BASE, OfficeHoursClient, QueueSocket};
use oracle_common::{LogLevel, logger, shutdown_signal};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

/// `oracle`: terminal front-end for the Office Hours Oracle.
#[derive(Parser, Debug)]
#[command(name = "oracle", version)]
struct Cli {
    /// Base URL of the office-hours backend
    #[arg(long, global = true, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Logging verbosity when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List teaching assistants
    Tas,
    /// Print the current queue
    Queue {
        /// Also show the full details of this question
        #[arg(long)]
        detail: Option<i64>,
    },
    /// Submit a question
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = student_view::DEFAULT_COURSE)]
        course: String,
        #[arg(long)]
        question: String,
        #[arg(long, default_value = "")]
        code: String,
        /// Preferred TA id
        #[arg(long, default_value = "")]
        ta: String,
    },
    /// Mark a queued question as resolved
    Resolve { queue_id: i64 },
    /// Show backend metrics
    Metrics {
        /// Keep refreshing until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Follow the live queue over the WebSocket
    Watch,
    /// Run the midterm-week queue simulation
    Simulate {
        /// Skip the backend and use the local roster and FIFO selection
        #[arg(long)]
        offline: bool,
        /// Run the scripted demo instead of a free run
        #[arg(long)]
        auto_demo: bool,
        #[arg(long, default_value_t = 3)]
        capacity: usize,
        /// Simulated minutes per real minute
        #[arg(long, default_value_t = 1.0)]
        time_scale: f64,
        /// Switch on AI routing after this many seconds
        #[arg(long)]
        ai_after: Option<u64>,
        /// Stop after this many seconds
        #[arg(long, default_value_t = 60)]
        duration: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.log_level);
    let client = OfficeHoursClient::new(cli.api_base);

    match cli.command {
        Command::Tas => {
            for ta in client.tas().await? {
                println!(
                    "#{} {} [{}] queue: {}",
                    ta.id,
                    ta.name,
                    ta.expertise_tags.join(", "),
                    ta.current_queue_count
                );
            }
        }
        Command::Queue { detail } => {
            let mut board = TaDashboard::default();
            board.load(&client).await;
            print_queue(&board);
            if let Some(queue_id) = detail {
                board.select(queue_id);
                match board.selected() {
                    Some(item) => {
                        println!();
                        for line in dashboard::render_detail(item) {
                            println!("{line}");
                        }
                    }
                    None => bail!("question #{queue_id} is not in the queue"),
                }
            }
        }
        Command::Submit {
            name,
            course,
            question,
            code,
            ta,
        } => {
            let mut view = StudentView::default();
            view.load_tas(&client).await;
            view.form.set(Field::StudentName, &name);
            view.form.set(Field::Course, &course);
            view.form.set(Field::QuestionText, &question);
            view.form.set(Field::CodeSnippet, &code);
            view.form.set(Field::PreferredTa, &ta);
            if let Err(e) = view.submit(&client).await {
                bail!("{e}");
            }
            if let Some(resp) = view.response() {
                println!("Question Submitted! Queue #{}", resp.queue_id);
                for line in student_view::response_summary(resp) {
                    println!("  {line}");
                }
            }
        }
        Command::Resolve { queue_id } => {
            let mut board = TaDashboard::default();
            if !board.resolve(&client, queue_id).await {
                bail!("could not resolve question #{queue_id}");
            }
            println!("Resolved #{queue_id}");
        }
        Command::Metrics { watch: false } => {
            match metrics::refresh(&client, &MetricsState::Loading).await {
                MetricsState::Ready(m) => metrics::render(&m).iter().for_each(|l| println!("{l}")),
                _ => bail!("metrics unavailable"),
            }
        }
        Command::Metrics { watch: true } => {
            let poller = MetricsPoller::spawn(client, REFRESH_INTERVAL);
            let mut updates = poller.subscribe();
            let shutdown = shutdown_signal();
            tokio::pin!(shutdown);
            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        changed.context("metrics poller stopped")?;
                        let state = updates.borrow_and_update().clone();
                        match state {
                            MetricsState::Ready(m) => {
                                println!("---");
                                metrics::render(&m).iter().for_each(|l| println!("{l}"));
                            }
                            MetricsState::Failed => println!("Metrics unavailable"),
                            MetricsState::Loading => {}
                        }
                    }
                    _ = &mut shutdown => break,
                }
            }
        }
        Command::Watch => {
            let mut board = TaDashboard::default();
            board.load(&client).await;
            print_queue(&board);
            let mut socket = QueueSocket::connect(client.ws_url());
            let shutdown = shutdown_signal();
            tokio::pin!(shutdown);
            loop {
                tokio::select! {
                    open = board.follow(&mut socket) => {
                        if !open {
                            println!("Connection closed");
                            break;
                        }
                        print_queue(&board);
                    }
                    _ = &mut shutdown => break,
                }
            }
        }
        Command::Simulate {
            offline,
            auto_demo,
            capacity,
            time_scale,
            ai_after,
            duration,
            seed,
        } => {
            let config = SimConfig {
                ta_capacity: capacity,
                boosted_capacity: SimConfig::default().boosted_capacity.max(capacity),
                time_scale,
                ..SimConfig::default()
            };
            let backend: Arc<dyn SimulationBackend> = if offline {
                Arc::new(Offline)
            } else {
                Arc::new(client)
            };
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let sim = Simulator::new(config);
            let handle = if auto_demo {
                let mut last = None;
                run_auto_demo(sim, backend, rng, |step, snap| {
                    if last != Some(step) {
                        println!("== {} ==", step.label());
                        last = Some(step);
                    }
                    if step != DemoStep::Complete {
                        print_status(snap);
                    }
                })
                .await
            } else {
                free_run(SimulationHandle::spawn(sim, backend, rng), ai_after, duration).await
            };
            let last = handle.reset().await;
            print_status(&last);
        }
    }
    Ok(())
}

async fn free_run(
    handle: SimulationHandle,
    ai_after: Option<u64>,
    duration: u64,
) -> SimulationHandle {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let start = tokio::time::Instant::now();
    let end = start + Duration::from_secs(duration);
    let ai_at = ai_after.map(|s| start + Duration::from_secs(s));
    let mut ai_sent = false;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            now = ticker.tick() => {
                if !ai_sent && ai_at.is_some_and(|at| now >= at) {
                    ai_sent = handle.activate_ai();
                }
                print_status(&handle.snapshot());
                if now >= end {
                    break;
                }
            }
            _ = &mut shutdown => break,
        }
    }
    handle
}

fn print_queue(board: &TaDashboard) {
    println!("Student Queue ({}) {}", board.queue().len(), board.connection_label());
    if board.queue().is_empty() {
        println!("  No questions in queue");
    }
    for item in board.queue() {
        println!("  {}", dashboard::render_row(item));
    }
}

fn print_status(snap: &SimSnapshot) {
    let m = &snap.metrics;
    println!(
        "wait {:.1}m | queue {} | with TA {}/{} | helped {} | left {} | stress {}/10 | satisfaction {}%{}{}",
        m.avg_wait_minutes,
        m.queue_size,
        m.active,
        snap.ta_capacity,
        m.helped,
        m.left,
        m.ta_stress,
        m.satisfaction,
        if snap.ai_enabled { " | AI" } else { "" },
        if m.danger { " | DANGER" } else { "" },
    );
    if let Some(event) = snap.events.first() {
        println!("  {event}");
    }
    for student in snap
        .students
        .iter()
        .filter(|s| m.impatient.contains(&s.id))
    {
        println!("  impatient #{}: {}", student.id, student.tooltip().replace('\n', " | "));
    }
    if let Some(c) = snap.comparison {
        println!(
            "  before AI {:.1}m, after {:.1}m, {}% better",
            c.before_minutes, c.after_minutes, c.improvement_percent
        );
    }
}
