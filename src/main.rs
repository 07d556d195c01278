use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use flowctl::config::SimulationConfig;
use flowctl::control::controller::GreedyController;
use flowctl::scenario::scenario::Sample;
use flowctl::simulation::engine::SimulationEngine;
use flowctl::tui::app::App;
use flowctl::tui::draw::draw_app;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowctl")]
#[command(about = "Flow network simulation and control monitor")]
struct Args {
    /// Network to load
    #[arg(long, value_enum, default_value_t = Sample::Diamond)]
    sample: Sample,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Alerts surfaced per tick
    #[arg(long, default_value_t = 3)]
    alert_budget: usize,

    /// Random-walk half-width as a fraction of base capacity
    #[arg(long, default_value_t = 0.05)]
    walk_step: f64,

    /// Per-edge failure probability per tick
    #[arg(long, default_value_t = 0.01)]
    failure_prob: f64,

    /// Per-edge recovery probability per tick
    #[arg(long, default_value_t = 0.2)]
    recovery_prob: f64,

    /// Give up complete path enumeration past this many paths
    #[arg(long, default_value_t = 1000)]
    max_paths: usize,

    /// Run the greedy controller without the terminal monitor
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode
    #[arg(long, default_value_t = 50)]
    ticks: usize,

    /// Write logs here while the monitor owns the terminal
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        let mut config = SimulationConfig {
            seed: self.seed,
            alert_budget: self.alert_budget,
            ..SimulationConfig::default()
        };
        config.dynamics.walk_step = self.walk_step;
        config.dynamics.failure_probability = self.failure_prob;
        config.dynamics.recovery_probability = self.recovery_prob;
        config.enumeration.max_paths = self.max_paths;
        config
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_logging(args: &Args) -> io::Result<()> {
    if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(io::stderr)
            .init();
    } else if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn run_headless(mut engine: SimulationEngine, ticks: usize) -> io::Result<()> {
    let mut greedy = GreedyController::new();
    for _ in 0..ticks {
        let (reply, report) = engine
            .run(&mut greedy, 1)
            .map_err(io::Error::other)?
            .remove(0);
        let graph = engine.graph();
        let notes = report
            .alerts
            .iter()
            .map(|a| a.describe(graph))
            .chain(report.flow_clears.iter().map(|c| c.describe(graph)))
            .collect::<Vec<String>>()
            .join(", ");
        let cut = engine
            .full_state_snapshot()
            .min_cut
            .iter()
            .map(|e| graph.edge_by_id(*e).name().to_string())
            .collect::<Vec<String>>()
            .join(" ");
        println!(
            "tick {:>4}  throughput {:>8.2}  max {:>8.2}  paths {:>8.2}  eff {:>5.1}%  \
             failed {:>2}  cut [{}]  | {}{}",
            report.tick,
            report.metrics.throughput,
            report.metrics.max_flow,
            report.metrics.path_capacity,
            report.metrics.efficiency * 100.0,
            report.metrics.failed_edges,
            cut,
            reply.message,
            if notes.is_empty() {
                String::new()
            } else {
                format!("  | {notes}")
            }
        );
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = args.config();
    let scenario = args.sample.scenario();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let engine = SimulationEngine::load(scenario.builder(&mut rng), &config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    if args.headless {
        return run_headless(engine, args.ticks);
    }

    let mut terminal = ratatui::init();
    let mut app = App::new(engine);

    while app.running {
        terminal.draw(|frame| draw_app(frame, &app))?;

        if crossterm::event::poll(Duration::from_millis(16))? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') => app.running = false,
                    KeyCode::Char(' ') => app.step(),
                    KeyCode::Up => app.select_prev(),
                    KeyCode::Down => app.select_next(),
                    KeyCode::Char('s') => app.saturate_selected(),
                    KeyCode::Char('+') => app.adjust_selected(1.0),
                    KeyCode::Char('-') => app.adjust_selected(-1.0),
                    KeyCode::Char('c') => app.clear_all(),
                    KeyCode::Char('x') => app.disable_selected_bottleneck(),
                    KeyCode::Char('e') => app.enable_selected_edges(),
                    KeyCode::Char('a') => app.greedy_act(),
                    _ => continue,
                },
                _ => continue,
            }
        }
    }
    Ok(())
}
