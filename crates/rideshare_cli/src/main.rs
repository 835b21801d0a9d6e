use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::{ArgAction, Parser};
use log::LevelFilter;
use rideshare_sim::monitor::MonitorReport;
use rideshare_sim::scenario::SimulationConfig;
use rideshare_sim::{RunSummary, SimResult, Simulation};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "rideshare",
    about = "Replay a ride-sharing event file through the dispatch simulation",
    long_about = "Loads driver and rider requests from an event file, runs the\n\
                  discrete-event simulation to completion and prints the\n\
                  activity log followed by a summary report."
)]
struct Cli {
    /// Event file: one `DriverRequest` or `RiderRequest` per line
    events: PathBuf,

    /// JSON run configuration (`end_time`, `max_steps`)
    #[arg(long, env = "RIDESHARE_CONFIG")]
    config: Option<PathBuf>,

    /// Discard events after this timestamp (overrides the config file)
    #[arg(long)]
    end_time: Option<u64>,

    /// Stop after this many events (overrides the config file)
    #[arg(long)]
    max_steps: Option<usize>,

    /// Do not print individual activities
    #[arg(short, long)]
    quiet: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }

    fn simulation_config(&self) -> SimResult<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_str(&fs::read_to_string(path)?)?,
            None => SimulationConfig::default(),
        };
        if let Some(end_time) = self.end_time {
            config = config.with_end_time(end_time);
        }
        if let Some(max_steps) = self.max_steps {
            config = config.with_max_steps(max_steps);
        }
        Ok(config)
    }
}

// ── Main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if let Err(err) = run(&cli) {
        log::error!("simulation failed: {err}");
        eprintln!("error: {err}");
        exit(1);
    }
}

fn run(cli: &Cli) -> SimResult<()> {
    let config = cli.simulation_config()?;
    let mut sim = Simulation::from_path(&cli.events, config)?;
    let summary = sim.run()?;

    if !cli.quiet {
        for activity in sim.monitor().activities() {
            println!("{activity}");
        }
    }

    let report = sim.monitor().report().unwrap_or_default();
    if cli.json {
        let body = serde_json::json!({ "summary": summary, "report": report });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_report(&summary, &report);
    }
    Ok(())
}

fn print_report(summary: &RunSummary, report: &MonitorReport) {
    println!();
    println!("── Summary ──");
    println!("events executed:         {}", summary.steps);
    println!("final time:              {}", summary.final_time);
    if summary.discarded > 0 {
        println!("discarded after end:     {}", summary.discarded);
    }
    if summary.pending > 0 {
        println!("left pending:            {}", summary.pending);
    }
    println!("riders:                  {}", report.rider_count);
    println!("drivers:                 {}", report.driver_count);
    println!("avg rider wait:          {:.2}", report.rider_wait_time);
    println!("avg driver distance:     {:.2}", report.driver_total_distance);
    println!("avg driver ride distance {:.2}", report.driver_ride_distance);
}
