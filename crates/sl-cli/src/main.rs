mod report;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sl_core::time::minutes_between;
use sl_core::{
    EventRecord, NetworkGraph, Scenario, SyncConfig, annotate_engagement, export_report,
    parse_events,
};

#[derive(Parser)]
#[command(name = "sl", about = "Interaction-geometry synchronization analyzer")]
struct Cli {
    /// TOML config file (falls back to $SL_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more JSON event logs
    Analyze {
        /// Event log file(s): a JSON array or {"events": [...]}
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the network report as JSON
        #[arg(long)]
        json: bool,

        /// Widen the length tolerance for logs with reactions or privileged types
        #[arg(long)]
        adaptive: bool,
    },

    /// Run the built-in synthetic scenarios
    Demo {
        /// Run a single scenario instead of all three
        #[arg(long, value_enum)]
        scenario: Option<ScenarioArg>,

        /// RNG seed for the generated logs
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Print the network report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default config as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScenarioArg {
    LowSync,
    HighSync,
    Triad,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::LowSync => Scenario::LowSync,
            ScenarioArg::HighSync => Scenario::HighSync,
            ScenarioArg::Triad => Scenario::Triad,
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Analyze {
            files,
            json,
            adaptive,
        } => cmd_analyze(&cli, files, *json, *adaptive),
        Commands::Demo {
            scenario,
            seed,
            json,
        } => cmd_demo(&cli, *scenario, *seed, *json),
        Commands::Config => cmd_config(),
    }
}

fn load_records(path: &Path) -> Result<Vec<EventRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_events(&raw).with_context(|| format!("invalid event log {}", path.display()))
}

fn cmd_analyze(cli: &Cli, files: &[PathBuf], json: bool, adaptive: bool) -> Result<()> {
    let config = settings::load_config(cli.config.as_deref())?;
    let mut analyzed = 0usize;
    for path in files {
        let records = match load_records(path) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("skipping {}: {e:#}", path.display());
                continue;
            }
        };
        run_dataset(&path.display().to_string(), records, &config, adaptive, json)?;
        analyzed += 1;
    }
    if analyzed == 0 {
        anyhow::bail!("no readable event logs among {} file(s)", files.len());
    }
    Ok(())
}

fn cmd_demo(cli: &Cli, scenario: Option<ScenarioArg>, seed: u64, json: bool) -> Result<()> {
    let config = settings::load_config(cli.config.as_deref())?;
    let scenarios = match scenario {
        Some(s) => vec![Scenario::from(s)],
        None => Scenario::ALL.to_vec(),
    };
    for scenario in scenarios {
        let mut rng = SmallRng::seed_from_u64(seed);
        let records = scenario.generate(&mut rng);
        run_dataset(scenario.name(), records, &config, true, json)?;
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    print!("{}", settings::render_defaults()?);
    Ok(())
}

/// Score, admit and analyze one data set, then print its report.
fn run_dataset(
    name: &str,
    mut records: Vec<EventRecord>,
    base: &SyncConfig,
    adaptive: bool,
    json: bool,
) -> Result<()> {
    annotate_engagement(&mut records, &base.bias);
    let config = if adaptive {
        settings::adaptive_config(base, &records)
    } else {
        base.clone()
    };

    let mut net = NetworkGraph::new(config);
    let ingest = net.add_records(&records);
    if !json {
        print!("\n{}", report::banner(name));
        if ingest.rejected > 0 {
            println!("rejected {} of {} records", ingest.rejected, ingest.submitted);
        }
    }
    if net.events().is_empty() && !json {
        println!("No events found.");
        return Ok(());
    }

    let results = net.analyze_all_pairs();
    if json {
        println!("{}", export_report(&net.report()).context("failed to serialize report")?);
    } else {
        print!("{}", report::render(&net, &results, span_days(&net)));
    }
    Ok(())
}

/// Elapsed days between the earliest and latest admitted event.
fn span_days(net: &NetworkGraph) -> f64 {
    let stamps = net.events().iter().map(|e| e.timestamp);
    match (stamps.clone().min(), stamps.max()) {
        (Some(first), Some(last)) => {
            minutes_between(first, last) / net.config().time.day_minutes()
        }
        _ => 0.0,
    }
}
