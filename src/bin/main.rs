//! CLI tool for the power drain recorder (ptdrain)
//!
//! Install as a `systemd-sleep` hook, e.g.
//! `/usr/lib/systemd/system-sleep/ptdrain`, which systemd calls as
//! `ptdrain pre suspend` and `ptdrain post suspend`.

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::process::ExitCode;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "ptdrain")]
#[command(about = "Power drain recorder: append the current battery energy and AC state to a CSV log", long_about = None)]
#[command(version)]
struct Cli {
    /// Label recorded with the sample (pre, post, check, ...)
    action: Option<String>,

    /// Sleep type passed by systemd-sleep (suspend, hibernate, ...); not recorded
    sleep_type: Option<String>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Power supply sysfs directory
    #[arg(long)]
    root: Option<PathBuf>,

    /// CSV log file to append to
    #[arg(long)]
    log: Option<PathBuf>,

    /// Measure and print the record without appending it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Output format for --dry-run
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[cfg(feature = "cli")]
fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ptdrain: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "cli")]
fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    use ptdrain::{Config, LogRecord, Recorder};

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(root) = &cli.root {
        config.paths.power_supply_root = root.clone();
    }
    if let Some(log) = &cli.log {
        config.paths.log_file = log.clone();
    }

    let action = cli
        .action
        .clone()
        .unwrap_or_else(|| config.record.default_action.clone());
    if let Some(sleep_type) = &cli.sleep_type {
        log::info!("{} {}", action, sleep_type);
    }

    let recorder = Recorder::from_config(&config);

    if !cli.dry_run {
        recorder.record(&action)?;
        return Ok(());
    }

    let sample = recorder.measure()?;
    let record = LogRecord::new(&action, &sample);
    record.validate()?;

    match cli.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        Format::Text => {
            println!("{}", record);
            if let Some(at) = sample.recorded_at() {
                let source = if sample.ac_online { "AC" } else { "battery" };
                println!("# {} on {}", at.format("%Y-%m-%d %H:%M:%S UTC"), source);
            }
            println!("# total energy {:.2} Wh", sample.total_energy_wh());
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features not enabled. Please compile with --features cli");
    std::process::exit(1);
}
