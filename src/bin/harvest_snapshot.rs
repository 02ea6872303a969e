//! Harvest comments from saved HTML snapshots of a post.
//!
//! Each snapshot file stands for one state of the page; scrolling or pressing
//! "load more" reveals the next one. Prints the harvest as JSON or as
//! `@handle: text` lines.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rs_harvest::{Harvester, Immediate, LineGate, Options, SnapshotBrowser};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "harvest_snapshot")]
#[command(about = "Harvest post comments from HTML snapshots")]
#[command(version)]
struct Cli {
    /// Post or reel URL the snapshots were saved from
    url: String,

    /// Snapshot files, in load order
    #[arg(required = true)]
    snapshots: Vec<PathBuf>,

    /// JSON options file; unspecified fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum loader iterations
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Stop loading once this many candidates are present
    #[arg(long)]
    target: Option<usize>,

    /// Use the basic selector sets and link-only identity resolution
    #[arg(long)]
    basic: bool,

    /// Wait for ENTER before harvesting
    #[arg(long)]
    interactive: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Lines,
}

fn load_options(cli: &Cli) -> Result<Options, String> {
    let mut options = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
            Options::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))?
        }
        None if cli.basic => Options::basic(),
        None => Options::default(),
    };
    if let Some(max) = cli.max_iterations {
        options.max_iterations = max;
    }
    if cli.target.is_some() {
        options.target_count = cli.target;
    }
    Ok(options)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut snapshots = Vec::with_capacity(cli.snapshots.len());
    for path in &cli.snapshots {
        match std::fs::read_to_string(path) {
            Ok(html) => snapshots.push(html),
            Err(err) => {
                eprintln!("Failed to read {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    let browser = SnapshotBrowser::new(snapshots);
    let harvester = Harvester::new(options);
    let outcome = if cli.interactive {
        let gate = LineGate::stdin().with_prompt("Log in if needed, then press ENTER to start harvesting...");
        harvester.harvest(&browser, &gate, &cli.url).await
    } else {
        harvester.harvest(&browser, &Immediate, &cli.url).await
    };

    match outcome {
        Ok(harvest) => {
            match cli.format {
                Format::Json => match serde_json::to_string_pretty(&harvest) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("Failed to serialize harvest: {err}");
                        return ExitCode::FAILURE;
                    }
                },
                Format::Lines => {
                    for item in &harvest.result.items {
                        println!("@{}: {}", item.identity.handle, item.text);
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("Harvest failed ({}): {}", failure.kind, failure.message);
            eprintln!("Partial items: {}", failure.partial_items.len());
            ExitCode::FAILURE
        }
    }
}
