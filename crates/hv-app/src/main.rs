//! Main application entry point

use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hv_data::{load_dashboard, DashboardConfig};
use hv_views::Viewport;

mod commands;
mod summary;

use commands::Command;

/// Replay view interactions against the linked happiness views
#[derive(Parser, Debug)]
#[command(name = "happiness-dashboard", version)]
struct Cli {
    /// Dashboard configuration (JSON)
    #[arg(short, long, default_value = "dashboard.json")]
    config: PathBuf,

    /// Command script; read from stdin when omitted
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Print frames as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Starting happiness dashboard with {:?}", cli.config);

    let config = DashboardConfig::from_file(&cli.config)
        .with_context(|| format!("loading configuration {:?}", cli.config))?;
    let dashboard = load_dashboard(&config).await?;
    for diagnostic in dashboard.startup_diagnostics() {
        warn!("Startup: {}", diagnostic);
    }

    let viewport = Viewport::new(dashboard);
    print_frames(&viewport, cli.json)?;

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(path).with_context(|| format!("opening script {:?}", path))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                warn!("line {}: {}", number + 1, err);
                continue;
            }
        };

        match command.execute(&viewport) {
            Ok(Some(report)) => {
                print!("{}", summary::describe_report(&report));
                print_frames(&viewport, cli.json)?;
            }
            Ok(None) => print_frames(&viewport, cli.json)?,
            Err(err) => warn!("line {}: {}", number + 1, err),
        }
    }

    info!("Script finished at sequence {}", viewport.dashboard().sequence());
    Ok(())
}

fn print_frames(viewport: &Viewport, json: bool) -> Result<()> {
    let frames = viewport.frames();
    if json {
        println!("{}", serde_json::to_string(&frames)?);
    } else {
        print!("{}", summary::summarize(&frames));
    }
    Ok(())
}
