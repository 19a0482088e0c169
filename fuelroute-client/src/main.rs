use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use fuelroute_client::app::FuelRouteApp;
use fuelroute_client::config::ClientConfig;
use fuelroute_client::console::{ConsoleView, describe_session};
use fuelroute_client::controller::{Completion, parse_radius};
use fuelroute_client::logging;

#[derive(Parser)]
#[command(name = "fuelroute", version, about = "Fuel-optimized routes and nearby stations")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize fuel stops between two locations
    Route { start: String, end: String },
    /// Find stations around a location, cheapest first
    Nearby {
        location: String,
        /// Search radius in miles (default 10)
        #[arg(long, default_value = "")]
        radius: String,
        /// Focus the N-th listed station after the search
        #[arg(long)]
        focus: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ClientConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    let _logging_guard = logging::init_logging(&config.log_level, &config.logging);

    match run(cli.command, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &ClientConfig) -> anyhow::Result<bool> {
    let app = FuelRouteApp::from_config(config, Arc::new(ConsoleView::new()))?;

    let succeeded = match command {
        Commands::Route { start, end } => app.route.submit_route(&start, &end).await.is_ok(),
        Commands::Nearby {
            location,
            radius,
            focus,
        } => match app.nearby.search_nearby(&location, Some(parse_radius(&radius))).await {
            Ok(Completion::Rendered(summary)) => {
                if let Some(n) = focus {
                    match n.checked_sub(1).and_then(|i| summary.results.list.items().get(i)) {
                        Some(item) => {
                            app.nearby.focus_station(item).await;
                        }
                        None => tracing::warn!(
                            "No station #{} to focus, {} listed",
                            n,
                            summary.results.count
                        ),
                    }
                }
                true
            }
            Ok(Completion::Superseded) => true,
            Err(_) => false,
        },
    };

    println!();
    for line in describe_session(&app.session).await {
        println!("{}", line);
    }
    Ok(succeeded)
}
