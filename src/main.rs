mod analysis;
mod chart;
mod color;
mod config;
mod data;
mod error;
mod narrative;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use config::Config;
use narrative::NarrativeClient;

/// Analyze a CSV dataset and write README.md with charts and a story.
#[derive(Parser, Debug)]
#[command(name = "autolysis", version, about)]
struct Cli {
    /// Path to the CSV file to analyze
    dataset: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            print!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            println!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match NarrativeClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Could not build HTTP client: {e}");
            println!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match pipeline::run(&cli.dataset, Path::new("."), &client) {
        Ok(summary) => {
            log::info!(
                "Analyzed {} rows x {} columns, {} chart(s) -> {}",
                summary.rows,
                summary.columns,
                summary.charts.len(),
                summary.report.display()
            );
            println!("README.md and visualizations created successfully!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}
