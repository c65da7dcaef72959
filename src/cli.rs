//! Command-line surface for the etude pipeline.
//!
//! All pipeline behaviour lives in the library modules; this module parses
//! arguments, merges them over the loaded config, and prints or writes the
//! resulting artifacts. [`run`] is separate from `main` so integration tests
//! can drive it directly.

use crate::daily::execute_daily_tasks;
use crate::etudes::discover_builtin;
use crate::load_config::{load_optional_config, PipelineConfig};
use crate::mock_data::{generate_mock_data, Scenario};
use crate::registry::EtudeRegistry;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DAILY_JSON_START: &str = "--- Daily Tasks Output JSON Start ---";
pub const DAILY_JSON_END: &str = "--- Daily Tasks Output JSON End ---";

/// CLI for etude-daily: fetch daily etude data or generate mock data.
#[derive(Parser)]
#[clap(
    name = "etude-daily",
    version,
    about = "Fetch daily resources for every etude, or generate schema-conformant mock data"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every etude's daily resources and print the run result JSON
    Daily {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Also write the JSON artifact to this file
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Generate mock run results without network access
    MockData {
        /// One of: success, partial_failure, no_data
        #[clap(long)]
        scenario: Option<Scenario>,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Write the JSON artifact to this file instead of stdout
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// List registered etudes in page order
    List {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

fn build_registry(config: &PipelineConfig) -> EtudeRegistry {
    discover_builtin(&config.etudes.exclude)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Daily { config, output } => {
            let config = load_optional_config(config.as_deref())?;
            let registry = build_registry(&config);
            tracing::info!(command = "daily", etudes = registry.len(), "Starting daily tasks");

            let results = execute_daily_tasks(&registry).await;
            println!("{DAILY_JSON_START}");
            println!("{}", results.to_json_pretty()?);
            println!("{DAILY_JSON_END}");

            if let Some(path) = output.or(config.daily.output) {
                results.write_json(&path)?;
            }
            tracing::info!(command = "daily", "Daily tasks finished");
            Ok(())
        }
        Commands::MockData {
            scenario,
            config,
            output,
        } => {
            let config = load_optional_config(config.as_deref())?;
            let scenario = scenario.unwrap_or(config.mock.scenario);
            let registry = build_registry(&config);
            tracing::info!(command = "mock-data", scenario = %scenario, "Generating mock data");

            let results = generate_mock_data(scenario, &registry);
            match output.or(config.mock.output) {
                Some(path) => results.write_json(&path)?,
                None => println!("{}", results.to_json_pretty()?),
            }
            Ok(())
        }
        Commands::List { config } => {
            let config = load_optional_config(config.as_deref())?;
            let registry = build_registry(&config);
            for etude in registry.all() {
                println!("{}\t{}", etude.name(), etude.description());
            }
            Ok(())
        }
    }
}
