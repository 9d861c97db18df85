//! EDP Pipeline - event feed ETL tool

use anyhow::Result;
use clap::Parser;
use edp_common::logging::{init_logging, LogConfig, LogLevel};
use edp_pipeline::config::PipelineConfig;
use edp_pipeline::pipeline::{EventPipeline, RunState};
use edp_pipeline::storage::{config::StorageConfig, Storage};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "edp-pipeline")]
#[command(author, version, about = "Event feed ETL pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Execute a single pipeline run
    Run,

    /// Run on a fixed cadence, skipping missed windows (no backfill)
    Schedule,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env().unwrap_or_default();
    log_config.log_file_prefix = "edp-pipeline".to_string();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    init_logging(&log_config)?;

    let storage_config = StorageConfig::from_env()?;
    let pipeline_config = PipelineConfig::from_env()?;

    let storage = Storage::new(storage_config).await?;
    let pipeline = EventPipeline::new(storage, pipeline_config.clone());

    match cli.command {
        Command::Run => {
            let report = pipeline.run().await;
            if report.state == RunState::Failed {
                anyhow::bail!("pipeline run {} failed", report.run_id);
            }
        },
        Command::Schedule => {
            let interval = pipeline_config.check_interval;
            info!(
                "Scheduling pipeline every {} seconds",
                interval.as_secs()
            );

            loop {
                let report = pipeline.run().await;
                if report.state == RunState::Failed {
                    // A failed window is recorded and skipped; the next
                    // window starts fresh rather than backfilling.
                    error!(run_id = %report.run_id, "Scheduled run failed; waiting for next window");
                }
                tokio::time::sleep(interval).await;
            }
        },
    }

    Ok(())
}
