//! EDP Pipeline Library
//!
//! A three-stage batch pipeline over an S3-hosted event feed:
//!
//! - **Extract**: fetch the raw JSON feed from the source bucket
//! - **Transform**: flatten each event into an Arabic-named tabular record,
//!   dropping all-null rows and columns
//! - **Load**: render the records as CSV and write them back under a
//!   timestamped key
//!
//! Stages hand their results to each other as serialized [`StageEnvelope`]s,
//! so any single stage can be replayed from a captured envelope. The
//! [`EventPipeline`] orchestrator runs the stages in order with a uniform
//! retry policy.
//!
//! # Example
//!
//! ```no_run
//! use edp_pipeline::{config::PipelineConfig, pipeline::EventPipeline};
//! use edp_pipeline::storage::{config::StorageConfig, Storage};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = Storage::new(StorageConfig::from_env()?).await?;
//!     let pipeline = EventPipeline::new(storage, PipelineConfig::from_env()?);
//!     let report = pipeline.run().await;
//!     println!("run {} finished: {}", report.run_id, report.state.as_str());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod envelope;
pub mod extract;
pub mod load;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod transform;

// Re-export main types
pub use config::{PipelineConfig, RetryConfig};
pub use envelope::StageEnvelope;
pub use load::LoadedArtifact;
pub use models::{FlatRecord, RecordSet};
pub use pipeline::{EventPipeline, RunReport, RunState};
pub use storage::Storage;
