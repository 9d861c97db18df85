//! Pipeline orchestration
//!
//! Runs Extract -> Transform -> Load strictly in order, each stage wrapped in
//! the same retry policy. A stage that exhausts its budget, or fails with a
//! fatal error, ends the run in the `Failed` state; later stages never
//! execute and no artifact is written.

use chrono::{DateTime, Utc};
use edp_common::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{PipelineConfig, RetryConfig};
use crate::load::LoadedArtifact;
use crate::storage::Storage;
use crate::{extract, load, transform};

/// Run progress states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Extracted,
    Transformed,
    Loaded,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &str {
        match self {
            RunState::Extracted => "extracted",
            RunState::Transformed => "transformed",
            RunState::Loaded => "loaded",
            RunState::Failed => "failed",
        }
    }
}

/// Outcome of one end-to-end run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub state: RunState,
    /// Present exactly when the run succeeded.
    pub artifact: Option<LoadedArtifact>,
    /// Present exactly when the run failed.
    pub error: Option<PipelineError>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// The three-stage event pipeline.
pub struct EventPipeline {
    storage: Storage,
    config: PipelineConfig,
}

impl EventPipeline {
    pub fn new(storage: Storage, config: PipelineConfig) -> Self {
        Self { storage, config }
    }

    /// Execute one run. Never panics and never returns early with a partial
    /// artifact: the report is either `Loaded` with artifact metadata or
    /// `Failed` with the terminal error.
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!(run_id = %run_id, "Starting pipeline run");

        match self.execute(run_id).await {
            Ok(artifact) => {
                info!(
                    run_id = %run_id,
                    state = RunState::Loaded.as_str(),
                    key = %artifact.key,
                    rows = artifact.rows,
                    "Pipeline run complete"
                );
                RunReport {
                    run_id,
                    state: RunState::Loaded,
                    artifact: Some(artifact),
                    error: None,
                    started_at,
                    completed_at: Utc::now(),
                }
            },
            Err(err) => {
                error!(run_id = %run_id, error = %err, "Pipeline run failed");
                RunReport {
                    run_id,
                    state: RunState::Failed,
                    artifact: None,
                    error: Some(err),
                    started_at,
                    completed_at: Utc::now(),
                }
            },
        }
    }

    async fn execute(&self, run_id: Uuid) -> Result<LoadedArtifact> {
        let retry = &self.config.retry;

        let raw = run_stage("extract", retry, || {
            let storage = self.storage.clone();
            let source_key = self.config.source_key.clone();
            async move { extract::run(&storage, &source_key).await }
        })
        .await?;
        debug!(run_id = %run_id, state = RunState::Extracted.as_str(), "Extract stage complete");

        let records = run_stage("transform", retry, || {
            let input = raw.clone();
            async move { transform::run(input) }
        })
        .await?;
        debug!(run_id = %run_id, state = RunState::Transformed.as_str(), "Transform stage complete");

        let artifact = run_stage("load", retry, || {
            let storage = self.storage.clone();
            let input = records.clone();
            let prefix = self.config.output_prefix.clone();
            async move { load::run(&storage, &input, &prefix).await }
        })
        .await?;

        Ok(artifact)
    }
}

/// Run one stage under the uniform retry policy.
///
/// Retryable failures are re-attempted up to `max_retries` times with a
/// fixed inter-attempt delay; fatal errors abort on the first attempt.
pub(crate) async fn run_stage<T, F, Fut>(
    stage: &str,
    retry: &RetryConfig,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = retry.max_retries + 1;

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(
                        "{} stage succeeded on attempt {}/{}",
                        stage, attempt, max_attempts
                    );
                }
                return Ok(value);
            },
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    "{} stage attempt {}/{} failed: {}",
                    stage, attempt, max_attempts, err
                );
                info!(
                    "Retrying {} stage in {} seconds...",
                    stage,
                    retry.retry_delay.as_secs()
                );
                sleep(retry.retry_delay).await;
            },
            Err(err) => {
                error!("{} stage failed terminally: {}", stage, err);
                return Err(err);
            },
        }
    }

    // The loop always returns on its last iteration; this is a fallback for
    // a zero-attempt budget, which the config cannot express.
    Err(PipelineError::transient(anyhow::anyhow!(
        "{stage} stage exhausted its retry budget"
    )))
}
