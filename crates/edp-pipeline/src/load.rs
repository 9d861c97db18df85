//! Load stage
//!
//! Renders the record set as CSV and writes it under a timestamped key.
//! Artifacts are create-once; a retried write lands under a fresh timestamp,
//! so retries can at worst duplicate, never corrupt.

use chrono::{DateTime, Utc};
use edp_common::{PipelineError, Result};
use serde_json::Value;
use tracing::info;

use crate::envelope::StageEnvelope;
use crate::models::RecordSet;
use crate::storage::Storage;

/// Metadata of one stored artifact.
#[derive(Debug, Clone)]
pub struct LoadedArtifact {
    pub key: String,
    pub rows: usize,
    pub checksum: String,
    pub size: i64,
}

/// Decode the record set, render it, and write it to the destination bucket.
///
/// An empty or missing payload is fatal: persisting a vacuous artifact would
/// fabricate a successful run. Everything else — decode, render, remote
/// write — fails as retryable.
pub async fn run(
    storage: &Storage,
    input: &StageEnvelope,
    output_prefix: &str,
) -> Result<LoadedArtifact> {
    if input.as_str().trim().is_empty() {
        return Err(PipelineError::EmptyPayload(
            "load stage received no payload".to_string(),
        ));
    }

    let set = RecordSet::from_envelope(input)?;
    if set.is_empty() {
        return Err(PipelineError::EmptyPayload(
            "load stage decoded zero records".to_string(),
        ));
    }

    let body = render_csv(&set)?;
    let key = artifact_key(output_prefix, Utc::now());

    let result = storage
        .upload(&key, body, Some("text/csv".to_string()))
        .await
        .map_err(PipelineError::transient)?;

    info!(
        key = %result.key,
        rows = set.len(),
        checksum = %result.checksum,
        "Stored transformed artifact"
    );

    Ok(LoadedArtifact {
        key: result.key,
        rows: set.len(),
        checksum: result.checksum,
        size: result.size,
    })
}

/// Render the record set as UTF-8 CSV: a header row from the union of keys
/// across all records, then one row per record, no index column. Null and
/// absent cells render empty.
pub fn render_csv(set: &RecordSet) -> Result<Vec<u8>> {
    let columns = set.columns();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&columns)
        .map_err(PipelineError::transient)?;

    for record in set.records() {
        let row: Vec<String> = columns
            .iter()
            .map(|column| cell_text(record.get(column)))
            .collect();
        writer.write_record(&row).map_err(PipelineError::transient)?;
    }

    writer
        .into_inner()
        .map_err(|err| PipelineError::transient(anyhow::anyhow!("failed to flush CSV buffer: {err}")))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Destination key with a UTC second-resolution run timestamp.
pub fn artifact_key(prefix: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{}/transformed_events_{}.csv",
        prefix.trim_end_matches('/'),
        timestamp.format("%Y%m%d%H%M%S")
    )
}
