//! Extract stage
//!
//! Fetches the raw feed object and hands the parsed document on as an
//! envelope. Read-only; the only side effect is the remote GET.

use edp_common::{PipelineError, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::envelope::StageEnvelope;
use crate::storage::Storage;

/// Fetch the feed from `source_key` and return it as a document envelope.
///
/// Storage failures and malformed feed bytes are both surfaced as retryable:
/// neither has a stage-specific recovery path, and transient feed corruption
/// is as plausible as a network blip.
pub async fn run(storage: &Storage, source_key: &str) -> Result<StageEnvelope> {
    debug!("Extracting feed from key: {}", source_key);

    let bytes = storage
        .download(source_key)
        .await
        .map_err(PipelineError::transient)?;

    parse_feed(&bytes)
}

/// Parse the fetched body as JSON and re-serialize it into the envelope.
pub(crate) fn parse_feed(bytes: &[u8]) -> Result<StageEnvelope> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|err| PipelineError::transient(anyhow::anyhow!("feed body is not valid JSON: {err}")))?;

    info!("Extracted feed document ({} bytes)", bytes.len());

    StageEnvelope::encode(&document)
}
