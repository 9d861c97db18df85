//! Serialized stage handoff
//!
//! Each stage hands its result to the next as a single self-describing JSON
//! string: the extract stage emits a document, the transform stage a list of
//! flat mappings. Keeping the handoff serialized means any stage can be
//! re-run in isolation from a captured envelope.

use edp_common::{PipelineError, Result};
use serde::{de::DeserializeOwned, Serialize};

/// The serialized value passed between stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEnvelope(String);

impl StageEnvelope {
    /// Serialize any JSON-representable value into an envelope.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self> {
        let text = serde_json::to_string(value).map_err(PipelineError::transient)?;
        Ok(StageEnvelope(text))
    }

    /// Deserialize the envelope back into a concrete shape.
    ///
    /// Failures are classified as transient: an envelope only ever carries
    /// what a previous stage serialized, so a decode failure means the
    /// payload was corrupted in transit, not that the contract changed.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.0).map_err(PipelineError::transient)
    }

    /// Wrap an already-serialized payload, e.g. one captured from a previous
    /// run for replay.
    pub fn from_raw(text: impl Into<String>) -> Self {
        StageEnvelope(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
