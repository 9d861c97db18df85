//! Transform stage
//!
//! Reshapes the feed document into the flat record set. Pure: no I/O, no
//! side effects, fully replayable from a captured envelope.

use edp_common::{PipelineError, Result};
use serde_json::Value;
use tracing::info;

use crate::envelope::StageEnvelope;
use crate::models::{FlatRecord, RecordSet};

/// Input to the transform stage: either the serialized envelope from the
/// extract stage or an already-decoded document.
#[derive(Debug, Clone)]
pub enum TransformInput {
    Envelope(StageEnvelope),
    Document(Value),
}

impl From<StageEnvelope> for TransformInput {
    fn from(envelope: StageEnvelope) -> Self {
        TransformInput::Envelope(envelope)
    }
}

impl From<Value> for TransformInput {
    fn from(document: Value) -> Self {
        TransformInput::Document(document)
    }
}

/// Flatten every event under `contents.events` and prune all-null rows and
/// columns, returning the record set in list-of-mappings envelope form.
///
/// A document without the `contents.events` path is a contract break with
/// the feed producer and fails with a fatal [`PipelineError::Schema`].
/// Field-level absence inside an event never fails.
pub fn run(input: impl Into<TransformInput>) -> Result<StageEnvelope> {
    let document = match input.into() {
        TransformInput::Envelope(envelope) => envelope.decode::<Value>()?,
        TransformInput::Document(document) => document,
    };

    let events = document
        .pointer("/contents/events")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            PipelineError::Schema(
                "source document is missing the contents.events path".to_string(),
            )
        })?;

    let rows: Vec<FlatRecord> = events.iter().map(FlatRecord::from_event).collect();
    let set = RecordSet::from_flat_records(rows);

    info!(
        "Transformed {} events into {} records across {} columns",
        events.len(),
        set.len(),
        set.columns().len()
    );

    set.to_envelope()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed(events: Value) -> Value {
        json!({"contents": {"events": events}})
    }

    #[test]
    fn test_accepts_document_and_envelope_transparently() {
        let document = feed(json!([{"title": "A"}]));
        let envelope = StageEnvelope::encode(&document).unwrap();

        let from_document = run(document).unwrap();
        let from_envelope = run(envelope).unwrap();

        assert_eq!(from_document, from_envelope);
    }

    #[test]
    fn test_missing_events_path_is_schema_error() {
        let err = run(json!({"contents": {}})).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
        assert!(!err.is_retryable());

        let err = run(json!({"unexpected": true})).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn test_non_array_events_is_schema_error() {
        let err = run(feed(json!("not a list"))).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn test_partial_events_never_fail() {
        let document = feed(json!([
            {"title": "A", "city": {"name": "Riyadh"}},
            {"city": null, "event_date": {"start_time": "10:00"}},
            {}
        ]));

        let envelope = run(document).unwrap();
        let set = RecordSet::from_envelope(&envelope).unwrap();

        // The empty event flattens to an all-null row and is pruned.
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_all_null_column_absent_from_output() {
        let document = feed(json!([
            {"title": "A"},
            {"title": "B"}
        ]));

        let envelope = run(document).unwrap();
        let set = RecordSet::from_envelope(&envelope).unwrap();

        assert_eq!(set.columns(), vec!["أسم الفعالية"]);
    }

    #[test]
    fn test_empty_events_list_yields_empty_set() {
        let envelope = run(feed(json!([]))).unwrap();
        let set = RecordSet::from_envelope(&envelope).unwrap();
        assert!(set.is_empty());
    }
}
