//! Record shapes and null-pruning rules
//!
//! The feed's events are semi-structured: any scalar field or nested object
//! may be absent or null. Traversal therefore happens over
//! `serde_json::Value` with optional-chaining helpers that short-circuit to
//! `None` instead of erroring, and everything collapses to `Option<String>`
//! at the [`FlatRecord`] boundary.

use edp_common::Result;
use serde_json::{Map, Value};

use crate::envelope::StageEnvelope;

/// One output row: a fixed set of 18 Arabic-named, possibly-null fields
/// derived from a single event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    pub title: Option<String>,
    pub owner_name: Option<String>,
    pub link: Option<String>,
    pub language: Option<String>,
    pub city: Option<String>,
    pub start_date: Option<String>,
    pub time_range: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub age_group: Option<String>,
    pub event_period: Option<String>,
    pub attendance_type: Option<String>,
    pub entry_type: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub event_type: Option<String>,
    pub special: Option<String>,
}

impl FlatRecord {
    /// Output column names, in canonical order. These are the localized
    /// headers the downstream consumers expect.
    pub const COLUMNS: [&'static str; 18] = [
        "أسم الفعالية",
        "أسم المالك",
        "الرابط",
        "اللغة",
        "اسم المدينة",
        "تاريخ البداية",
        "وقت المناسبة",
        "وقت البداية",
        "تاريخ النهاية",
        "وقت النهاية",
        "الفئة العمرية",
        "فترة الفعالية",
        "فئة الحضور",
        "نوع الدخول",
        "الموقع",
        "منظم الفعالية",
        "نوع الفعالية",
        "فعالية خاصة",
    ];

    /// Flatten one event. Missing fields and missing or null nested objects
    /// all yield `None`; this can never fail.
    pub fn from_event(event: &Value) -> Self {
        let start_time = nested_field(event, "event_date", "start_time");
        let end_time = nested_field(event, "event_date", "end_time");
        // The combined range only exists when both endpoints do.
        let time_range = match (&start_time, &end_time) {
            (Some(start), Some(end)) => Some(format!("{} - {}", start, end)),
            _ => None,
        };

        Self {
            title: scalar_field(event, "title"),
            owner_name: scalar_field(event, "ownername"),
            link: scalar_field(event, "link"),
            language: scalar_field(event, "lang"),
            city: nested_field(event, "city", "name"),
            start_date: nested_field(event, "event_date", "start_date"),
            time_range,
            start_time,
            end_date: nested_field(event, "event_date", "end_date"),
            end_time,
            age_group: nested_field(event, "age_group", "name"),
            event_period: nested_field(event, "event_period", "name"),
            attendance_type: nested_field(event, "attendance_type", "name"),
            entry_type: nested_field(event, "event_price", "name"),
            location: scalar_field(event, "location"),
            organizer: scalar_field(event, "event_organizer"),
            event_type: nested_field(event, "type_of_event", "name"),
            special: scalar_field(event, "event_special"),
        }
    }

    /// Field values in the same order as [`Self::COLUMNS`].
    pub fn values(&self) -> [&Option<String>; 18] {
        [
            &self.title,
            &self.owner_name,
            &self.link,
            &self.language,
            &self.city,
            &self.start_date,
            &self.time_range,
            &self.start_time,
            &self.end_date,
            &self.end_time,
            &self.age_group,
            &self.event_period,
            &self.attendance_type,
            &self.entry_type,
            &self.location,
            &self.organizer,
            &self.event_type,
            &self.special,
        ]
    }

    /// True when every one of the 18 fields is null. Evaluated against the
    /// full column set, before any column pruning.
    pub fn is_all_null(&self) -> bool {
        self.values().iter().all(|value| value.is_none())
    }
}

/// The ordered collection of flat records for one run, after null-row and
/// null-column pruning. The effective column set varies run to run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Map<String, Value>>,
}

impl RecordSet {
    /// Assemble a record set from flattened rows.
    ///
    /// Rows that are all-null across the full 18-column set are dropped
    /// first; only then are columns that are all-null across the surviving
    /// rows removed. Row evaluation must see the original column set, so the
    /// order of these two passes is load-bearing.
    pub fn from_flat_records(rows: Vec<FlatRecord>) -> Self {
        let rows: Vec<FlatRecord> = rows.into_iter().filter(|row| !row.is_all_null()).collect();

        let mut keep = [false; 18];
        for row in &rows {
            for (index, value) in row.values().iter().enumerate() {
                if value.is_some() {
                    keep[index] = true;
                }
            }
        }

        let records = rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                for (index, (column, value)) in
                    FlatRecord::COLUMNS.iter().zip(row.values()).enumerate()
                {
                    if keep[index] {
                        let cell = value
                            .clone()
                            .map(Value::String)
                            .unwrap_or(Value::Null);
                        record.insert((*column).to_string(), cell);
                    }
                }
                record
            })
            .collect();

        Self { records }
    }

    /// Decode a record set from a stage envelope (list-of-mappings form).
    pub fn from_envelope(envelope: &StageEnvelope) -> Result<Self> {
        let records: Vec<Map<String, Value>> = envelope.decode()?;
        Ok(Self { records })
    }

    /// Encode into the list-of-mappings envelope form.
    pub fn to_envelope(&self) -> Result<StageEnvelope> {
        StageEnvelope::encode(&self.records)
    }

    /// The union of keys across all records, in first-seen order. This is
    /// the header of the rendered artifact.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for key in record.keys() {
                if !columns.iter().any(|existing| existing == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }

    pub fn records(&self) -> &[Map<String, Value>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Scalar field lookup: present and scalar yields its string form, anything
/// else yields `None`.
pub(crate) fn scalar_field(event: &Value, key: &str) -> Option<String> {
    event.get(key).and_then(scalar_to_string)
}

/// Nested lookup through an optional sub-object: a missing, null, or
/// non-object parent short-circuits to `None`.
pub(crate) fn nested_field(event: &Value, parent: &str, child: &str) -> Option<String> {
    event
        .get(parent)
        .and_then(Value::as_object)
        .and_then(|object| object.get(child))
        .and_then(scalar_to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_nested_objects_yield_null() {
        let event = json!({"title": "Art Fair"});
        let record = FlatRecord::from_event(&event);

        assert_eq!(record.title.as_deref(), Some("Art Fair"));
        assert_eq!(record.city, None);
        assert_eq!(record.age_group, None);
        assert_eq!(record.event_type, None);
        assert_eq!(record.start_date, None);
    }

    #[test]
    fn test_null_nested_object_yields_null() {
        let event = json!({"city": null, "age_group": {"name": "adults"}});
        let record = FlatRecord::from_event(&event);

        assert_eq!(record.city, None);
        assert_eq!(record.age_group.as_deref(), Some("adults"));
    }

    #[test]
    fn test_time_range_requires_both_endpoints() {
        let both = json!({"event_date": {"start_time": "10:00", "end_time": "12:00"}});
        let record = FlatRecord::from_event(&both);
        assert_eq!(record.time_range.as_deref(), Some("10:00 - 12:00"));

        let start_only = json!({"event_date": {"start_time": "10:00"}});
        let record = FlatRecord::from_event(&start_only);
        assert_eq!(record.start_time.as_deref(), Some("10:00"));
        assert_eq!(record.time_range, None);

        let neither = json!({"event_date": {}});
        let record = FlatRecord::from_event(&neither);
        assert_eq!(record.time_range, None);
    }

    #[test]
    fn test_non_string_scalars_are_stringified() {
        let event = json!({"event_special": true, "title": 7});
        let record = FlatRecord::from_event(&event);

        assert_eq!(record.special.as_deref(), Some("true"));
        assert_eq!(record.title.as_deref(), Some("7"));
    }

    #[test]
    fn test_all_null_rows_are_dropped() {
        let rows = vec![
            FlatRecord::from_event(&json!({"title": "A"})),
            FlatRecord::from_event(&json!({"unrelated": "x"})),
            FlatRecord::from_event(&json!({"title": "B"})),
        ];
        let set = RecordSet::from_flat_records(rows);

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_all_null_columns_are_dropped() {
        let rows = vec![
            FlatRecord::from_event(&json!({"title": "A", "lang": "ar"})),
            FlatRecord::from_event(&json!({"title": "B"})),
        ];
        let set = RecordSet::from_flat_records(rows);

        // Only the title and language columns survive; language stays
        // because one row has it, and row B carries an explicit null there.
        assert_eq!(set.columns(), vec!["أسم الفعالية", "اللغة"]);
        assert_eq!(set.records()[1]["اللغة"], Value::Null);
    }

    #[test]
    fn test_row_pruning_uses_original_column_set() {
        // The second row is null only in columns that survive pruning; it
        // must still be kept because it was non-null in the original set.
        let rows = vec![
            FlatRecord::from_event(&json!({"title": "A"})),
            FlatRecord::from_event(&json!({"location": "Riyadh"})),
        ];
        let set = RecordSet::from_flat_records(rows);

        assert_eq!(set.len(), 2);
        assert_eq!(set.columns(), vec!["أسم الفعالية", "الموقع"]);
    }

    #[test]
    fn test_envelope_round_trip_preserves_order_and_values() {
        let rows = vec![
            FlatRecord::from_event(&json!({"title": "A", "location": "Jeddah"})),
            FlatRecord::from_event(&json!({"title": "B"})),
        ];
        let set = RecordSet::from_flat_records(rows);

        let envelope = set.to_envelope().unwrap();
        let decoded = RecordSet::from_envelope(&envelope).unwrap();

        assert_eq!(decoded, set);
    }

    #[test]
    fn test_empty_input_yields_empty_set() {
        let set = RecordSet::from_flat_records(Vec::new());
        assert!(set.is_empty());
        assert!(set.columns().is_empty());
    }
}
