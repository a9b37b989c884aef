//! Output formatting.
//!
//! Records print as indented JSON with sorted keys:
//!
//! ```json
//! {
//!   "payload": { … },
//!   "storage_id": "…",
//!   "version": 2
//! }
//! ```

use tracedoc::json::to_json_pretty;
use tracedoc::{StoredRecord, Value};

fn record_value(record: &StoredRecord) -> Value {
    Value::object([
        ("storage_id", Value::String(record.storage_id.to_string())),
        ("version", Value::Int(record.version as i64)),
        ("payload", record.payload.clone()),
    ])
}

/// Format one record.
pub fn format_record(record: &StoredRecord) -> String {
    to_json_pretty(&record_value(record))
}

/// Format a list of records as a JSON array.
pub fn format_records(records: &[StoredRecord]) -> String {
    to_json_pretty(&Value::Array(records.iter().map(record_value).collect()))
}
