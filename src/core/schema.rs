use serde_json::Value;

use crate::core::types::{FieldDescriptor, Record};

/// Derive column descriptors from a sample record.
///
/// One descriptor per key, in the record's own key order.
pub fn infer(sample: &Record) -> Vec<FieldDescriptor> {
    sample.keys().map(FieldDescriptor::new).collect()
}

/// Derive column descriptors from a freshly fetched row set.
///
/// Only the first row is consulted. An empty row set yields an empty list;
/// nothing from a previous fetch is carried over.
pub fn infer_from_rows(rows: &[Record]) -> Vec<FieldDescriptor> {
    rows.first().map(infer).unwrap_or_default()
}

/// Convert a fetched JSON payload into rows.
///
/// Anything other than an array yields no rows. Array elements that are not
/// objects become empty records so that row positions are preserved.
pub fn rows_from_payload(payload: Value) -> Vec<Record> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => record,
                _ => Record::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
