use std::collections::BTreeMap;

use serde_json::Value;

use crate::datekey::date_key_prefix;

/// Items grouped under their `YYYY-MM-DD` key, each bucket in input order.
pub type DateBucketMap<T> = BTreeMap<String, Vec<T>>;

/// Groups `items` by the day part of the date string `field` selects.
/// Items without a date are unscheduled and land in no bucket.
pub fn group_by_date<'a, T, F>(items: &'a [T], field: F) -> DateBucketMap<&'a T>
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut buckets: DateBucketMap<&'a T> = BTreeMap::new();
    let mut unscheduled = 0_usize;

    for item in items {
        let Some(key) = field(item).and_then(date_key_prefix) else {
            unscheduled += 1;
            continue;
        };
        buckets.entry(key.to_string()).or_default().push(item);
    }

    tracing::trace!(
        items = items.len(),
        buckets = buckets.len(),
        unscheduled,
        "grouped items by date"
    );
    buckets
}

/// [`group_by_date`] over untyped records, picking the date by field name.
/// Strings are used as is; `null`, missing fields and empty strings are
/// skipped; other scalars use their JSON text.
#[must_use]
pub fn group_values_by_date<'a>(values: &'a [Value], field_name: &str) -> DateBucketMap<&'a Value> {
    let mut buckets: DateBucketMap<&'a Value> = BTreeMap::new();

    for value in values {
        let raw = match value.get(field_name) {
            None | Some(Value::Null) => continue,
            Some(Value::String(raw)) => raw.clone(),
            Some(other) => other.to_string(),
        };
        let Some(key) = date_key_prefix(&raw) else {
            continue;
        };
        buckets.entry(key.to_string()).or_default().push(value);
    }

    buckets
}
