//! Shaping of string lists: element checks, deduplication and ordering.

use std::collections::HashSet;

use crate::core::value::{StringList, Value};
use crate::error::{Error, Result};

/// Unpack an accepted container into its items, in natural order.
///
/// Scalars, including a bare string, are rejected as a whole.
pub fn container_items(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::List(list) => Ok(list.iter().cloned().map(Value::Str).collect()),
        Value::Collection(collection) => Ok(collection.into_items()),
        other => Err(Error::type_mismatch(
            "value",
            "collection",
            other.type_name(),
        )),
    }
}

/// Unwrap a container item that must be a string.
pub fn expect_str(item: Value) -> Result<String> {
    match item {
        Value::Str(s) => Ok(s),
        other => Err(Error::type_mismatch("item", "str", other.type_name())),
    }
}

/// Flatten an accepted container into its string items.
///
/// The first non-string item fails the whole conversion.
pub fn collect_strings(value: Value) -> Result<Vec<String>> {
    container_items(value)?
        .into_iter()
        .map(expect_str)
        .collect()
}

/// Drop later duplicates, keeping each first occurrence in place.
pub fn dedup_keep_first(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Apply `unique` then `sorted` and freeze the result.
pub fn shape(items: Vec<String>, unique: bool, sorted: bool) -> StringList {
    let mut items = if unique {
        dedup_keep_first(items)
    } else {
        items
    };
    if sorted {
        items.sort();
    }
    items.into()
}
