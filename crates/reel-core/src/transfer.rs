//! JSON import and export of media items.
//!
//! Exports are a pretty-printed JSON array of complete items. Imports are
//! all-or-nothing: one malformed entry rejects the whole file.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::ReelError;
use crate::models::{MediaItem, NewMedia};

const EXPORT_PREFIX: &str = "mediatracker-export";

/// Suggested export name for a given day, without extension.
pub fn default_export_name(date: NaiveDate) -> String {
    format!("{EXPORT_PREFIX}-{}", date.format("%Y-%m-%d"))
}

/// File name for a user-chosen export name; blank names fall back to the prefix.
pub fn export_file_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("{EXPORT_PREFIX}.json")
    } else {
        format!("{name}.json")
    }
}

/// Serialize the selected items (in collection order).
pub fn export_media(items: &[MediaItem], selected_ids: &[String]) -> Result<String, ReelError> {
    if selected_ids.is_empty() {
        return Err(ReelError::Export("no items selected".into()));
    }
    let chosen: Vec<&MediaItem> = items
        .iter()
        .filter(|m| selected_ids.contains(&m.id))
        .collect();
    Ok(serde_json::to_string_pretty(&chosen)?)
}

/// Validate an export file and turn each entry into an add payload.
///
/// Every entry needs a non-empty `id`, `title` and `type` and an array
/// `seasons`. The stored `id` and `dateAdded` are not carried over.
pub fn parse_import(json: &str) -> Result<Vec<NewMedia>, ReelError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ReelError::Import(format!("invalid JSON: {e}")))?;
    let Value::Array(entries) = value else {
        return Err(ReelError::Import("expected a JSON array of items".into()));
    };

    if let Some(pos) = entries.iter().position(|e| !is_valid_entry(e)) {
        return Err(ReelError::Import(format!(
            "entry {pos} is missing id, title, type or seasons"
        )));
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(pos, entry)| {
            serde_json::from_value(entry)
                .map_err(|e| ReelError::Import(format!("entry {pos}: {e}")))
        })
        .collect()
}

fn is_valid_entry(entry: &Value) -> bool {
    let field = |name: &str| entry.get(name).is_some_and(is_truthy);
    field("id")
        && field("title")
        && field("type")
        && entry.get("seasons").is_some_and(Value::is_array)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
