//! Timeline dataset loading plus the CSV-to-JSON preprocessing pipeline.

mod ingest;

use std::fs;
use std::path::Path;

use chronicle_core::{Dataset, TimelineError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use ingest::{
    build_dataset_from_csv_dir, build_dataset_from_readers, infer_category, DYNASTIES_FILE,
    EVENTS_FILE, FIGURES_FILE,
};

/// File name the browser page fetches at startup.
pub const DATASET_FILE: &str = "timeline_data.json";

/// Parse a dataset from a JSON string.
///
/// Only the shape is checked; inverted year ranges or empty names flow
/// through untouched.
pub fn load_dataset_str(json: &str) -> Result<Dataset, TimelineError> {
    let value: Value =
        serde_json::from_str(json).map_err(|err| TimelineError::Parse(err.to_string()))?;
    load_dataset_value(&value)
}

/// Parse a dataset from an already decoded `serde_json::Value`.
///
/// Records are decoded one by one: a malformed record is skipped with a
/// warning and the rest of its collection still loads.
pub fn load_dataset_value(value: &Value) -> Result<Dataset, TimelineError> {
    let object = value.as_object().ok_or(TimelineError::MissingData)?;

    if !COLLECTIONS.iter().any(|key| object.contains_key(*key)) {
        return Err(TimelineError::MissingData);
    }

    let mut dataset = Dataset {
        dynasties: records(object, "dynasties")?,
        events: records(object, "events")?,
        figures: records(object, "figures")?,
        time_range: optional_field(object, "time_range"),
        generated_at: optional_field(object, "generated_at"),
    };
    if dataset.time_range.is_none() {
        dataset.time_range = dataset.year_bounds();
    }

    tracing::debug!(
        dynasties = dataset.dynasties.len(),
        events = dataset.events.len(),
        figures = dataset.figures.len(),
        "Loaded timeline dataset"
    );

    Ok(dataset)
}

const COLLECTIONS: [&str; 3] = ["dynasties", "events", "figures"];

fn records<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
) -> Result<Vec<T>, TimelineError> {
    let items = match object.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(TimelineError::Parse(format!("`{key}` phải là một mảng"))),
    };

    let parsed: Vec<T> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(collection = key, index, error = %err, "Skipping malformed record");
                None
            }
        })
        .collect();
    Ok(parsed)
}

fn optional_field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key).filter(|value| !value.is_null())?;
    T::deserialize(value)
        .map_err(|err| tracing::warn!(field = key, error = %err, "Ignoring malformed field"))
        .ok()
}

/// Read and parse the dataset file at `path`.
pub fn load_dataset_path(path: &Path) -> Result<Dataset, TimelineError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| TimelineError::Io(format!("{}: {err}", path.display())))?;
    load_dataset_str(&raw)
}

/// Write the dataset as pretty-printed JSON, keeping CJK text unescaped.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<(), TimelineError> {
    let json = serde_json::to_string_pretty(dataset)
        .map_err(|err| TimelineError::Other(err.to_string()))?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| TimelineError::Io(format!("{}: {err}", parent.display())))?;
    }

    fs::write(path, json).map_err(|err| TimelineError::Io(format!("{}: {err}", path.display())))?;
    tracing::info!(path = %path.display(), "Wrote timeline dataset");
    Ok(())
}
