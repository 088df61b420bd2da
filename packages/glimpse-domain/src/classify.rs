use serde_json::Value;

use crate::folder::{FolderTree, ROOT_FOLDER_ID};

/// Reads a folder id out of whatever representation the text model produced.
///
/// Integers pass through, finite floats are truncated, strings are parsed after trimming.
/// Everything else files at the root.
pub fn coerce_folder_id(raw: &Value) -> i64 {
	match raw {
		Value::Number(number) =>
			if let Some(id) = number.as_i64() {
				id
			} else if let Some(id) = number.as_f64().and_then(float_to_id) {
				id
			} else {
				ROOT_FOLDER_ID
			},
		Value::String(text) => text.trim().parse().unwrap_or(ROOT_FOLDER_ID),
		_ => ROOT_FOLDER_ID,
	}
}

/// Final placement for a new object.
///
/// A caller-chosen folder wins when it exists, then the classifier's suggestion when it exists,
/// then the root.
pub fn place(raw: &Value, requested: Option<i64>, tree: &FolderTree) -> i64 {
	if let Some(folder_id) = requested.filter(|folder_id| tree.contains(*folder_id)) {
		return folder_id;
	}

	let suggested = coerce_folder_id(raw);

	if tree.contains(suggested) { suggested } else { ROOT_FOLDER_ID }
}

fn float_to_id(value: f64) -> Option<i64> {
	if !value.is_finite() {
		return None;
	}

	let truncated = value.trunc();

	if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
		return None;
	}

	Some(truncated as i64)
}
