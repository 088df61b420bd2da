use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Error, Result, classify};

/// Search metadata derived by the text model for one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchContent {
	pub name: String,
	pub digest: String,
	pub folder_id: i64,
	/// Comma-separated.
	pub keywords: String,
	pub questions: Vec<String>,
	pub scenario: String,
	pub from_site: String,
	pub origin_content: String,
}
impl SearchContent {
	/// Builds content from the classifier's JSON answer. Missing fields become empty and the
	/// folder id goes through [`classify::coerce_folder_id`].
	pub fn from_model_output(value: &Value) -> Result<Self> {
		if !value.is_object() {
			return Err(Error::InvalidContent {
				message: "Classifier output must be a JSON object.".to_string(),
			});
		}

		let raw = RawSearchContent::deserialize(value)
			.map_err(|err| Error::InvalidContent { message: err.to_string() })?;

		Ok(Self {
			name: raw.name,
			digest: raw.digest,
			folder_id: classify::coerce_folder_id(&raw.folder_id),
			keywords: raw.keywords,
			questions: raw.questions,
			scenario: raw.scenario,
			from_site: raw.from_site,
			origin_content: raw.origin_content,
		})
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSearchContent {
	#[serde(deserialize_with = "lenient_string")]
	name: String,
	#[serde(deserialize_with = "lenient_string")]
	digest: String,
	folder_id: Value,
	#[serde(deserialize_with = "keyword_list")]
	keywords: String,
	#[serde(deserialize_with = "question_list")]
	questions: Vec<String>,
	#[serde(deserialize_with = "lenient_string")]
	scenario: String,
	#[serde(deserialize_with = "lenient_string")]
	from_site: String,
	#[serde(deserialize_with = "lenient_string")]
	origin_content: String,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::String(text) => text,
		Value::Null => String::new(),
		other => other.to_string(),
	})
}

fn keyword_list<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::String(text) => text,
		Value::Array(items) => items
			.iter()
			.filter_map(|item| item.as_str())
			.map(str::trim)
			.filter(|item| !item.is_empty())
			.collect::<Vec<_>>()
			.join(","),
		_ => String::new(),
	})
}

fn question_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::Array(items) => items
			.into_iter()
			.filter_map(|item| match item {
				Value::String(text) => Some(text),
				_ => None,
			})
			.collect(),
		Value::String(text) if !text.trim().is_empty() => vec![text],
		_ => Vec::new(),
	})
}
