use serde_json::Value;

use glimpse_config::LlmProviderConfig;

use crate::{Error, Result};

/// Runs the classification prompt and returns the model's JSON object.
pub async fn classify(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<Value> {
	let json = crate::chat::complete(cfg, messages, true).await?;

	parse_classifier_json(&json)
}

fn parse_classifier_json(json: &Value) -> Result<Value> {
	let text = crate::chat::first_choice_text(json)?;
	let parsed: Value = serde_json::from_str(strip_code_fence(&text)).map_err(|_| {
		Error::InvalidResponse { message: "Classifier content is not valid JSON.".to_string() }
	})?;

	if !parsed.is_object() {
		return Err(Error::InvalidResponse {
			message: "Classifier content must be a JSON object.".to_string(),
		});
	}

	Ok(parsed)
}

fn strip_code_fence(text: &str) -> &str {
	let trimmed = text.trim();
	let Some(inner) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let inner = inner.strip_prefix("json").unwrap_or(inner);

	inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_choice_content_json() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "{\"name\": \"Receipt\", \"folder_id\": 3}" } }
			]
		});
		let parsed = parse_classifier_json(&json).expect("parse failed");

		assert_eq!(parsed.get("folder_id"), Some(&serde_json::json!(3)));
	}

	#[test]
	fn tolerates_fenced_json() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "```json\n{\"keywords\": \"a,b\"}\n```" } }
			]
		});
		let parsed = parse_classifier_json(&json).expect("parse failed");

		assert_eq!(parsed.get("keywords"), Some(&serde_json::json!("a,b")));
	}

	#[test]
	fn rejects_non_object_content() {
		let json = serde_json::json!({
			"choices": [{ "message": { "content": "[1, 2, 3]" } }]
		});

		assert!(parse_classifier_json(&json).is_err());
	}
}
