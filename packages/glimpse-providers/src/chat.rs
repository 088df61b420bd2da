//! OpenAI-compatible chat completion transport shared by the model-backed providers.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

pub async fn complete(
	cfg: &glimpse_config::LlmProviderConfig,
	messages: &[Value],
	json_response: bool,
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});

	if json_response {
		body["response_format"] = serde_json::json!({ "type": "json_object" });
	}

	tracing::debug!(provider_id = %cfg.provider_id, model = %cfg.model, "Calling chat completion.");

	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(json)
}

/// Text of the first choice. Content given as a list of parts is concatenated.
pub fn first_choice_text(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing choices[0].message.content.".to_string(),
		})?;
	let text = match content {
		Value::String(text) => text.clone(),
		Value::Array(parts) => parts
			.iter()
			.filter_map(|part| part.get("text").and_then(|text| text.as_str()))
			.collect::<Vec<_>>()
			.join(""),
		_ => String::new(),
	};

	if text.trim().is_empty() {
		return Err(Error::InvalidResponse {
			message: "Chat response content is empty.".to_string(),
		});
	}

	Ok(text)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_string_content() {
		let json = serde_json::json!({
			"choices": [{ "message": { "content": "A chat window with three messages." } }]
		});

		assert_eq!(
			first_choice_text(&json).expect("parse failed"),
			"A chat window with three messages."
		);
	}

	#[test]
	fn joins_content_parts() {
		let json = serde_json::json!({
			"choices": [{
				"message": { "content": [{ "text": "Part one. " }, { "text": "Part two." }] }
			}]
		});

		assert_eq!(first_choice_text(&json).expect("parse failed"), "Part one. Part two.");
	}

	#[test]
	fn rejects_missing_or_blank_content() {
		assert!(first_choice_text(&serde_json::json!({ "choices": [] })).is_err());
		assert!(
			first_choice_text(&serde_json::json!({
				"choices": [{ "message": { "content": "   " } }]
			}))
			.is_err()
		);
	}
}
