use serde_json::Value;

use glimpse_config::LlmProviderConfig;

use crate::Result;

/// Asks the rewrite model for a standardized search phrase.
///
/// The model is prompted to answer `{"response": "..."}`; a plain-text answer is accepted as is.
pub async fn rewrite(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let json = crate::chat::complete(cfg, messages, false).await?;
	let text = crate::chat::first_choice_text(&json)?;

	Ok(parse_rewrite_text(&text))
}

fn parse_rewrite_text(text: &str) -> String {
	match serde_json::from_str::<Value>(text.trim()) {
		Ok(Value::Object(map)) => map
			.get("response")
			.and_then(|v| v.as_str())
			.map(|v| v.trim().to_string())
			.unwrap_or_default(),
		_ => text.trim().to_string(),
	}
}
