use serde_json::Value;

use glimpse_config::LlmProviderConfig;

use crate::Result;

/// Asks the vision model for a description of the image carried in `messages`.
pub async fn describe(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let json = crate::chat::complete(cfg, messages, false).await?;

	crate::chat::first_choice_text(&json)
}
