//! End-to-end upload: describe, classify against the folder tree, store, index.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use glimpse_domain::{classify, content::SearchContent};

use crate::{Error, GlimpseService, NewObject, Result};

const DEFAULT_MEDIA_TYPE: &str = "image/png";
const FALLBACK_NAME: &str = "Untitled screenshot";
const HOUR_MS: i64 = 3_600_000;

const VISION_PROMPT: &str = "\
You analyze screenshots and turn them into useful, searchable information. Describe this \
screenshot in detail: visible text, interface elements, the application and any steps being \
performed. State the capture time, source application and tags first when they are given. \
End the description with a short verbatim excerpt of 15 to 20 characters that could locate \
the original content, and the sites it most likely came from, formatted as \
'possible sites': '...', 'original excerpt': '...'.";

const CLASSIFIER_SYSTEM_PROMPT: &str = "\
You turn a screenshot description and a folder structure into search metadata. \
1. name: a concise title of at most 20 characters, usable as a file name. \
2. digest: a summary of about 150 characters keeping key attributes such as capture time, \
source application and tags. \
3. folder_id: the ID of the most suitable folder. Parent folders usually name a brand or \
category and children are more specific, so prefer the deepest matching folder. \
4. keywords: 5 to 10 comma-separated keywords, including the capture time truncated to the \
half hour. \
5. questions: 3 or 4 phrases a user might type to find this screenshot again. \
6. scenario: a short description of the situation shown. \
7. from_site and origin_content: copy the possible sites and original excerpt from the end of \
the description unchanged. \
Answer with a single JSON object with exactly these keys: name, digest, folder_id, keywords, \
questions, scenario, from_site, origin_content.";

#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
	/// Base64 image bytes. A `data:<media type>;base64,` prefix is accepted.
	pub image: String,
	/// Preferred folder. Ignored when it does not exist.
	#[serde(default)]
	pub folder_id: Option<i64>,
	#[serde(default)]
	pub media_type: Option<String>,
	/// Capture time in Unix milliseconds.
	#[serde(default)]
	pub captured_at_ms: Option<i64>,
	#[serde(default)]
	pub app_name: Option<String>,
	#[serde(default)]
	pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResponse {
	pub object_id: i64,
	pub name: String,
	pub description: String,
	pub digest: String,
	pub folder_id: i64,
	pub facet_count: usize,
}

struct DecodedImage {
	media_type: String,
	base64: String,
	bytes: Vec<u8>,
}

impl GlimpseService {
	pub async fn upload(&self, req: UploadRequest) -> Result<UploadResponse> {
		let image = decode_image(&req)?;
		let description = self
			.providers
			.vision
			.describe(&self.cfg.providers.vision, &vision_messages(&req, &image))
			.await?;

		if description.trim().is_empty() {
			return Err(Error::Provider {
				message: "Vision model returned no description.".to_string(),
			});
		}

		let tree = self.folder_tree().await?;
		let rendered = tree.render()?;
		let raw = self
			.providers
			.classifier
			.classify(&self.cfg.providers.classifier, &classifier_messages(&description, &rendered))
			.await?;
		let content = SearchContent::from_model_output(&raw)?;
		let folder_id =
			classify::place(raw.get("folder_id").unwrap_or(&Value::Null), req.folder_id, &tree);

		if folder_id != content.folder_id {
			tracing::debug!(
				suggested = content.folder_id,
				folder_id,
				"Classifier placement adjusted."
			);
		}

		let name = match content.name.trim() {
			"" => FALLBACK_NAME.to_string(),
			name => name.to_string(),
		};
		let object_id = self
			.catalog
			.create_object(&NewObject {
				name: name.clone(),
				payload: image.bytes,
				description: description.clone(),
				folder_id,
				provenance: content.from_site.clone(),
			})
			.await?;
		let facet_count = self.ingest(&content, object_id).await?;

		tracing::info!(object_id, folder_id, facet_count, "Object uploaded.");

		Ok(UploadResponse {
			object_id,
			name,
			description,
			digest: content.digest,
			folder_id,
			facet_count,
		})
	}
}

fn decode_image(req: &UploadRequest) -> Result<DecodedImage> {
	let raw = req.image.trim();
	let (prefix_media_type, encoded) = match raw.strip_prefix("data:") {
		Some(rest) => {
			let (header, data) = rest.split_once(',').ok_or_else(|| Error::InvalidRequest {
				message: "image data URL is missing its payload.".to_string(),
			})?;

			(header.strip_suffix(";base64").map(str::to_string), data)
		},
		None => (None, raw),
	};

	if encoded.is_empty() {
		return Err(Error::InvalidRequest { message: "image must be non-empty.".to_string() });
	}

	let bytes = STANDARD.decode(encoded).map_err(|err| Error::InvalidRequest {
		message: format!("image is not valid base64: {err}."),
	})?;
	let media_type = req
		.media_type
		.clone()
		.or(prefix_media_type)
		.filter(|media_type| !media_type.trim().is_empty())
		.unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

	Ok(DecodedImage { media_type, base64: encoded.to_string(), bytes })
}

fn vision_messages(req: &UploadRequest, image: &DecodedImage) -> Vec<Value> {
	let mut prompt = String::new();

	if let Some(captured_at_ms) = req.captured_at_ms.filter(|ms| *ms > 0) {
		prompt.push_str(&format!(
			"Capture time (Unix milliseconds, hour precision): {}\n",
			captured_at_ms / HOUR_MS * HOUR_MS
		));
	}
	if let Some(app_name) = req.app_name.as_deref().filter(|value| !value.trim().is_empty()) {
		prompt.push_str(&format!("Source application: {app_name}\n"));
	}
	if let Some(tags) = req.tags.as_deref().filter(|value| !value.trim().is_empty()) {
		prompt.push_str(&format!("Tags: {tags}\n"));
	}

	prompt.push_str(VISION_PROMPT);

	vec![serde_json::json!({
		"role": "user",
		"content": [
			{
				"type": "image_url",
				"image_url": { "url": format!("data:{};base64,{}", image.media_type, image.base64) }
			},
			{ "type": "text", "text": prompt }
		]
	})]
}

fn classifier_messages(description: &str, folder_tree: &str) -> Vec<Value> {
	vec![
		serde_json::json!({ "role": "system", "content": CLASSIFIER_SYSTEM_PROMPT }),
		serde_json::json!({
			"role": "user",
			"content": format!("Screenshot description:\n{description}\n\n{folder_tree}"),
		}),
	]
}
