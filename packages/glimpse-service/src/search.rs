use serde::{Deserialize, Serialize};
use serde_json::Value;

use glimpse_domain::ranking::{self, FetchPlan};

use crate::{Catalog, Error, FacetIndex, GlimpseService, Object, Result};

const REWRITE_SYSTEM_PROMPT: &str = "\
You normalize search queries for a screenshot catalog. Do not use earlier context. \
Remove conversational filler but never explain or replace key terms, since the result is \
matched by keywords and meaning. Describe the query from several angles when it helps. \
Answer with JSON only, in the form {\"response\": \"<normalized query>\"}.

Examples:
Query: a linked list problem I solved
Answer: {\"response\": \"linked list, algorithm problem\"}
Query: an article about traditional medicine
Answer: {\"response\": \"traditional medicine, medicine, article\"}";

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
	pub query: String,
	/// Absent or non-positive values fall back to `search.default_limit`.
	#[serde(default)]
	pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchItem {
	#[serde(flatten)]
	pub object: Object,
	pub similarity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
	/// The text actually sent to the index, after any rewrite.
	pub query: String,
	pub items: Vec<SearchItem>,
	pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedQuery {
	pub items: Vec<SearchItem>,
	pub count: usize,
}

/// Resolves `query` into at most `min(limit, index.count())` objects, best match first.
///
/// The index is over-fetched by `overfetch_multiplier` so that several facets of one object do
/// not crowd out other objects. An empty index is never queried.
pub async fn resolve(
	index: &dyn FacetIndex,
	catalog: &dyn Catalog,
	query: &str,
	limit: usize,
	overfetch_multiplier: usize,
) -> Result<ResolvedQuery> {
	let available = usize::try_from(index.count().await?).unwrap_or(usize::MAX);
	let Some(plan) = FetchPlan::new(limit, available, overfetch_multiplier) else {
		return Ok(ResolvedQuery::default());
	};
	let hits = index.query_nearest(query, plan.fetch).await?;
	let scores = ranking::dedup_by_object(&hits);

	tracing::debug!(
		fetch = plan.fetch,
		hit_count = hits.len(),
		object_count = scores.len(),
		"Facet hits collected."
	);

	let mut items = Vec::with_capacity(scores.len());

	for score in scores {
		let object_id = score.object_id;

		match catalog.get_object(object_id).await {
			Ok(Some(object)) => items.push(SearchItem { object, similarity: score.similarity }),
			Ok(None) => tracing::debug!(object_id, "Dropping hit for missing object."),
			Err(err) => {
				tracing::warn!(object_id, error = %err, "Dropping hit after failed object lookup.");
			},
		}
	}

	ranking::rank(&mut items, |item| item.similarity);
	items.truncate(plan.effective_limit);

	let count = items.len();

	Ok(ResolvedQuery { items, count })
}

impl GlimpseService {
	pub async fn resolve_query(&self, query: &str, limit: usize) -> Result<ResolvedQuery> {
		resolve(
			self.index.as_ref(),
			self.catalog.as_ref(),
			query,
			limit,
			self.cfg.search.overfetch_multiplier as usize,
		)
		.await
	}

	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let limit = normalize_limit(req.limit, self.cfg.search.default_limit);
		let query = self.rewrite_query(query).await;
		let resolved = self.resolve_query(&query, limit).await?;

		tracing::info!(limit, count = resolved.count, "Search resolved.");

		Ok(SearchResponse { query, items: resolved.items, count: resolved.count })
	}

	/// Standardized form of `query` when rewriting is enabled. Falls back to `query` on any
	/// provider failure or empty answer.
	async fn rewrite_query(&self, query: &str) -> String {
		if !self.cfg.search.rewrite_query {
			return query.to_string();
		}

		let Some(cfg) = self.cfg.providers.query_rewrite.as_ref() else {
			return query.to_string();
		};
		let messages = rewrite_messages(query);

		match self.providers.query_rewrite.rewrite(cfg, &messages).await {
			Ok(rewritten) if !rewritten.trim().is_empty() => {
				tracing::debug!(rewritten = %rewritten, "Query rewritten.");

				rewritten.trim().to_string()
			},
			Ok(_) => {
				tracing::warn!("Query rewrite returned an empty answer. Using the original query.");

				query.to_string()
			},
			Err(err) => {
				tracing::warn!(error = %err, "Query rewrite failed. Using the original query.");

				query.to_string()
			},
		}
	}
}

pub fn normalize_limit(limit: Option<i64>, default_limit: u32) -> usize {
	match limit {
		Some(limit) if limit > 0 => usize::try_from(limit).unwrap_or(usize::MAX),
		_ => default_limit as usize,
	}
}

fn rewrite_messages(query: &str) -> Vec<Value> {
	vec![
		serde_json::json!({ "role": "system", "content": REWRITE_SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": format!("Query: {query}") }),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn non_positive_limits_use_the_default() {
		assert_eq!(normalize_limit(None, 3), 3);
		assert_eq!(normalize_limit(Some(0), 3), 3);
		assert_eq!(normalize_limit(Some(-4), 3), 3);
		assert_eq!(normalize_limit(Some(12), 3), 12);
	}

	#[test]
	fn rewrite_prompt_carries_the_query() {
		let messages = rewrite_messages("my linked list problem");

		assert_eq!(messages.len(), 2);
		assert_eq!(messages[1]["content"], "Query: my linked list problem");
	}
}
