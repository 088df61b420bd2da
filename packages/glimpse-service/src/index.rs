//! Facet index writes and the Qdrant-backed [`FacetIndex`].

use std::{collections::HashMap, sync::Arc};

use qdrant_client::{
	client::Payload,
	qdrant::{
		Condition, CountPointsBuilder, DeletePointsBuilder, Filter, PointStruct, Query,
		QueryPointsBuilder, Range, UpsertPointsBuilder, Vector, value::Kind,
	},
};
use serde_json::Value;
use uuid::Uuid;

use glimpse_config::EmbeddingProviderConfig;
use glimpse_domain::{
	content::SearchContent,
	facet::{self, Facet, FacetId},
	ranking::FacetHit,
};
use glimpse_storage::qdrant::{DENSE_VECTOR_NAME, QdrantStore};

use crate::{BoxFuture, EmbeddingProvider, Error, GlimpseService, Result};

/// Namespace for deriving point ids from encoded facet ids.
const FACET_POINT_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_3a52_9e0d_4b7a_8f21_5d94_c3e8_07ab);

/// Vector store holding facets.
pub trait FacetIndex
where
	Self: Send + Sync,
{
	fn insert<'a>(&'a self, facet: &'a Facet) -> BoxFuture<'a, Result<()>>;

	/// Up to `k` facets ordered by similarity to `text`, most similar first.
	fn query_nearest<'a>(&'a self, text: &'a str, k: usize) -> BoxFuture<'a, Result<Vec<FacetHit>>>;

	fn count(&self) -> BoxFuture<'_, Result<u64>>;

	/// Drops the question facets of `object_id` whose ordinal is `question_count` or higher.
	fn remove_stale_questions(
		&self,
		object_id: i64,
		question_count: u32,
	) -> BoxFuture<'_, Result<()>>;
}

/// Inserts facets one at a time. The first failure stops the write and is returned.
pub async fn write(index: &dyn FacetIndex, facets: &[Facet]) -> Result<()> {
	for facet in facets {
		index.insert(facet).await?;
	}

	Ok(())
}

/// Replaces the facets of one object.
///
/// Facet ids are stable, so the new set overwrites the old one in place. Question facets beyond
/// the new set are removed only after every write succeeded; a failed write leaves the previous
/// facets searchable.
pub async fn reindex(index: &dyn FacetIndex, object_id: i64, facets: &[Facet]) -> Result<()> {
	write(index, facets).await?;

	let question_count = facets.iter().filter_map(|facet| facet.kind().ordinal()).count() as u32;

	index.remove_stale_questions(object_id, question_count).await
}

pub fn point_id(facet_id: &FacetId) -> Uuid {
	Uuid::new_v5(&FACET_POINT_NAMESPACE, facet_id.encode().as_bytes())
}

impl GlimpseService {
	/// Decomposes `content` into facets and replaces whatever the index held for `object_id`.
	pub async fn ingest(&self, content: &SearchContent, object_id: i64) -> Result<usize> {
		let facets = facet::decompose(object_id, content);

		reindex(self.index.as_ref(), object_id, &facets).await?;

		tracing::info!(object_id, facet_count = facets.len(), "Object indexed.");

		Ok(facets.len())
	}
}

pub struct QdrantFacetIndex {
	qdrant: QdrantStore,
	embedding: Arc<dyn EmbeddingProvider>,
	embedding_cfg: EmbeddingProviderConfig,
}
impl QdrantFacetIndex {
	pub fn new(
		qdrant: QdrantStore,
		embedding: Arc<dyn EmbeddingProvider>,
		embedding_cfg: EmbeddingProviderConfig,
	) -> Self {
		Self { qdrant, embedding, embedding_cfg }
	}

	async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
		let texts = [text.to_string()];
		let mut vectors = self.embedding.embed(&self.embedding_cfg, &texts).await?;
		let vector = vectors.pop().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if vector.len() != self.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}
}
impl FacetIndex for QdrantFacetIndex {
	fn insert<'a>(&'a self, facet: &'a Facet) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let vector = self.embed_one(&facet.content).await?;
			let mut payload = Payload::new();

			payload.insert("facet_id", facet.id.encode());
			payload.insert("object_id", facet.object_id());
			payload.insert("kind", facet.kind().as_str());
			payload.insert(
				"ordinal",
				facet.kind().ordinal().map(Value::from).unwrap_or(Value::Null),
			);

			let mut vectors = HashMap::new();

			vectors.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(vector));

			let point = PointStruct::new(point_id(&facet.id).to_string(), vectors, payload);

			let upsert =
				UpsertPointsBuilder::new(self.qdrant.collection.clone(), vec![point]).wait(true);

			self.qdrant.client.upsert_points(upsert).await?;

			Ok(())
		})
	}

	fn query_nearest<'a>(
		&'a self,
		text: &'a str,
		k: usize,
	) -> BoxFuture<'a, Result<Vec<FacetHit>>> {
		Box::pin(async move {
			if k == 0 {
				return Ok(Vec::new());
			}

			let vector = self.embed_one(text).await?;
			let search = QueryPointsBuilder::new(self.qdrant.collection.clone())
				.query(Query::new_nearest(vector))
				.using(DENSE_VECTOR_NAME)
				.with_payload(true)
				.limit(k as u64);
			let response = self.qdrant.client.query(search).await?;
			let hits = response
				.result
				.into_iter()
				.filter_map(|point| {
					let facet_id = match point.payload.get("facet_id").and_then(|v| v.kind.as_ref())
					{
						Some(Kind::StringValue(text)) => text.clone(),
						_ => return None,
					};

					Some(FacetHit { facet_id, similarity: point.score })
				})
				.collect();

			Ok(hits)
		})
	}

	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let response = self
				.qdrant
				.client
				.count(CountPointsBuilder::new(self.qdrant.collection.clone()).exact(true))
				.await?;

			Ok(response.result.map(|result| result.count).unwrap_or_default())
		})
	}

	fn remove_stale_questions(
		&self,
		object_id: i64,
		question_count: u32,
	) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let filter = Filter::must([
				Condition::matches("object_id", object_id),
				Condition::matches("kind", "question".to_string()),
				Condition::range("ordinal", Range {
					gte: Some(f64::from(question_count)),
					..Default::default()
				}),
			]);
			let delete = DeletePointsBuilder::new(self.qdrant.collection.clone())
				.points(filter)
				.wait(true);

			self.qdrant.client.delete_points(delete).await?;

			tracing::debug!(object_id, question_count, "Removed stale question facets.");

			Ok(())
		})
	}
}
