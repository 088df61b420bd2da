use qdrant_client::qdrant::{
	CreateCollectionBuilder, Distance, VectorParamsBuilder, VectorsConfigBuilder,
};

use crate::Result;

pub const DENSE_VECTOR_NAME: &str = "dense";

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &glimpse_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the facet collection with a cosine dense vector when it does not exist yet.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		let create =
			CreateCollectionBuilder::new(self.collection.clone()).vectors_config(vectors_config);

		self.client.create_collection(create).await?;

		tracing::info!(
			collection = %self.collection,
			vector_dim = self.vector_dim,
			"Qdrant collection created."
		);

		Ok(())
	}
}
