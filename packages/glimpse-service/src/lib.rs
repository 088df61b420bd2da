pub mod catalog;
pub mod folders;
pub mod index;
pub mod ingest;
pub mod search;
pub mod time_serde;

mod error;

pub use catalog::{Catalog, NewObject, Object};
pub use error::{Error, Result};
pub use folders::{CreateFolderRequest, FolderContents, UpdateFolderRequest};
pub use glimpse_domain::folder::Folder;
pub use index::{FacetIndex, QdrantFacetIndex};
pub use ingest::{UploadRequest, UploadResponse};
pub use search::{ResolvedQuery, SearchItem, SearchRequest, SearchResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use glimpse_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use glimpse_domain::folder::FolderTree;
use glimpse_providers::{classifier, embedding, rewrite, vision};
use glimpse_storage::{db::Db, qdrant::QdrantStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, glimpse_providers::Result<Vec<Vec<f32>>>>;
}

/// Image-to-text model.
pub trait VisionProvider
where
	Self: Send + Sync,
{
	fn describe<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, glimpse_providers::Result<String>>;
}

/// Text model that answers with the raw search-content JSON object.
pub trait ClassifierProvider
where
	Self: Send + Sync,
{
	fn classify<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, glimpse_providers::Result<Value>>;
}

pub trait QueryRewriteProvider
where
	Self: Send + Sync,
{
	fn rewrite<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, glimpse_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub vision: Arc<dyn VisionProvider>,
	pub classifier: Arc<dyn ClassifierProvider>,
	pub query_rewrite: Arc<dyn QueryRewriteProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		vision: Arc<dyn VisionProvider>,
		classifier: Arc<dyn ClassifierProvider>,
		query_rewrite: Arc<dyn QueryRewriteProvider>,
	) -> Self {
		Self { embedding, vision, classifier, query_rewrite }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			embedding: provider.clone(),
			vision: provider.clone(),
			classifier: provider.clone(),
			query_rewrite: provider,
		}
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, glimpse_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}
impl VisionProvider for DefaultProviders {
	fn describe<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, glimpse_providers::Result<String>> {
		Box::pin(vision::describe(cfg, messages))
	}
}
impl ClassifierProvider for DefaultProviders {
	fn classify<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, glimpse_providers::Result<Value>> {
		Box::pin(classifier::classify(cfg, messages))
	}
}
impl QueryRewriteProvider for DefaultProviders {
	fn rewrite<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, glimpse_providers::Result<String>> {
		Box::pin(rewrite::rewrite(cfg, messages))
	}
}

/// The catalog engine. Collaborators are injected once and shared across requests.
pub struct GlimpseService {
	pub cfg: Config,
	pub index: Arc<dyn FacetIndex>,
	pub catalog: Arc<dyn Catalog>,
	pub providers: Providers,
}
impl GlimpseService {
	pub fn new(
		cfg: Config,
		index: Arc<dyn FacetIndex>,
		catalog: Arc<dyn Catalog>,
		providers: Providers,
	) -> Self {
		Self { cfg, index, catalog, providers }
	}

	/// Connects Postgres and Qdrant, bootstraps both, and wires the HTTP providers.
	pub async fn connect(cfg: Config) -> Result<Self> {
		let db = Db::connect(&cfg.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&cfg.storage.qdrant)?;

		qdrant.ensure_collection().await?;

		let providers = Providers::default();
		let index = QdrantFacetIndex::new(
			qdrant,
			providers.embedding.clone(),
			cfg.providers.embedding.clone(),
		);

		Ok(Self::new(cfg, Arc::new(index), Arc::new(db), providers))
	}

	/// Maps a raw classifier folder id to an integer. Never fails.
	pub fn classify_folder(&self, raw: &Value) -> i64 {
		glimpse_domain::classify::coerce_folder_id(raw)
	}

	pub async fn folder_tree(&self) -> Result<FolderTree> {
		Ok(FolderTree::new(self.catalog.list_folders().await?))
	}

	pub async fn render_folder_tree(&self) -> Result<String> {
		Ok(self.folder_tree().await?.render()?)
	}
}
