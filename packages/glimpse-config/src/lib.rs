mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers, Qdrant, Search,
	Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.search.default_limit == 0 {
		return Err(Error::Validation {
			message: "search.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.overfetch_multiplier == 0 {
		return Err(Error::Validation {
			message: "search.overfetch_multiplier must be at least one.".to_string(),
		});
	}
	if cfg.search.rewrite_query && cfg.providers.query_rewrite.is_none() {
		return Err(Error::Validation {
			message: "providers.query_rewrite is required when search.rewrite_query is true."
				.to_string(),
		});
	}

	let mut keys = vec![
		("embedding", &cfg.providers.embedding.api_key),
		("vision", &cfg.providers.vision.api_key),
		("classifier", &cfg.providers.classifier.api_key),
	];

	if let Some(rewrite) = cfg.providers.query_rewrite.as_ref() {
		keys.push(("query_rewrite", &rewrite.api_key));
	}

	for (label, key) in keys {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	let mut llms =
		vec![("vision", &cfg.providers.vision), ("classifier", &cfg.providers.classifier)];

	if let Some(rewrite) = cfg.providers.query_rewrite.as_ref() {
		llms.push(("query_rewrite", rewrite));
	}

	for (label, provider) in llms {
		if !provider.temperature.is_finite() {
			return Err(Error::Validation {
				message: format!("providers.{label}.temperature must be a finite number."),
			});
		}
		if !(0.0..=2.0).contains(&provider.temperature) {
			return Err(Error::Validation {
				message: format!("providers.{label}.temperature must be in the range 0.0-2.0."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.query_rewrite
		.as_ref()
		.map(|rewrite| rewrite.api_key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.query_rewrite = None;
	}
}
