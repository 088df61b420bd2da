use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use glimpse_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_toml_with_search(default_limit: i64, overfetch_multiplier: i64) -> String {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let root = value.as_table_mut().expect("Sample config must be a table.");
	let search = root
		.get_mut("search")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [search].");

	search.insert("default_limit".to_string(), Value::Integer(default_limit));
	search.insert("overfetch_multiplier".to_string(), Value::Integer(overfetch_multiplier));

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("glimpse_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads_and_drops_blank_rewrite_provider() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML.to_string());
	let result = glimpse_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected sample config to load.");

	assert!(cfg.providers.query_rewrite.is_none());
	assert_eq!(cfg.search.default_limit, 3);
	assert_eq!(cfg.search.overfetch_multiplier, 3);
	assert!(cfg.providers.embedding.default_headers.is_empty());
}

#[test]
fn overfetch_multiplier_must_be_at_least_one() {
	let path = write_temp_config(sample_toml_with_search(3, 0));
	let result = glimpse_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected multiplier validation error.");

	assert!(
		err.to_string().contains("search.overfetch_multiplier must be at least one."),
		"Unexpected error: {err}"
	);
}

#[test]
fn default_limit_must_be_positive() {
	let mut cfg = base_config();

	cfg.search.default_limit = 0;

	let err = glimpse_config::validate(&cfg).expect_err("Expected default_limit error.");

	assert!(
		err.to_string().contains("search.default_limit must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let mut cfg = base_config();

	cfg.storage.qdrant.vector_dim = 1_024;

	let err = glimpse_config::validate(&cfg).expect_err("Expected dimension mismatch error.");

	assert!(
		err.to_string()
			.contains("providers.embedding.dimensions must match storage.qdrant.vector_dim."),
		"Unexpected error: {err}"
	);
}

#[test]
fn rewrite_query_requires_rewrite_provider() {
	let mut cfg = base_config();

	cfg.providers.query_rewrite = None;
	cfg.search.rewrite_query = true;

	let err = glimpse_config::validate(&cfg).expect_err("Expected rewrite provider error.");

	assert!(
		err.to_string().contains("providers.query_rewrite is required"),
		"Unexpected error: {err}"
	);
}

#[test]
fn provider_api_keys_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.providers.query_rewrite = None;
	cfg.providers.classifier.api_key = "  ".to_string();

	let err = glimpse_config::validate(&cfg).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("Provider classifier api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn temperature_must_be_in_range() {
	let mut cfg = base_config();

	cfg.providers.query_rewrite = None;
	cfg.providers.vision.temperature = 3.5;

	let err = glimpse_config::validate(&cfg).expect_err("Expected temperature error.");

	assert!(matches!(err, Error::Validation { .. }));
	assert!(
		err.to_string().contains("providers.vision.temperature must be in the range 0.0-2.0."),
		"Unexpected error: {err}"
	);
}

#[test]
fn missing_file_reports_read_error() {
	let mut path = env::temp_dir();

	path.push("glimpse_config_test_missing_file.toml");

	let err = glimpse_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}
