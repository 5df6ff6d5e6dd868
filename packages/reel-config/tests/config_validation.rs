use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use reel_config::{Config, Error, Slack};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let table = root
		.as_table_mut()
		.expect("Template config must be a table.")
		.get_mut(section)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Template config must include [{section}]."));

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
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

	path.push(format!("reel_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> reel_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = reel_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

fn assert_validation_message(result: reel_config::Result<Config>, expected: &str) {
	let err = result.expect_err("Expected validation error.");

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error: {err:?}");

	let message = err.to_string();

	assert!(message.contains(expected), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads_and_normalizes() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config must be valid.");

	assert_eq!(cfg.search.url, "http://localhost:9200");
	assert_eq!(cfg.search.index, "movie");
	assert_eq!(cfg.cache.route_ttl_seconds, 3_600);
	assert_eq!(cfg.worker.purge_interval_seconds, 300);
	assert!(cfg.slack.is_none());
}

#[test]
fn backend_is_case_insensitive() {
	let payload = sample_toml_with("cache", "backend", Value::String(" Memory ".to_string()));
	let cfg = load_payload(payload).expect("Memory backend must be accepted.");

	assert_eq!(cfg.cache.backend, "memory");
}

#[test]
fn unknown_cache_backend_is_rejected() {
	let payload = sample_toml_with("cache", "backend", Value::String("redis".to_string()));

	assert_validation_message(load_payload(payload), "cache.backend must be one of");
}

#[test]
fn zero_ttl_is_rejected() {
	let payload = sample_toml_with("cache", "default_ttl_seconds", Value::Integer(0));

	assert_validation_message(
		load_payload(payload),
		"cache.default_ttl_seconds must be greater than zero.",
	);
}

#[test]
fn max_size_must_be_positive() {
	let payload = sample_toml_with("search", "max_size", Value::Integer(0));

	assert_validation_message(load_payload(payload), "search.max_size must be greater than zero.");
}

#[test]
fn log_format_must_be_known() {
	let payload = sample_toml_with("service", "log_format", Value::String("xml".to_string()));

	assert_validation_message(load_payload(payload), "service.log_format must be one of");
}

#[test]
fn memory_backend_does_not_require_dsn() {
	let mut cfg = base_config();

	cfg.cache.backend = "memory".to_string();
	cfg.storage.postgres.dsn = String::new();

	reel_config::validate(&cfg).expect("Memory backend must not require a DSN.");

	cfg.cache.backend = "postgres".to_string();

	let err = reel_config::validate(&cfg).expect_err("Postgres backend must require a DSN.");

	assert!(err.to_string().contains("storage.postgres.dsn must be non-empty"));
}

#[test]
fn slack_webhook_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.slack = Some(Slack { webhook_url: " ".to_string(), timeout_ms: 1_000 });

	let err = reel_config::validate(&cfg).expect_err("Expected slack validation error.");

	assert_eq!(err.to_string(), "slack.webhook_url must be non-empty.");
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("reel_config_missing_file.toml");
	let err = reel_config::load(&path).expect_err("Missing file must fail.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}
