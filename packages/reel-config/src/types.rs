use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub search: Search,
	pub storage: Storage,
	pub cache: Cache,
	#[serde(default)]
	pub worker: Worker,
	pub slack: Option<Slack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Either "text" or "json".
	#[serde(default = "default_log_format")]
	pub log_format: String,
	/// Local deployments never page Slack.
	#[serde(default)]
	pub is_local: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	pub url: String,
	pub index: String,
	pub timeout_ms: u64,
	/// Scroll keep-alive passed to the search engine, e.g. "1m".
	#[serde(default = "default_scroll")]
	pub scroll: String,
	#[serde(default = "default_max_size")]
	pub max_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cache {
	pub enabled: bool,
	/// Either "postgres" or "memory".
	pub backend: String,
	pub default_ttl_seconds: u64,
	/// TTL applied by the cached HTTP routes.
	pub route_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Worker {
	pub purge_interval_seconds: u64,
}
impl Default for Worker {
	fn default() -> Self {
		Self { purge_interval_seconds: 300 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slack {
	pub webhook_url: String,
	#[serde(default = "default_slack_timeout_ms")]
	pub timeout_ms: u64,
}

fn default_log_format() -> String {
	"text".to_string()
}

fn default_scroll() -> String {
	"1m".to_string()
}

fn default_max_size() -> u32 {
	10_000
}

fn default_slack_timeout_ms() -> u64 {
	5_000
}
