mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Cache, Config, Postgres, Search, Service, Slack, Storage, Worker};

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
	if !matches!(cfg.service.log_format.as_str(), "text" | "json") {
		return Err(Error::Validation {
			message: "service.log_format must be one of text or json.".to_string(),
		});
	}
	if cfg.search.url.trim().is_empty() {
		return Err(Error::Validation { message: "search.url must be non-empty.".to_string() });
	}
	if cfg.search.index.trim().is_empty() {
		return Err(Error::Validation { message: "search.index must be non-empty.".to_string() });
	}
	if cfg.search.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.scroll.trim().is_empty() {
		return Err(Error::Validation { message: "search.scroll must be non-empty.".to_string() });
	}
	if cfg.search.max_size == 0 {
		return Err(Error::Validation {
			message: "search.max_size must be greater than zero.".to_string(),
		});
	}
	if !matches!(cfg.cache.backend.as_str(), "postgres" | "memory") {
		return Err(Error::Validation {
			message: "cache.backend must be one of postgres or memory.".to_string(),
		});
	}
	if cfg.cache.default_ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "cache.default_ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.route_ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "cache.route_ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.backend == "postgres" {
		if cfg.storage.postgres.dsn.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.postgres.dsn must be non-empty when cache.backend is postgres."
					.to_string(),
			});
		}
		if cfg.storage.postgres.pool_max_conns == 0 {
			return Err(Error::Validation {
				message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
			});
		}
	}
	if cfg.worker.purge_interval_seconds == 0 {
		return Err(Error::Validation {
			message: "worker.purge_interval_seconds must be greater than zero.".to_string(),
		});
	}

	if let Some(slack) = cfg.slack.as_ref() {
		if slack.webhook_url.trim().is_empty() {
			return Err(Error::Validation {
				message: "slack.webhook_url must be non-empty.".to_string(),
			});
		}
		if slack.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "slack.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.search.url = cfg.search.url.trim().trim_end_matches('/').to_string();
	cfg.cache.backend = cfg.cache.backend.trim().to_ascii_lowercase();
	cfg.service.log_format = cfg.service.log_format.trim().to_ascii_lowercase();

	if cfg.slack.as_ref().map(|slack| slack.webhook_url.trim().is_empty()).unwrap_or(false) {
		cfg.slack = None;
	}
}
