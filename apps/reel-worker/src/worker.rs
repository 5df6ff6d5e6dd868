use std::time::Duration as StdDuration;

use time::OffsetDateTime;
use tokio::time as tokio_time;

use reel_storage::cache::PgCacheStore;

use crate::{Error, Result};

pub struct WorkerState {
	pub cache: PgCacheStore,
	pub purge_interval: StdDuration,
}

pub fn purge_interval(cfg: &reel_config::Worker) -> Result<StdDuration> {
	if cfg.purge_interval_seconds == 0 {
		return Err(Error::Validation(
			"worker.purge_interval_seconds must be greater than zero.".to_string(),
		));
	}

	Ok(StdDuration::from_secs(cfg.purge_interval_seconds))
}

/// Purges expired cache rows every `purge_interval` until the future is dropped.
pub async fn run_worker(state: &WorkerState) -> Result<()> {
	let mut ticker = tokio_time::interval(state.purge_interval);

	ticker.set_missed_tick_behavior(tokio_time::MissedTickBehavior::Delay);

	loop {
		ticker.tick().await;

		if let Err(err) = purge_expired_cache(&state.cache, OffsetDateTime::now_utc()).await {
			tracing::error!(error = %err, "Response cache cleanup failed.");
		}
	}
}

pub async fn purge_expired_cache(cache: &PgCacheStore, now: OffsetDateTime) -> Result<u64> {
	let purged = cache.purge_expired(now).await?;

	if purged > 0 {
		tracing::info!(purged, "Purged expired response cache entries.");
	} else {
		tracing::debug!("No expired response cache entries.");
	}

	Ok(purged)
}
