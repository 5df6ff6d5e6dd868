use std::{sync::Arc, time::Duration};

use reel_providers::opensearch::OpenSearchClient;
use reel_service::{CacheStore, ReadThrough, ReelService, SearchEngine};
use reel_storage::{cache::PgCacheStore, db::Db, memory::MemoryCacheStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ReelService>,
	db: Option<Arc<Db>>,
}
impl AppState {
	pub async fn new(config: reel_config::Config) -> color_eyre::Result<Self> {
		let search: Arc<dyn SearchEngine> = Arc::new(OpenSearchClient::new(&config.search)?);
		let mut db = None;
		let cache = if !config.cache.enabled {
			tracing::info!("Response cache disabled.");

			ReadThrough::disabled()
		} else {
			let store: Arc<dyn CacheStore> = match config.cache.backend.as_str() {
				"postgres" => {
					let pg = Db::connect(&config.storage.postgres).await?;

					pg.ensure_schema().await?;

					let store = PgCacheStore::new(&pg);

					db = Some(Arc::new(pg));

					Arc::new(store)
				},
				_ => Arc::new(MemoryCacheStore::new()),
			};

			tracing::info!(backend = %config.cache.backend, "Response cache enabled.");

			ReadThrough::new(store, Duration::from_secs(config.cache.default_ttl_seconds))
		};

		Ok(Self { service: Arc::new(ReelService::new(config, search, cache)), db })
	}

	/// Wraps an already assembled service, with no database to close.
	pub fn from_service(service: ReelService) -> Self {
		Self { service: Arc::new(service), db: None }
	}

	pub async fn close(&self) {
		if let Some(db) = &self.db {
			db.close().await;
		}
	}
}
