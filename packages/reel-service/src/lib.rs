pub mod cache;
pub mod movies;

mod error;

pub use cache::{CacheKey, CacheKeyBuilder, NoopCacheStore, ReadThrough, derive_key};
pub use error::{Error, Result};
pub use movies::{AdditionalData, ListMoviesRequest, MOVIE_FIELDS, Movie, Page};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use time::OffsetDateTime;

use reel_config::Config;
use reel_providers::opensearch::{OpenSearchClient, PageRequest, ScanRequest, SearchHits};
use reel_query::QueryComposer;
use reel_storage::{cache::PgCacheStore, memory::MemoryCacheStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote key/value cache holding serialized results until their TTL runs out.
pub trait CacheStore
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>>;

	fn set<'a>(&'a self, key: &'a str, value: &'a str, ttl: Duration)
	-> BoxFuture<'a, Result<()>>;

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>>;
}

pub trait SearchEngine
where
	Self: Send + Sync,
{
	fn scan<'a>(&'a self, request: &'a ScanRequest) -> BoxFuture<'a, Result<SearchHits>>;

	fn page<'a>(&'a self, request: &'a PageRequest) -> BoxFuture<'a, Result<SearchHits>>;
}

pub struct ReelService {
	pub cfg: Config,
	pub search: Arc<dyn SearchEngine>,
	pub cache: ReadThrough,
	pub composer: QueryComposer,
}
impl ReelService {
	pub fn new(cfg: Config, search: Arc<dyn SearchEngine>, cache: ReadThrough) -> Self {
		Self { cfg, search, cache, composer: QueryComposer::default() }
	}
}

impl CacheStore for PgCacheStore {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
		Box::pin(async move { Ok(PgCacheStore::get(self, key, OffsetDateTime::now_utc()).await?) })
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Duration,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			Ok(PgCacheStore::set(self, key, value, ttl, OffsetDateTime::now_utc()).await?)
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			PgCacheStore::delete(self, key).await?;

			Ok(())
		})
	}
}

impl CacheStore for MemoryCacheStore {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
		Box::pin(async move { Ok(MemoryCacheStore::get(self, key)) })
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Duration,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			MemoryCacheStore::set(self, key, value, ttl);

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			MemoryCacheStore::delete(self, key);

			Ok(())
		})
	}
}

impl SearchEngine for OpenSearchClient {
	fn scan<'a>(&'a self, request: &'a ScanRequest) -> BoxFuture<'a, Result<SearchHits>> {
		Box::pin(async move { Ok(OpenSearchClient::scan(self, request).await?) })
	}

	fn page<'a>(&'a self, request: &'a PageRequest) -> BoxFuture<'a, Result<SearchHits>> {
		Box::pin(async move { Ok(OpenSearchClient::page(self, request).await?) })
	}
}
