use std::{future::Future, sync::Arc, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{BoxFuture, CacheStore, Error, Result};

const CACHE_KEY_PREFIX_LEN: usize = 12;

/// `prefix:digest`, where the digest is BLAKE3 over the canonical JSON of the call arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);
impl CacheKey {
	pub fn builder(prefix: impl Into<String>) -> CacheKeyBuilder {
		CacheKeyBuilder { prefix: prefix.into(), args: Vec::new(), kwargs: Map::new() }
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn prefix(&self) -> &str {
		self.0.rsplit_once(':').map(|(prefix, _)| prefix).unwrap_or_default()
	}

	pub fn digest(&self) -> &str {
		self.0.rsplit_once(':').map(|(_, digest)| digest).unwrap_or(&self.0)
	}

	fn log_prefix(&self) -> &str {
		let digest = self.digest();

		&digest[..digest.len().min(CACHE_KEY_PREFIX_LEN)]
	}
}
impl std::fmt::Display for CacheKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Collects positional and named arguments for a [`CacheKey`].
///
/// Positional order matters; named arguments are keyed by name, so their insertion order does
/// not.
#[derive(Clone, Debug)]
pub struct CacheKeyBuilder {
	prefix: String,
	args: Vec<Value>,
	kwargs: Map<String, Value>,
}
impl CacheKeyBuilder {
	pub fn arg<T>(mut self, value: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		self.args.push(to_key_value(value)?);

		Ok(self)
	}

	pub fn kwarg<T>(mut self, name: &str, value: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		self.kwargs.insert(name.to_string(), to_key_value(value)?);

		Ok(self)
	}

	pub fn build(self) -> CacheKey {
		CacheKey(derive_key(&self.prefix, &self.args, &self.kwargs))
	}
}

pub fn derive_key(prefix: &str, args: &[Value], kwargs: &Map<String, Value>) -> String {
	let mut payload = Map::new();

	payload.insert("args".to_string(), Value::Array(args.to_vec()));
	payload.insert("kwargs".to_string(), Value::Object(kwargs.clone()));

	let canonical = canonical_json(&Value::Object(payload));

	format!("{prefix}:{}", blake3::hash(canonical.as_bytes()).to_hex())
}

/// Compact JSON with every object's keys sorted, at any depth.
pub fn canonical_json(value: &Value) -> String {
	let mut out = String::new();

	write_canonical(value, &mut out);

	out
}

fn write_canonical(value: &Value, out: &mut String) {
	match value {
		Value::Object(map) => {
			let mut entries: Vec<(&String, &Value)> = map.iter().collect();

			entries.sort_by(|(left, _), (right, _)| left.cmp(right));
			out.push('{');

			for (idx, (key, value)) in entries.into_iter().enumerate() {
				if idx > 0 {
					out.push(',');
				}

				out.push_str(&Value::String(key.clone()).to_string());
				out.push(':');
				write_canonical(value, out);
			}

			out.push('}');
		},
		Value::Array(items) => {
			out.push('[');

			for (idx, item) in items.iter().enumerate() {
				if idx > 0 {
					out.push(',');
				}

				write_canonical(item, out);
			}

			out.push(']');
		},
		leaf => out.push_str(&leaf.to_string()),
	}
}

fn to_key_value<T>(value: &T) -> Result<Value>
where
	T: ?Sized + Serialize,
{
	serde_json::to_value(value).map_err(|err| Error::CacheKey { message: err.to_string() })
}

/// Store used when caching is switched off. Every read misses and every write is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCacheStore;
impl CacheStore for NoopCacheStore {
	fn get<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
		Box::pin(async { Ok(None) })
	}

	fn set<'a>(
		&'a self,
		_key: &'a str,
		_value: &'a str,
		_ttl: Duration,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async { Ok(()) })
	}

	fn delete<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async { Ok(()) })
	}
}

/// Read-through memoization over a [`CacheStore`].
///
/// A stored value that decodes as `T` is returned without running the operation, empty
/// collections included. Store failures never fail the call: a failed read runs the
/// operation, a failed write still returns its result.
#[derive(Clone)]
pub struct ReadThrough {
	store: Arc<dyn CacheStore>,
	ttl: Duration,
}
impl ReadThrough {
	pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
		Self { store, ttl }
	}

	pub fn disabled() -> Self {
		Self::new(Arc::new(NoopCacheStore), Duration::ZERO)
	}

	pub fn with_ttl(&self, ttl: Duration) -> Self {
		Self { store: self.store.clone(), ttl }
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub async fn get_or_compute<T, E, F, Fut>(&self, key: &CacheKey, op: F) -> Result<T, E>
	where
		T: Serialize + DeserializeOwned,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		if let Some(cached) = self.lookup(key).await {
			return Ok(cached);
		}

		let value = op().await?;

		self.write(key, &value).await;

		Ok(value)
	}

	/// Like [`ReadThrough::get_or_compute`] for synchronous work, which runs on the blocking
	/// thread pool.
	pub async fn get_or_compute_blocking<T, E, F>(&self, key: &CacheKey, op: F) -> Result<T, E>
	where
		T: 'static + Send + Serialize + DeserializeOwned,
		E: 'static + Send + From<Error>,
		F: 'static + Send + FnOnce() -> Result<T, E>,
	{
		self.get_or_compute(key, move || async move {
			tokio::task::spawn_blocking(op).await.map_err(|err| {
				let message = format!("Cached operation did not finish: {err}.");

				E::from(Error::Internal { message })
			})?
		})
		.await
	}

	pub async fn invalidate(&self, key: &CacheKey) -> Result<()> {
		self.store.delete(key.as_str()).await
	}

	async fn lookup<T>(&self, key: &CacheKey) -> Option<T>
	where
		T: DeserializeOwned,
	{
		let cache_key_prefix = key.log_prefix();

		match self.store.get(key.as_str()).await {
			Ok(Some(raw)) => match serde_json::from_str(&raw) {
				Ok(value) => {
					tracing::info!(prefix = key.prefix(), cache_key_prefix, "Cache hit.");

					Some(value)
				},
				Err(err) => {
					tracing::warn!(
						error = %err,
						prefix = key.prefix(),
						cache_key_prefix,
						"Cache payload decode failed."
					);

					None
				},
			},
			Ok(None) => {
				tracing::info!(prefix = key.prefix(), cache_key_prefix, "Cache miss.");

				None
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					prefix = key.prefix(),
					cache_key_prefix,
					"Cache read failed."
				);

				None
			},
		}
	}

	async fn write<T>(&self, key: &CacheKey, value: &T)
	where
		T: Serialize,
	{
		let cache_key_prefix = key.log_prefix();
		let payload = match serde_json::to_string(value) {
			Ok(payload) => payload,
			Err(err) => {
				tracing::warn!(error = %err, cache_key_prefix, "Cache payload encode failed.");

				return;
			},
		};

		if let Err(err) = self.store.set(key.as_str(), &payload, self.ttl).await {
			tracing::warn!(error = %err, cache_key_prefix, "Cache write failed.");

			return;
		}

		tracing::debug!(
			prefix = key.prefix(),
			cache_key_prefix,
			ttl_seconds = self.ttl.as_secs(),
			"Cache stored."
		);
	}
}
