use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::{Map, json};

use reel_service::{BoxFuture, CacheKey, CacheStore, Error, ReadThrough, Result, derive_key};
use reel_storage::memory::MemoryCacheStore;

/// Memory store that can be told to fail reads or writes.
#[derive(Default)]
struct FlakyStore {
	inner: MemoryCacheStore,
	fail_reads: bool,
	fail_writes: bool,
	writes: AtomicUsize,
}
impl CacheStore for FlakyStore {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
		Box::pin(async move {
			if self.fail_reads {
				return Err(Error::Cache { message: "connection refused".to_string() });
			}

			Ok(self.inner.get(key))
		})
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Duration,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.writes.fetch_add(1, Ordering::SeqCst);

			if self.fail_writes {
				return Err(Error::Cache { message: "read-only replica".to_string() });
			}

			self.inner.set(key, value, ttl);

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.inner.delete(key);

			Ok(())
		})
	}
}

fn key(prefix: &str) -> CacheKey {
	CacheKey::builder(prefix).arg(&json!({ "titles": ["heat"] })).unwrap().build()
}

async fn compute(calls: &AtomicUsize, value: Vec<String>) -> Result<Vec<String>> {
	calls.fetch_add(1, Ordering::SeqCst);

	Ok(value)
}

#[tokio::test]
async fn cached_value_is_computed_once() {
	let cache = ReadThrough::new(Arc::new(FlakyStore::default()), Duration::from_secs(60));
	let calls = AtomicUsize::new(0);
	let key = key("search");

	for _ in 0..3 {
		let value = cache
			.get_or_compute(&key, || compute(&calls, vec!["heat".to_string()]))
			.await
			.expect("compute failed");

		assert_eq!(value, vec!["heat".to_string()]);
	}

	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_result_counts_as_a_hit() {
	let cache = ReadThrough::new(Arc::new(FlakyStore::default()), Duration::from_secs(60));
	let calls = AtomicUsize::new(0);
	let key = key("search");

	for _ in 0..2 {
		let value = cache.get_or_compute(&key, || compute(&calls, Vec::new())).await.unwrap();

		assert!(value.is_empty());
	}

	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_writes_compute_every_call() {
	let store = Arc::new(FlakyStore { fail_writes: true, ..FlakyStore::default() });
	let cache = ReadThrough::new(store.clone(), Duration::from_secs(60));
	let calls = AtomicUsize::new(0);
	let key = key("search");

	for _ in 0..3 {
		let value = cache
			.get_or_compute(&key, || compute(&calls, vec!["alien".to_string()]))
			.await
			.expect("write failures must not fail the call");

		assert_eq!(value, vec!["alien".to_string()]);
	}

	assert_eq!(calls.load(Ordering::SeqCst), 3);
	assert_eq!(store.writes.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failing_reads_fall_through_to_the_operation() {
	let store = Arc::new(FlakyStore { fail_reads: true, ..FlakyStore::default() });
	let cache = ReadThrough::new(store, Duration::from_secs(60));
	let calls = AtomicUsize::new(0);
	let value = cache
		.get_or_compute(&key("search"), || compute(&calls, vec!["rocky".to_string()]))
		.await
		.expect("read failures must not fail the call");

	assert_eq!(value, vec!["rocky".to_string()]);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn operation_errors_propagate_and_are_not_cached() {
	let store = Arc::new(FlakyStore::default());
	let cache = ReadThrough::new(store.clone(), Duration::from_secs(60));
	let key = key("search");
	let err = cache
		.get_or_compute(&key, || async { Err::<Vec<String>, _>(Error::EmptySize) })
		.await
		.expect_err("operation error must propagate");

	assert!(matches!(err, Error::EmptySize));
	assert_eq!(store.writes.load(Ordering::SeqCst), 0);

	let calls = AtomicUsize::new(0);

	cache.get_or_compute(&key, || compute(&calls, Vec::new())).await.unwrap();

	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn undecodable_payload_is_a_miss() {
	let store = Arc::new(FlakyStore::default());
	let cache = ReadThrough::new(store.clone(), Duration::from_secs(60));
	let key = key("search");
	let calls = AtomicUsize::new(0);

	store.inner.set(key.as_str(), "{not json", Duration::from_secs(60));

	let value = cache.get_or_compute(&key, || compute(&calls, vec!["heat".to_string()])).await;

	assert_eq!(value.unwrap(), vec!["heat".to_string()]);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(store.inner.get(key.as_str()).as_deref(), Some(r#"["heat"]"#));
}

#[tokio::test]
async fn blocking_operations_share_the_cache() {
	let cache = ReadThrough::new(Arc::new(FlakyStore::default()), Duration::from_secs(60));
	let calls = Arc::new(AtomicUsize::new(0));
	let key = key("blocking");

	for _ in 0..2 {
		let calls = calls.clone();
		let value: Vec<u32> = cache
			.get_or_compute_blocking(&key, move || {
				calls.fetch_add(1, Ordering::SeqCst);

				Ok::<_, Error>(vec![1, 2, 3])
			})
			.await
			.unwrap();

		assert_eq!(value, vec![1, 2, 3]);
	}

	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn disabled_cache_always_computes() {
	let cache = ReadThrough::disabled();
	let calls = AtomicUsize::new(0);
	let key = key("search");

	for _ in 0..2 {
		cache.get_or_compute(&key, || compute(&calls, Vec::new())).await.unwrap();
	}

	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn expired_memory_entries_do_not_accumulate() {
	let store = Arc::new(MemoryCacheStore::new());
	let cache = ReadThrough::new(store.clone(), Duration::from_millis(1));
	let calls = AtomicUsize::new(0);

	for i in 0..1_000 {
		let key = CacheKey::builder("search").arg(&i).unwrap().build();

		cache.get_or_compute(&key, || compute(&calls, vec![i.to_string()])).await.unwrap();
	}

	tokio::time::sleep(Duration::from_millis(20)).await;

	for i in 0..10 {
		let key = CacheKey::builder("list").arg(&i).unwrap().build();

		cache.get_or_compute(&key, || compute(&calls, Vec::new())).await.unwrap();
	}

	assert!(store.len() <= 10, "entries left after expiry: {}", store.len());
}

#[tokio::test]
async fn invalidate_forces_recompute() {
	let cache = ReadThrough::new(Arc::new(FlakyStore::default()), Duration::from_secs(60));
	let calls = AtomicUsize::new(0);
	let key = key("search");

	cache.get_or_compute(&key, || compute(&calls, Vec::new())).await.unwrap();
	cache.invalidate(&key).await.unwrap();
	cache.get_or_compute(&key, || compute(&calls, Vec::new())).await.unwrap();

	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn named_argument_order_does_not_change_the_key() {
	let left = CacheKey::builder("list_movies")
		.kwarg("page", &1)
		.unwrap()
		.kwarg("fields", "title")
		.unwrap()
		.build();
	let right = CacheKey::builder("list_movies")
		.kwarg("fields", "title")
		.unwrap()
		.kwarg("page", &1)
		.unwrap()
		.build();

	assert_eq!(left, right);
}

#[test]
fn positional_order_changes_the_key() {
	let left = derive_key("p", &[json!("heat"), json!("alien")], &Map::new());
	let right = derive_key("p", &[json!("alien"), json!("heat")], &Map::new());

	assert_ne!(left, right);
}

#[test]
fn nested_object_key_order_does_not_change_the_key() {
	let left = derive_key("p", &[json!({ "a": 1, "b": { "c": 2, "d": 3 } })], &Map::new());
	let right = derive_key("p", &[json!({ "b": { "d": 3, "c": 2 }, "a": 1 })], &Map::new());

	assert_eq!(left, right);
}

#[test]
fn unserializable_arguments_fail_immediately() {
	let mut bad = std::collections::HashMap::new();

	bad.insert((1, 2), "tuple keys are not JSON");

	let err = CacheKey::builder("p").arg(&bad).expect_err("tuple map keys must fail");

	assert!(matches!(err, Error::CacheKey { .. }));
}
