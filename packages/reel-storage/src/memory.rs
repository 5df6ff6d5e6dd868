use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard},
	time::{Duration, Instant},
};

struct Entry {
	payload: String,
	expires_at: Instant,
}

#[derive(Default)]
struct Entries {
	map: HashMap<String, Entry>,
	// Earliest deadline in `map`; writes sweep once it has passed.
	next_expiry: Option<Instant>,
}
impl Entries {
	fn sweep(&mut self, now: Instant) -> usize {
		let before = self.map.len();

		self.map.retain(|_, entry| entry.expires_at > now);
		self.next_expiry = self.map.values().map(|entry| entry.expires_at).min();

		before - self.map.len()
	}
}

/// Process-local cache with per-key TTL, for local runs and tests.
///
/// Expired entries are dropped on read, and in bulk by the first write after the earliest
/// deadline passes, so the map only holds what was written within one TTL.
#[derive(Default)]
pub struct MemoryCacheStore {
	entries: Mutex<Entries>,
}
impl MemoryCacheStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<String> {
		let now = Instant::now();
		let mut entries = self.lock();

		match entries.map.get(key) {
			Some(entry) if entry.expires_at > now => Some(entry.payload.clone()),
			Some(_) => {
				entries.map.remove(key);

				None
			},
			None => None,
		}
	}

	pub fn set(&self, key: &str, payload: &str, ttl: Duration) {
		let now = Instant::now();
		// Deadlines past what `Instant` can hold are clamped to ~136 years.
		let expires_at =
			now.checked_add(ttl).unwrap_or_else(|| now + Duration::from_secs(u32::MAX.into()));
		let mut entries = self.lock();

		if entries.next_expiry.is_some_and(|deadline| deadline <= now) {
			let purged = entries.sweep(now);

			tracing::debug!(purged, "Swept expired memory cache entries.");
		}

		entries.map.insert(key.to_string(), Entry { payload: payload.to_string(), expires_at });
		entries.next_expiry =
			Some(entries.next_expiry.map_or(expires_at, |deadline| deadline.min(expires_at)));
	}

	pub fn delete(&self, key: &str) -> bool {
		self.lock().map.remove(key).is_some()
	}

	pub fn purge_expired(&self) -> usize {
		self.lock().sweep(Instant::now())
	}

	pub fn len(&self) -> usize {
		self.lock().map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock(&self) -> MutexGuard<'_, Entries> {
		self.entries.lock().unwrap_or_else(|err| err.into_inner())
	}
}
