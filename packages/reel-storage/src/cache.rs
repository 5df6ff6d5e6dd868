use std::time::Duration as StdDuration;

use sqlx::PgPool;
use time::{Duration, OffsetDateTime};

use crate::{Error, Result, db::Db};

/// Response cache rows in Postgres. Rows past `expires_at` are never returned.
#[derive(Clone)]
pub struct PgCacheStore {
	pool: PgPool,
}
impl PgCacheStore {
	pub fn new(db: &Db) -> Self {
		Self { pool: db.pool.clone() }
	}

	pub async fn get(&self, key: &str, now: OffsetDateTime) -> Result<Option<String>> {
		let payload = sqlx::query_scalar::<_, String>(
			"SELECT payload FROM response_cache WHERE cache_key = $1 AND expires_at > $2",
		)
		.bind(key)
		.bind(now)
		.fetch_optional(&self.pool)
		.await?;

		Ok(payload)
	}

	pub async fn set(
		&self,
		key: &str,
		payload: &str,
		ttl: StdDuration,
		now: OffsetDateTime,
	) -> Result<()> {
		let expires_at = expires_at(now, ttl)?;

		sqlx::query(
			"\
INSERT INTO response_cache (cache_key, payload, created_at, expires_at)
VALUES ($1, $2, $3, $4)
ON CONFLICT (cache_key) DO UPDATE SET
	payload = EXCLUDED.payload,
	created_at = EXCLUDED.created_at,
	expires_at = EXCLUDED.expires_at",
		)
		.bind(key)
		.bind(payload)
		.bind(now)
		.bind(expires_at)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	pub async fn delete(&self, key: &str) -> Result<bool> {
		let result = sqlx::query("DELETE FROM response_cache WHERE cache_key = $1")
			.bind(key)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	pub async fn purge_expired(&self, now: OffsetDateTime) -> Result<u64> {
		let result = sqlx::query("DELETE FROM response_cache WHERE expires_at <= $1")
			.bind(now)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected())
	}
}

pub fn expires_at(now: OffsetDateTime, ttl: StdDuration) -> Result<OffsetDateTime> {
	let ttl = Duration::try_from(ttl)
		.map_err(|_| Error::InvalidArgument(format!("Cache TTL {ttl:?} is out of range.")))?;

	now.checked_add(ttl)
		.ok_or_else(|| Error::InvalidArgument(format!("Cache TTL {ttl} overflows the clock.")))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expiry_is_now_plus_ttl() {
		let now = time::macros::datetime!(2024-01-01 00:00 UTC);
		let expires = expires_at(now, StdDuration::from_secs(3_600)).expect("expiry");

		assert_eq!(expires, time::macros::datetime!(2024-01-01 01:00 UTC));
	}

	#[test]
	fn overflowing_ttl_is_rejected() {
		let now = time::macros::datetime!(2024-01-01 00:00 UTC);

		assert!(expires_at(now, StdDuration::from_secs(u64::MAX)).is_err());
	}
}
