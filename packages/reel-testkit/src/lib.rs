mod error;

pub use error::{Error, Result};

use std::{env, future::Future, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

pub const DSN_ENV: &str = "REEL_PG_DSN";

const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

/// Scratch database for one test, created on the server behind [`DSN_ENV`].
///
/// The database is dropped by [`ScratchDb::drop_now`], or on `Drop` from a helper thread.
pub struct ScratchDb {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl ScratchDb {
	pub async fn create(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("{DSN_ENV} is not a valid DSN: {err}.")))?;
		let (maintenance, mut conn) = open_maintenance(&base).await?;
		let name = format!("reel_cache_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|err| Error::Message(format!("Could not create {name}: {err}.")))?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn drop_now(mut self) -> Result<()> {
		self.drop_database().await
	}

	async fn drop_database(&mut self) -> Result<()> {
		if !self.dropped {
			drop_database(&self.name, &self.maintenance).await?;

			self.dropped = true;
		}

		Ok(())
	}
}
impl Drop for ScratchDb {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();
		// A runtime may already be driving this thread, so the drop runs on its own.
		let handle = thread::spawn(move || {
			let outcome = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| Error::Message(err.to_string()))
				.and_then(|runtime| runtime.block_on(drop_database(&name, &maintenance)));

			if let Err(err) = outcome {
				eprintln!("Could not drop scratch database {name}: {err}");
			}
		});

		let _ = handle.join();
	}
}

/// Base DSN for Postgres-backed tests, if one is configured.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

/// Runs `f` against a fresh scratch database and drops it afterwards.
///
/// A failed drop only fails the run when `f` itself succeeded.
pub async fn with_test_db<F, Fut, T>(base_dsn: &str, f: F) -> Result<T>
where
	F: FnOnce(&ScratchDb) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let mut db = ScratchDb::create(base_dsn).await?;
	let outcome = f(&db).await;

	match (db.drop_database().await, outcome) {
		(Err(err), Ok(_)) => Err(err),
		(Err(err), Err(original)) => {
			eprintln!("Could not drop scratch database after a failed run: {err}");

			Err(original)
		},
		(Ok(()), outcome) => outcome,
	}
}

async fn open_maintenance(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut errors = Vec::new();

	for database in MAINTENANCE_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => errors.push(format!("{database}: {err}")),
		}
	}

	Err(Error::Message(format!("No maintenance database reachable ({}).", errors.join("; "))))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	// Pool connections left open by the test would block DROP DATABASE.
	sqlx::query(
		"SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
		 WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.execute(&mut conn)
	.await?;
	sqlx::query(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str()).execute(&mut conn).await?;

	Ok(())
}
