pub mod worker;

mod error;

pub use error::{Error, Result};

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use reel_storage::{cache::PgCacheStore, db::Db};

#[derive(Debug, Parser)]
#[command(
	version = reel_cli::VERSION,
	rename_all = "kebab",
	styles = reel_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = reel_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	let builder = tracing_subscriber::fmt().with_env_filter(filter);

	match config.service.log_format.as_str() {
		"json" => builder.json().try_init(),
		_ => builder.try_init(),
	}
	.map_err(|err| eyre::eyre!(err))?;

	if config.cache.backend != "postgres" {
		tracing::warn!(
			backend = %config.cache.backend,
			"Cache backend keeps no shared state. Nothing to purge."
		);

		return Ok(());
	}

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let state = worker::WorkerState {
		cache: PgCacheStore::new(&db),
		purge_interval: worker::purge_interval(&config.worker)?,
	};

	tokio::select! {
		result = worker::run_worker(&state) => result?,
		signal = tokio::signal::ctrl_c() => {
			signal?;

			tracing::info!("Shutdown signal received.");
		},
	}

	db.close().await;

	Ok(())
}
