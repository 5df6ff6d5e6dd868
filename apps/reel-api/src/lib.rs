pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use color_eyre::eyre;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

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

	init_tracing(&config.service)?;

	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(config).await?;
	let app = routes::router(state.clone());
	let http_listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, version = reel_cli::VERSION, "HTTP server listening.");

	axum::serve(http_listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	state.close().await;

	Ok(())
}

pub fn init_tracing(service: &reel_config::Service) -> color_eyre::Result<()> {
	let filter = EnvFilter::try_new(&service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	let builder = tracing_subscriber::fmt().with_env_filter(filter);

	match service.log_format.as_str() {
		"json" => builder.json().try_init(),
		_ => builder.try_init(),
	}
	.map_err(|err| eyre::eyre!(err))
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "Failed to listen for shutdown signal.");

		std::future::pending::<()>().await;
	}

	tracing::info!("Shutdown signal received.");
}
