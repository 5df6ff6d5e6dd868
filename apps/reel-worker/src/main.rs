use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = reel_worker::Args::parse();

	reel_worker::run(args).await
}
