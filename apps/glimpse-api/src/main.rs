use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = glimpse_api::Args::parse();

	glimpse_api::run(args).await
}
