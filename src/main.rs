use clap::Parser;
use vault_render::cli::Cli;
use vault_render::config::Config;
use vault_render::logging;
use vault_render::pipeline;
use vault_render::vault::VaultClient;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.log_level);

    let config = Config::from_cli(&cli)?;
    let client = VaultClient::new(&config.vault)?;

    let report = pipeline::run(&client, &config).await?;
    info!(
        "Rendered {} of {} secret(s) into {}",
        report.resolved,
        report.distinct,
        config.output_file.display()
    );

    Ok(())
}
