use anyhow::Result;
use autoincur_cli::cli::output::OutputFormat;
use autoincur_cli::cli::runtime::{init_logging, load_config, load_local_env_overrides};
use autoincur_cli::cli::{dispatch, CliArgs, CliContext};
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug, cli.output == OutputFormat::Json)?;
    info!("Starting autoincur v{}", env!("CARGO_PKG_VERSION"));

    load_local_env_overrides();
    let loaded = load_config(cli.config.as_ref()).await?;
    let ctx = CliContext::new(loaded.config, loaded.path, cli.output);

    match dispatch(&cli, &ctx).await {
        Ok(true) => {
            info!("Command completed successfully");
            Ok(())
        }
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Command failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
