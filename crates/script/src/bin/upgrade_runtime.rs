use std::path::PathBuf;

use clap::Parser;

use vesting_distribution_scripts::scripts;
use vesting_distribution_scripts::tracing as tracing_config;
use vesting_distribution_scripts::utils::read_env;

// cargo run --bin upgrade_runtime --release -- runtime.compact.compressed.wasm

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct UpgradeArgs {
    /// Runtime wasm blob to install.
    wasm: PathBuf,
    #[clap(long, required = false, default_value = "false")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_config::setup_logger(
        tracing_config::LoggingConfig::default()
            .use_format(read_env("LOG_FORMAT", tracing_config::LogFormat::Plain)),
    );

    let args = UpgradeArgs::parse();
    tracing::debug!("Args: {:?}", args);

    let runtime = scripts::prelude::ScriptRuntime::init_from_env().await?;
    let flags = scripts::upgrade::Flags {
        dry_run: args.dry_run,
    };

    scripts::upgrade::run(&runtime, &args.wasm, &flags).await?;
    Ok(())
}
