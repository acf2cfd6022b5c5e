use std::path::PathBuf;

use clap::Parser;

use vesting_distribution_scripts::tracing as tracing_config;
use vesting_distribution_scripts::utils::read_env;
use vesting_distribution_scripts::{consts, scripts, utils};

// DELEGATE_MULTISIG=<ss58> cargo run --bin distribute --release -- --manifest distribution-manifest.json

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct DistributeArgs {
    /// Allocation table JSON; the built-in deployment table when omitted.
    #[clap(long, required = false)]
    allocations: Option<PathBuf>,
    /// Where to write the recipient manifest.
    #[clap(long, default_value = "distribution-manifest.json")]
    manifest: PathBuf,
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

    let args = DistributeArgs::parse();
    tracing::debug!("Args: {:?}", args);

    let allocations = match &args.allocations {
        Some(path) => utils::read_json(path)?,
        None => consts::default_allocations(),
    };

    let runtime = scripts::prelude::ScriptRuntime::init_from_env().await?;
    let flags = scripts::distribute::Flags {
        dry_run: args.dry_run,
    };

    scripts::distribute::run(&runtime, &allocations, &args.manifest, &flags).await?;
    Ok(())
}
