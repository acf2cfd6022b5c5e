use std::path::PathBuf;

use clap::Parser;

use vesting_distribution_scripts::scripts;
use vesting_distribution_scripts::tracing as tracing_config;
use vesting_distribution_scripts::utils::read_env;

// cargo run --bin reconcile --release -- --manifest distribution-manifest.json --dry-run

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct ReconcileArgs {
    /// Manifest written by the distribute run.
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

    let args = ReconcileArgs::parse();
    tracing::debug!("Args: {:?}", args);

    let runtime = scripts::prelude::ScriptRuntime::init_from_env().await?;
    let flags = scripts::reconcile::Flags {
        dry_run: args.dry_run,
    };

    let plan = scripts::reconcile::run(&runtime, &args.manifest, &flags).await?;
    tracing::info!(
        schedule_updates = plan.schedule_updates.len(),
        clawbacks = plan.clawbacks.len(),
        "reconciliation complete"
    );
    Ok(())
}
