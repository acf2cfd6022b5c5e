use std::path::Path;
use std::time::Duration;

use anyhow::{bail, ensure, Context};
use futures::StreamExt;

use crate::calls;
use crate::scripts::prelude::ScriptRuntime;
use crate::utils;

/// Blocks to see produced before submitting, confirming the chain is live.
const WARMUP_BLOCKS: u32 = 3;

/// How long to wait for the new runtime to report itself before giving up.
const UPGRADE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Default)]
pub struct Flags {
    pub dry_run: bool,
}

/// Push a runtime wasm onto the chain via sudo and watch until the node
/// reports the bumped spec version, or time out.
pub async fn run(runtime: &ScriptRuntime, wasm_path: &Path, flags: &Flags) -> anyhow::Result<()> {
    let code = utils::read_binary(wasm_path)
        .with_context(|| format!("failed to read runtime wasm from {}", wasm_path.display()))?;
    tracing::info!(bytes = code.len(), "loaded runtime wasm");

    let (chain, node_version) = runtime.chain.chain_info().await?;
    let spec_version = runtime.chain.spec_version().await?;
    tracing::info!(%chain, %node_version, spec_version, "connected");

    let sudo_key = runtime
        .chain
        .sudo_key()
        .await?
        .context("chain has no sudo key")?;
    ensure!(
        sudo_key == runtime.signer_account(),
        "configured account {} is not the sudo key {}",
        runtime.signer_account(),
        sudo_key
    );

    if flags.dry_run {
        tracing::info!("dry run, upgrade not submitted");
        return Ok(());
    }

    tracing::info!("waiting for the chain to produce blocks");
    wait_for_blocks(runtime, WARMUP_BLOCKS).await?;

    tracing::info!("submitting runtime upgrade");
    let events = runtime
        .chain
        .submit_batch_all(
            &runtime.signer,
            vec![calls::sudo_unchecked_weight(calls::set_code(code))],
        )
        .await?;
    for event in events.iter() {
        let event = event?;
        tracing::info!(
            pallet = event.pallet_name(),
            event = event.variant_name(),
            "upgrade event"
        );
    }

    tokio::time::timeout(UPGRADE_TIMEOUT, wait_for_spec_bump(runtime, spec_version))
        .await
        .map_err(|_| {
            anyhow::anyhow!(
                "upgrade was not applied within {} minutes",
                UPGRADE_TIMEOUT.as_secs() / 60
            )
        })?
}

async fn wait_for_blocks(runtime: &ScriptRuntime, count: u32) -> anyhow::Result<()> {
    let mut blocks = runtime.chain.api().blocks().subscribe_best().await?;
    let mut seen = 0;
    while let Some(block) = blocks.next().await {
        let block = block?;
        tracing::info!(number = block.header().number, "block seen");
        seen += 1;
        if seen >= count {
            return Ok(());
        }
    }
    bail!("block subscription ended unexpectedly")
}

/// The node reports the spec version of whatever runtime it executes, so
/// polling it per block observes the upgrade the moment it applies.
async fn wait_for_spec_bump(runtime: &ScriptRuntime, old_spec: u32) -> anyhow::Result<()> {
    let mut blocks = runtime.chain.api().blocks().subscribe_best().await?;
    while let Some(block) = blocks.next().await {
        let block = block?;
        let spec_version = runtime.chain.spec_version().await?;
        if spec_version > old_spec {
            tracing::info!(
                number = block.header().number,
                "runtime upgraded {old_spec} -> {spec_version}"
            );
            return Ok(());
        }
        tracing::info!(
            number = block.header().number,
            spec_version,
            "still on the old runtime"
        );
    }
    bail!("block subscription ended unexpectedly")
}
