use std::path::Path;

use anyhow::{ensure, Context};
use itertools::Itertools;
use tracing::Instrument;

use vesting_distribution_shared::util::erroring_add;
use vesting_distribution_shared::vesting::{AllocationEntry, ScheduleResult};
use vesting_distribution_shared::{AccountId, Balance};

use crate::calls;
use crate::chain_client::events::{ProxyAdded, PureCreated, Transfer};
use crate::manifest::DistributionManifest;
use crate::scripts::prelude::ScriptRuntime;
use crate::scripts::shared as shared_logic;

#[derive(Debug, Default)]
pub struct Flags {
    pub dry_run: bool,
}

/// Run the full distribution: provision pure proxies, fund them, hand them
/// over to the multisig, then issue the vesting transfers out of the
/// treasury. Each phase is one finalized `batch_all`, verified against its
/// events before the next phase starts.
///
/// Returns the written manifest, or `None` on a dry run.
pub async fn run(
    runtime: &ScriptRuntime,
    allocations: &[AllocationEntry],
    manifest_path: &Path,
    flags: &Flags,
) -> anyhow::Result<Option<DistributionManifest>> {
    let span = tracing::info_span!("span:distribute", entries = allocations.len());
    run_inner(runtime, allocations, manifest_path, flags)
        .instrument(span)
        .await
}

async fn run_inner(
    runtime: &ScriptRuntime,
    allocations: &[AllocationEntry],
    manifest_path: &Path,
    flags: &Flags,
) -> anyhow::Result<Option<DistributionManifest>> {
    let (chain, node_version) = runtime.chain.chain_info().await?;
    tracing::info!(%chain, %node_version, "connected");

    let results = shared_logic::prepare_distribution(allocations, runtime.settings.unit_scale)?;
    let total = shared_logic::grand_total(&results);

    let delegate = runtime
        .settings
        .delegate_multisig
        .clone()
        .context("DELEGATE_MULTISIG must be set to run the distribution")?;
    tracing::info!(
        signer = %runtime.signer_account(),
        treasury = %runtime.settings.treasury,
        delegate = %delegate,
        "accounts resolved"
    );

    if flags.dry_run {
        for (entry, result) in results.iter().enumerate() {
            tracing::info!(
                entry,
                per_period = result.schedule.per_period,
                total_base_units = result.total_base_units,
                "computed schedule"
            );
        }
        tracing::info!("dry run, nothing submitted");
        return Ok(None);
    }

    tracing::info!(count = results.len(), "creating pure proxy accounts");
    let proxies = provision_proxies(runtime, results.len()).await?;
    tracing::info!("proxies created");

    tracing::info!("funding proxies");
    fund_proxies(runtime, &proxies).await?;
    tracing::info!("all proxies funded");

    tracing::info!("handing proxies over to the multisig");
    rotate_delegates(runtime, &proxies, &delegate).await?;
    tracing::info!("all proxies delegated to the multisig");

    tracing::info!(total_base_units = total, "distributing funds");
    vest_allocations(runtime, &results, &proxies, total).await?;
    tracing::info!("funds distributed");

    let manifest = shared_logic::build_manifest(allocations, &results, proxies);
    manifest.store(manifest_path).with_context(|| {
        format!(
            "failed to write distribution manifest to {}",
            manifest_path.display()
        )
    })?;
    tracing::info!(path = %manifest_path.display(), "distribution manifest written");

    Ok(Some(manifest))
}

/// One `create_pure` per allocation entry, disambiguation indices threaded
/// from the configured base. The returned account ids are in call order,
/// which fixes the recipient <-> allocation pairing for good.
async fn provision_proxies(runtime: &ScriptRuntime, count: usize) -> anyhow::Result<Vec<AccountId>> {
    let base = runtime.settings.proxy_index_base;
    let mut batch = Vec::with_capacity(count);
    for i in 0..count {
        let index = u16::try_from(i)
            .ok()
            .and_then(|i| base.checked_add(i))
            .context("proxy index space exhausted")?;
        batch.push(calls::create_pure(index));
    }

    let events = runtime.chain.submit_batch_all(&runtime.signer, batch).await?;
    let proxies: Vec<AccountId> = events
        .find::<PureCreated>()
        .map(|event| event.map(|e| e.pure))
        .collect::<Result<_, _>>()?;
    ensure!(
        proxies.len() == count,
        "created {} proxies, expected {count}",
        proxies.len()
    );
    Ok(proxies)
}

async fn fund_proxies(runtime: &ScriptRuntime, proxies: &[AccountId]) -> anyhow::Result<()> {
    let from = runtime.signer_account();
    let transfers = proxies
        .iter()
        .map(|proxy| calls::force_transfer(&from, proxy, runtime.settings.proxy_funding))
        .collect();

    let events = runtime
        .chain
        .submit_batch_all(&runtime.signer, vec![calls::sudo(calls::batch_all(transfers))])
        .await?;
    let funded = events.find::<Transfer>().collect::<Result<Vec<_>, _>>()?;
    ensure!(
        funded.len() == proxies.len(),
        "funded {} proxies, expected {}",
        funded.len(),
        proxies.len()
    );
    Ok(())
}

/// Swap the spawner out of each proxy's delegate list and the multisig in,
/// through the proxy relationship that still exists at this point.
async fn rotate_delegates(
    runtime: &ScriptRuntime,
    proxies: &[AccountId],
    delegate: &AccountId,
) -> anyhow::Result<()> {
    let signer_account = runtime.signer_account();
    let rotations = proxies
        .iter()
        .map(|proxy| {
            calls::proxy(
                proxy,
                calls::batch_all(vec![
                    calls::remove_proxy(&signer_account),
                    calls::add_proxy(delegate),
                ]),
            )
        })
        .collect();

    let events = runtime.chain.submit_batch_all(&runtime.signer, rotations).await?;
    let added = events.find::<ProxyAdded>().collect::<Result<Vec<_>, _>>()?;
    ensure!(
        added.len() == proxies.len(),
        "rotated {} delegates, expected {}",
        added.len(),
        proxies.len()
    );
    for event in &added {
        ensure!(
            &event.delegatee == delegate,
            "proxy {} delegated to {}, expected the multisig",
            event.delegator,
            event.delegatee
        );
    }
    Ok(())
}

/// Move the grand total into the treasury, then vest it out to the proxies
/// as the treasury, all in one atomic batch. The transfer events are summed
/// per direction and must match the intended total exactly on both legs.
async fn vest_allocations(
    runtime: &ScriptRuntime,
    results: &[ScheduleResult],
    proxies: &[AccountId],
    total: Balance,
) -> anyhow::Result<()> {
    let treasury = &runtime.settings.treasury;

    let mut moves = Vec::with_capacity(results.len() + 1);
    moves.push(calls::transfer(treasury, total));
    for (result, proxy) in results.iter().zip_eq(proxies) {
        moves.push(calls::sudo_as(
            treasury,
            calls::vested_transfer(proxy, &result.schedule),
        ));
    }

    let events = runtime.chain.submit_batch_all(&runtime.signer, moves).await?;

    let mut into_treasury: Balance = 0;
    let mut vested: Balance = 0;
    for event in events.find::<Transfer>() {
        let event = event?;
        if event.from == *treasury {
            vested = erroring_add(vested, event.amount)?;
        } else if event.to == *treasury {
            into_treasury = erroring_add(into_treasury, event.amount)?;
        }
    }
    ensure!(
        into_treasury == total,
        "moved {into_treasury} base units into the treasury, expected {total}"
    );
    ensure!(
        vested == total,
        "vested {vested} base units out of the treasury, expected {total}"
    );
    Ok(())
}
