use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use subxt::dynamic::Value;

use vesting_distribution_shared::reconcile::{reconcile, OnChainObservation, ReconcilePlan};
use vesting_distribution_shared::AccountId;

use crate::calls;
use crate::manifest::DistributionManifest;
use crate::scripts::prelude::ScriptRuntime;

#[derive(Debug, Default)]
pub struct Flags {
    pub dry_run: bool,
}

/// Compare the distribution manifest against live chain state and submit
/// whatever corrections are needed to converge them. Observations are read
/// fresh; the manifest is the authoritative recipient set.
pub async fn run(
    runtime: &ScriptRuntime,
    manifest_path: &Path,
    flags: &Flags,
) -> anyhow::Result<ReconcilePlan> {
    let manifest = DistributionManifest::load(manifest_path).with_context(|| {
        format!(
            "failed to load distribution manifest from {}",
            manifest_path.display()
        )
    })?;
    let intended = manifest.intended();

    let (chain, node_version) = runtime.chain.chain_info().await?;
    tracing::info!(%chain, %node_version, recipients = intended.len(), "reconciling");

    let mut observed = BTreeMap::new();
    for entry in &intended {
        let balances = runtime.chain.account_balances(&entry.recipient).await?;
        let schedules = runtime.chain.vesting_schedules(&entry.recipient).await?;
        observed.insert(
            entry.recipient.clone(),
            OnChainObservation {
                schedules,
                free: balances.free,
                reserved: balances.reserved,
            },
        );
    }

    let plan = reconcile(&intended, &observed)?;
    if plan.is_empty() {
        tracing::info!("on-chain state matches the intended distribution");
        return Ok(plan);
    }

    for update in &plan.schedule_updates {
        tracing::warn!(recipient = %update.recipient, "schedule drift detected");
    }
    for clawback in &plan.clawbacks {
        tracing::warn!(
            recipient = %clawback.recipient,
            surplus = clawback.amount,
            "surplus balance detected"
        );
    }

    if flags.dry_run {
        tracing::info!(
            schedule_updates = plan.schedule_updates.len(),
            clawbacks = plan.clawbacks.len(),
            "dry run, corrective actions not submitted"
        );
        return Ok(plan);
    }

    let batch = corrective_calls(&plan, &runtime.settings.treasury);
    runtime.chain.submit_batch_all(&runtime.signer, batch).await?;
    tracing::info!(
        schedule_updates = plan.schedule_updates.len(),
        clawbacks = plan.clawbacks.len(),
        "corrective batch finalized"
    );

    Ok(plan)
}

/// Map a plan onto extrinsics, preserving plan order: schedule replacements
/// go in as root, clawbacks impersonate the holding account and send its
/// surplus back to the treasury.
pub fn corrective_calls(plan: &ReconcilePlan, treasury: &AccountId) -> Vec<Value> {
    let mut batch = Vec::with_capacity(plan.schedule_updates.len() + plan.clawbacks.len());
    for update in &plan.schedule_updates {
        batch.push(calls::sudo(calls::update_vesting_schedules(
            &update.recipient,
            &update.schedules,
        )));
    }
    for clawback in &plan.clawbacks {
        batch.push(calls::sudo_as(
            &clawback.recipient,
            calls::transfer(treasury, clawback.amount),
        ));
    }
    batch
}
