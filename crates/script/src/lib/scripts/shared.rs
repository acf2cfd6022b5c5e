//! Logic shared between the distribution and reconciliation scripts.

use itertools::Itertools;

use vesting_distribution_shared::vesting::{compute_distribution, AllocationEntry, ScheduleResult};
use vesting_distribution_shared::{AccountId, Balance};

use crate::manifest::{DistributionManifest, ManifestEntry};

/// Derive and verify the schedules for the whole allocation table, and log
/// the grand total that will leave the treasury.
pub fn prepare_distribution(
    allocations: &[AllocationEntry],
    unit_scale: Balance,
) -> anyhow::Result<Vec<ScheduleResult>> {
    let results = compute_distribution(allocations, unit_scale)?;
    let total = grand_total(&results);
    tracing::info!(
        entries = results.len(),
        total_base_units = total,
        "allocation table verified"
    );
    Ok(results)
}

/// Sum of all intended disbursements. Overflow was already ruled out by
/// `compute_distribution`.
pub fn grand_total(results: &[ScheduleResult]) -> Balance {
    results.iter().map(|r| r.total_base_units).sum()
}

/// Bind freshly provisioned recipients to their allocations, in table
/// order. The three lists are produced together; a length mismatch is a
/// bug, hence `zip_eq`.
pub fn build_manifest(
    allocations: &[AllocationEntry],
    results: &[ScheduleResult],
    recipients: Vec<AccountId>,
) -> DistributionManifest {
    let entries = allocations
        .iter()
        .zip_eq(results)
        .zip_eq(recipients)
        .map(|((allocation, result), recipient)| ManifestEntry {
            recipient,
            amount: allocation.amount,
            schedule: result.schedule,
            total_base_units: result.total_base_units,
        })
        .collect();
    DistributionManifest { entries }
}
