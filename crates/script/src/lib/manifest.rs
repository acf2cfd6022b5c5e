use std::path::Path;

use serde::{Deserialize, Serialize};

use vesting_distribution_shared::reconcile::IntendedVesting;
use vesting_distribution_shared::vesting::VestingSchedule;
use vesting_distribution_shared::{AccountId, Balance};

use crate::utils;

/// One provisioned recipient: the pure proxy holding the allocation, the
/// human-denominated amount it was allocated and the schedule it vests
/// under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub recipient: AccountId,
    pub amount: Balance,
    pub schedule: VestingSchedule,
    pub total_base_units: Balance,
}

/// Durable record of the recipient <-> allocation pairing, written by the
/// distribution run. The pairing is immutable for the life of the
/// distribution; every reconciliation starts from this file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionManifest {
    pub entries: Vec<ManifestEntry>,
}

impl DistributionManifest {
    pub fn load(path: &Path) -> utils::Result<Self> {
        utils::read_json(path)
    }

    pub fn store(&self, path: &Path) -> utils::Result<()> {
        utils::write_json(path, self)
    }

    /// The intended on-chain end state, in table order.
    pub fn intended(&self) -> Vec<IntendedVesting> {
        self.entries
            .iter()
            .map(|entry| IntendedVesting {
                recipient: entry.recipient.clone(),
                schedules: vec![entry.schedule],
                total_base_units: entry.total_base_units,
            })
            .collect()
    }
}
