use vesting_distribution_shared::vesting::{AllocationEntry, VestingParams};
use vesting_distribution_shared::{AccountId, Balance};

/// Base-unit scale of the native token (12 decimals).
pub const UNIT: Balance = 1_000_000_000_000;

pub const DEFAULT_RPC_URL: &str = "ws://127.0.0.1:9988";

/// First disambiguation index used when deriving pure proxy accounts.
/// Indices below this were consumed by earlier provisioning runs.
pub const PROXY_INDEX_BASE: u16 = 2000;

/// Buffer transferred to every proxy so it can pay its own fees.
pub const PROXY_FUNDING: Balance = 500 * UNIT;

const TREASURY_PALLET_ID: [u8; 8] = *b"py/trsry";

/// The treasury's pallet-owned account: `modl` ++ pallet id, zero padded to
/// 32 bytes.
pub fn treasury_account() -> AccountId {
    let mut raw = [0u8; 32];
    raw[..4].copy_from_slice(b"modl");
    raw[4..12].copy_from_slice(&TREASURY_PALLET_ID);
    AccountId::from(raw)
}

/// The distribution event's allocation table. Every entry vests under the
/// same template; amounts are in human-denominated units (multiply by
/// [`UNIT`] for base units).
pub fn default_allocations() -> Vec<AllocationEntry> {
    const TEMPLATE: VestingParams = VestingParams {
        start: 13_517_962,
        period: 1_752,
        period_count: 6_000,
    };

    const AMOUNTS: [Balance; 17] = [
        450_000_000,
        450_000_000,
        450_000_000,
        225_000_000,
        225_000_000,
        225_000_000,
        225_000_000,
        180_000_000,
        168_750_000,
        146_250_000,
        112_500_000,
        112_500_000,
        112_500_000,
        112_500_000,
        112_500_000,
        45_000_000,
        22_500_000,
    ];

    AMOUNTS
        .iter()
        .map(|amount| AllocationEntry {
            amount: *amount,
            template: TEMPLATE,
        })
        .collect()
}
