pub mod reconcile;
pub mod util;
pub mod vesting;

/// On-chain account identifier (SS58-parseable 32-byte id).
pub type AccountId = subxt::utils::AccountId32;
/// Token amount in base units.
pub type Balance = u128;
/// Chain block height.
pub type BlockNumber = u32;
