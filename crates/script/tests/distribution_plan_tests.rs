use vesting_distribution_scripts::consts;
use vesting_distribution_scripts::manifest::DistributionManifest;
use vesting_distribution_scripts::scripts::shared as shared_logic;
use vesting_distribution_shared::vesting::compute_distribution;
use vesting_distribution_shared::{AccountId, Balance};

#[test]
fn default_allocation_table_passes_validation() {
    let allocations = consts::default_allocations();
    let results = compute_distribution(&allocations, consts::UNIT).unwrap();

    assert_eq!(results.len(), 17);
    assert!(results.iter().all(|r| r.remainder == 0));

    let intended: Balance = allocations.iter().map(|a| a.amount).sum();
    assert_eq!(intended, 3_375_000_000);
    assert_eq!(shared_logic::grand_total(&results), intended * consts::UNIT);
}

#[test]
fn largest_entry_vests_exactly() {
    let allocations = consts::default_allocations();
    let results = compute_distribution(&allocations, consts::UNIT).unwrap();

    let first = &results[0];
    assert_eq!(first.schedule.start, 13_517_962);
    assert_eq!(first.schedule.period, 1_752);
    assert_eq!(first.schedule.period_count, 6_000);
    assert_eq!(first.schedule.per_period, 75_000_000_000_000_000);
    assert_eq!(first.total_base_units, 450_000_000 * consts::UNIT);
}

#[test]
fn treasury_account_is_derived_from_the_pallet_id() {
    let treasury = consts::treasury_account();
    assert_eq!(&treasury.0[..12], b"modlpy/trsry");
    assert!(treasury.0[12..].iter().all(|b| *b == 0));
}

#[test]
fn manifest_roundtrip_preserves_the_pairing() {
    let allocations = consts::default_allocations();
    let results = compute_distribution(&allocations, consts::UNIT).unwrap();
    let recipients: Vec<AccountId> = (0..allocations.len())
        .map(|i| AccountId::from([i as u8 + 1; 32]))
        .collect();

    let manifest = shared_logic::build_manifest(&allocations, &results, recipients.clone());

    let path = std::env::temp_dir().join("vesting-distribution-manifest-roundtrip.json");
    manifest.store(&path).unwrap();
    let loaded = DistributionManifest::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, manifest);

    let intended = loaded.intended();
    assert_eq!(intended.len(), recipients.len());
    for ((entry, recipient), result) in intended.iter().zip(&recipients).zip(&results) {
        assert_eq!(&entry.recipient, recipient);
        assert_eq!(entry.schedules, vec![result.schedule]);
        assert_eq!(entry.total_base_units, result.total_base_units);
    }
}
