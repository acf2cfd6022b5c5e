use codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{erroring_add, erroring_mul, IntegerError};
use crate::{Balance, BlockNumber};

/// Vesting template as it appears in the allocation table. `per_period` is
/// always derived from the amount, never part of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingParams {
    pub start: BlockNumber,
    pub period: BlockNumber,
    pub period_count: u32,
}

/// A concrete schedule releasing `per_period` base units every `period`
/// blocks from `start`, `period_count` times. Field names and order match
/// the vesting pallet's storage encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct VestingSchedule {
    pub start: BlockNumber,
    pub period: BlockNumber,
    pub period_count: u32,
    pub per_period: Balance,
}

/// One row of the allocation table: a human-denominated amount plus the
/// vesting template it vests under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub amount: Balance,
    pub template: VestingParams,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleResult {
    pub schedule: VestingSchedule,
    pub remainder: Balance,
    pub total_base_units: Balance,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid allocation entry: {0}")]
    InvalidInput(&'static str),

    #[error("entry {index} leaves {remainder} of {total} base units unscheduled")]
    UnscheduledRemainder {
        index: usize,
        remainder: Balance,
        total: Balance,
    },

    #[error("scheduled disbursements sum to {scheduled} base units, allocation total is {intended}")]
    TotalMismatch { intended: Balance, scheduled: Balance },

    #[error(transparent)]
    Integer(#[from] IntegerError),
}

/// Derive the schedule for a single allocation entry.
///
/// `per_period` is rounded towards zero so the scheduled sum can never
/// exceed the allocated total; any shortfall is surfaced as `remainder`.
/// Holds `per_period * period_count + remainder == amount * unit_scale`
/// exactly.
pub fn compute_schedule(
    amount: Balance,
    template: &VestingParams,
    unit_scale: Balance,
) -> Result<ScheduleResult, Error> {
    if template.period_count == 0 {
        return Err(Error::InvalidInput("period_count must be at least 1"));
    }
    if template.period == 0 {
        return Err(Error::InvalidInput("period must be at least one block"));
    }
    if unit_scale == 0 {
        return Err(Error::InvalidInput("unit_scale must be positive"));
    }

    let total = erroring_mul(amount, unit_scale)?;
    let count = Balance::from(template.period_count);
    let schedule = VestingSchedule {
        start: template.start,
        period: template.period,
        period_count: template.period_count,
        per_period: total / count,
    };

    Ok(ScheduleResult {
        schedule,
        remainder: total % count,
        total_base_units: total,
    })
}

/// Derive schedules for a whole allocation table and verify that together
/// they account for every base unit.
///
/// Fails when any entry has a nonzero remainder, or when the disbursements
/// recomputed from the derived schedules do not sum to the allocated total.
/// Either case would silently over- or under-distribute on submission, so
/// the whole batch is rejected.
pub fn compute_distribution(
    allocations: &[AllocationEntry],
    unit_scale: Balance,
) -> Result<Vec<ScheduleResult>, Error> {
    let mut results = Vec::with_capacity(allocations.len());
    let mut intended: Balance = 0;
    let mut scheduled: Balance = 0;

    for (index, entry) in allocations.iter().enumerate() {
        let result = compute_schedule(entry.amount, &entry.template, unit_scale)?;
        if result.remainder != 0 {
            return Err(Error::UnscheduledRemainder {
                index,
                remainder: result.remainder,
                total: result.total_base_units,
            });
        }

        intended = erroring_add(intended, result.total_base_units)?;
        // Recompute from the derived schedule rather than trusting the
        // entry totals: this is the conservation check, not bookkeeping.
        let disbursed = erroring_mul(
            result.schedule.per_period,
            Balance::from(result.schedule.period_count),
        )?;
        scheduled = erroring_add(scheduled, erroring_add(disbursed, result.remainder)?)?;

        results.push(result);
    }

    if intended != scheduled {
        return Err(Error::TotalMismatch { intended, scheduled });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const UNIT: Balance = 1_000_000_000_000;

    fn template(period_count: u32) -> VestingParams {
        VestingParams {
            start: 13_517_962,
            period: 1_752,
            period_count,
        }
    }

    fn entry(amount: Balance, period_count: u32) -> AllocationEntry {
        AllocationEntry {
            amount,
            template: template(period_count),
        }
    }

    #[test]
    fn rounds_towards_zero_and_surfaces_remainder() {
        let result = compute_schedule(7, &template(3), 1).unwrap();
        assert_eq!(result.schedule.per_period, 2);
        assert_eq!(result.remainder, 1);
        assert_eq!(result.total_base_units, 7);
    }

    #[test]
    fn derives_exact_schedule_for_even_allocation() {
        let result = compute_schedule(450_000_000, &template(6_000), UNIT).unwrap();
        assert_eq!(result.schedule.per_period, 75_000_000_000_000_000);
        assert_eq!(result.remainder, 0);
        assert_eq!(result.total_base_units, 450_000_000 * UNIT);
        assert_eq!(result.schedule.start, 13_517_962);
        assert_eq!(result.schedule.period, 1_752);
        assert_eq!(result.schedule.period_count, 6_000);
    }

    #[test]
    fn zero_amount_is_a_valid_empty_schedule() {
        let result = compute_schedule(0, &template(10), UNIT).unwrap();
        assert_eq!(result.schedule.per_period, 0);
        assert_eq!(result.remainder, 0);
    }

    #[test]
    fn rejects_zero_period_count() {
        let err = compute_schedule(100, &template(0), UNIT).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_zero_period() {
        let mut params = template(10);
        params.period = 0;
        let err = compute_schedule(100, &params, UNIT).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_zero_unit_scale() {
        let err = compute_schedule(100, &template(10), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn overflowing_total_is_an_error_not_a_wraparound() {
        let err = compute_schedule(Balance::MAX, &template(10), 2).unwrap_err();
        assert_eq!(err, Error::Integer(IntegerError::Overflow("multiplication")));
    }

    #[test]
    fn distribution_rejects_entries_with_remainder() {
        let allocations = [entry(6, 3), entry(7, 3)];
        let err = compute_distribution(&allocations, 1).unwrap_err();
        assert_eq!(
            err,
            Error::UnscheduledRemainder {
                index: 1,
                remainder: 1,
                total: 7,
            }
        );
    }

    #[test]
    fn distribution_is_all_or_nothing() {
        let allocations = [entry(6, 3), entry(100, 0)];
        assert!(compute_distribution(&allocations, UNIT).is_err());
    }

    proptest! {
        #[test]
        fn schedule_accounts_for_every_base_unit(
            amount in 0u128..1_000_000_000_000,
            period_count in 1u32..100_000,
            unit_scale in 1u128..=1_000_000_000_000,
        ) {
            let result = compute_schedule(amount, &template(period_count), unit_scale).unwrap();
            let disbursed = result.schedule.per_period * Balance::from(period_count);
            prop_assert_eq!(disbursed + result.remainder, amount * unit_scale);
            prop_assert!(result.remainder < Balance::from(period_count));
        }

        #[test]
        fn distribution_conserves_the_allocated_total(
            per_periods in prop::collection::vec((1u128..1_000_000, 1u32..10_000), 1..20),
        ) {
            // Amounts constructed as a multiple of the period count, so the
            // zero-remainder policy is satisfied by construction.
            let allocations: Vec<AllocationEntry> = per_periods
                .iter()
                .map(|(per_period, count)| entry(per_period * Balance::from(*count), *count))
                .collect();

            let results = compute_distribution(&allocations, UNIT).unwrap();

            let intended: Balance = allocations.iter().map(|a| a.amount * UNIT).sum();
            let scheduled: Balance = results.iter().map(|r| r.total_base_units).sum();
            prop_assert_eq!(intended, scheduled);
            prop_assert!(results.iter().all(|r| r.remainder == 0));
        }
    }
}
