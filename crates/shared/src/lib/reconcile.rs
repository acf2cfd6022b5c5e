use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{erroring_add, IntegerError};
use crate::vesting::VestingSchedule;
use crate::{AccountId, Balance};

/// What a recipient account is supposed to look like once the distribution
/// has settled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntendedVesting {
    pub recipient: AccountId,
    pub schedules: Vec<VestingSchedule>,
    pub total_base_units: Balance,
}

/// Point-in-time read of a recipient account. Fetched fresh for every
/// reconciliation run, never cached.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OnChainObservation {
    pub schedules: Vec<VestingSchedule>,
    pub free: Balance,
    pub reserved: Balance,
}

/// Replace the account's entire schedule list. Partial-field edits are
/// never emitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub recipient: AccountId,
    pub schedules: Vec<VestingSchedule>,
}

/// Return surplus funds from a recipient to the treasury.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clawback {
    pub recipient: AccountId,
    pub amount: Balance,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub schedule_updates: Vec<ScheduleUpdate>,
    pub clawbacks: Vec<Clawback>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.schedule_updates.is_empty() && self.clawbacks.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("no on-chain observation for recipient {0}")]
    MissingObservation(AccountId),

    #[error(transparent)]
    Integer(#[from] IntegerError),
}

/// Compare intended state against observations keyed by recipient and derive
/// the minimal corrective actions.
///
/// A `ScheduleUpdate` is emitted whenever the observed schedule list differs
/// from the intended one in any field (order-sensitive). A `Clawback` is
/// emitted only when the account holds strictly more than intended;
/// underfunded accounts are left to the explicit funding step upstream.
/// Actions come out in the order of `intended`, so the plan stays auditable
/// against the allocation table. An empty plan is the normal converged
/// result.
pub fn reconcile(
    intended: &[IntendedVesting],
    observed: &BTreeMap<AccountId, OnChainObservation>,
) -> Result<ReconcilePlan, Error> {
    let mut plan = ReconcilePlan::default();

    for entry in intended {
        let observation = observed
            .get(&entry.recipient)
            .ok_or_else(|| Error::MissingObservation(entry.recipient.clone()))?;

        if observation.schedules != entry.schedules {
            plan.schedule_updates.push(ScheduleUpdate {
                recipient: entry.recipient.clone(),
                schedules: entry.schedules.clone(),
            });
        }

        let held = erroring_add(observation.free, observation.reserved)?;
        if held > entry.total_base_units {
            plan.clawbacks.push(Clawback {
                recipient: entry.recipient.clone(),
                amount: held - entry.total_base_units,
            });
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: u8) -> AccountId {
        AccountId::from([byte; 32])
    }

    fn schedule(per_period: Balance) -> VestingSchedule {
        VestingSchedule {
            start: 100,
            period: 10,
            period_count: 5,
            per_period,
        }
    }

    fn intended(byte: u8, per_period: Balance) -> IntendedVesting {
        IntendedVesting {
            recipient: account(byte),
            schedules: vec![schedule(per_period)],
            total_base_units: per_period * 5,
        }
    }

    fn converged(entry: &IntendedVesting) -> OnChainObservation {
        OnChainObservation {
            schedules: entry.schedules.clone(),
            free: entry.total_base_units,
            reserved: 0,
        }
    }

    fn observed_for(entries: &[IntendedVesting]) -> BTreeMap<AccountId, OnChainObservation> {
        entries
            .iter()
            .map(|e| (e.recipient.clone(), converged(e)))
            .collect()
    }

    #[test]
    fn converged_state_yields_empty_plan() {
        let entries = vec![intended(1, 100), intended(2, 200)];
        let observed = observed_for(&entries);

        let plan = reconcile(&entries, &observed).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn surplus_yields_exactly_one_clawback() {
        let entries = vec![intended(1, 100)];
        let mut observed = observed_for(&entries);
        observed.get_mut(&account(1)).unwrap().free = 600;

        let plan = reconcile(&entries, &observed).unwrap();
        assert!(plan.schedule_updates.is_empty());
        assert_eq!(
            plan.clawbacks,
            vec![Clawback {
                recipient: account(1),
                amount: 100,
            }]
        );
    }

    #[test]
    fn reserved_funds_count_towards_the_held_total() {
        let entries = vec![intended(1, 100)];
        let mut observed = observed_for(&entries);
        let observation = observed.get_mut(&account(1)).unwrap();
        observation.free = 450;
        observation.reserved = 150;

        let plan = reconcile(&entries, &observed).unwrap();
        assert_eq!(plan.clawbacks[0].amount, 100);
    }

    #[test]
    fn underfunded_account_is_never_drained() {
        let mut entries = vec![intended(1, 100)];
        entries[0].total_base_units = 700;
        let mut observed = observed_for(&entries);
        observed.get_mut(&account(1)).unwrap().free = 600;

        let plan = reconcile(&entries, &observed).unwrap();
        assert!(plan.clawbacks.is_empty());
    }

    #[test]
    fn any_schedule_field_change_triggers_a_full_update() {
        let entries = vec![intended(1, 100), intended(2, 200)];
        let mut observed = observed_for(&entries);
        observed.get_mut(&account(1)).unwrap().schedules[0].period_count = 6;

        let plan = reconcile(&entries, &observed).unwrap();
        assert_eq!(
            plan.schedule_updates,
            vec![ScheduleUpdate {
                recipient: account(1),
                schedules: entries[0].schedules.clone(),
            }]
        );
        assert!(plan.clawbacks.is_empty());
    }

    #[test]
    fn missing_schedule_list_triggers_an_update() {
        let entries = vec![intended(1, 100)];
        let mut observed = observed_for(&entries);
        observed.get_mut(&account(1)).unwrap().schedules.clear();

        let plan = reconcile(&entries, &observed).unwrap();
        assert_eq!(plan.schedule_updates.len(), 1);
    }

    #[test]
    fn extra_schedule_entries_trigger_an_update() {
        let entries = vec![intended(1, 100)];
        let mut observed = observed_for(&entries);
        let extra = schedule(1);
        observed.get_mut(&account(1)).unwrap().schedules.push(extra);

        let plan = reconcile(&entries, &observed).unwrap();
        assert_eq!(plan.schedule_updates.len(), 1);
    }

    #[test]
    fn actions_follow_the_intended_order() {
        let entries = vec![intended(9, 100), intended(3, 200), intended(5, 300)];
        let mut observed = observed_for(&entries);
        for observation in observed.values_mut() {
            observation.schedules[0].start += 1;
            observation.free += 7;
        }

        let plan = reconcile(&entries, &observed).unwrap();
        let update_order: Vec<AccountId> = plan
            .schedule_updates
            .iter()
            .map(|u| u.recipient.clone())
            .collect();
        let clawback_order: Vec<AccountId> = plan
            .clawbacks
            .iter()
            .map(|c| c.recipient.clone())
            .collect();
        let expected = vec![account(9), account(3), account(5)];
        assert_eq!(update_order, expected);
        assert_eq!(clawback_order, expected);
    }

    #[test]
    fn unobserved_recipient_is_an_error() {
        let entries = vec![intended(1, 100), intended(2, 200)];
        let mut observed = observed_for(&entries);
        observed.remove(&account(2));

        let err = reconcile(&entries, &observed).unwrap_err();
        assert_eq!(err, Error::MissingObservation(account(2)));
    }
}
