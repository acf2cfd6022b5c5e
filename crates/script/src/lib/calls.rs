//! Call composition for every extrinsic the scripts submit.
//!
//! Calls are composed dynamically against the node's metadata rather than
//! generated from a pinned metadata file: the upgrade script must keep
//! working across the runtime upgrade it performs, and the distribution
//! scripts run against whichever runtime the deployment is on.
//!
//! Every builder returns a [`Value`] representing the outer runtime-call
//! enum, so calls nest freely (`batch_all`, `sudo`, `proxy` all take other
//! calls as arguments). Submission happens in
//! [`crate::chain_client::ChainClient::submit_batch_all`].

use subxt::dynamic::Value;

use vesting_distribution_shared::vesting::VestingSchedule;
use vesting_distribution_shared::{AccountId, Balance};

fn runtime_call(pallet: &str, call: &str, fields: Vec<(&str, Value)>) -> Value {
    Value::unnamed_variant(pallet, [Value::named_variant(call, fields)])
}

/// `MultiAddress::Id(..)`, the lookup source used by every dispatchable
/// taking an account argument.
fn address(id: &AccountId) -> Value {
    Value::unnamed_variant("Id", [Value::from_bytes(id.0)])
}

fn schedule(schedule: &VestingSchedule) -> Value {
    Value::named_composite(vec![
        ("start", Value::u128(schedule.start.into())),
        ("period", Value::u128(schedule.period.into())),
        ("period_count", Value::u128(schedule.period_count.into())),
        ("per_period", Value::u128(schedule.per_period)),
    ])
}

pub fn transfer(dest: &AccountId, amount: Balance) -> Value {
    runtime_call(
        "Balances",
        "transfer_allow_death",
        vec![("dest", address(dest)), ("value", Value::u128(amount))],
    )
}

pub fn force_transfer(source: &AccountId, dest: &AccountId, amount: Balance) -> Value {
    runtime_call(
        "Balances",
        "force_transfer",
        vec![
            ("source", address(source)),
            ("dest", address(dest)),
            ("value", Value::u128(amount)),
        ],
    )
}

/// Spawn a keyless proxy account. The account id is derived from the
/// spawner, proxy type and `index`, so the index must be unique per spawner.
pub fn create_pure(index: u16) -> Value {
    runtime_call(
        "Proxy",
        "create_pure",
        vec![
            ("proxy_type", Value::unnamed_variant("Any", [])),
            ("delay", Value::u128(0)),
            ("index", Value::u128(index.into())),
        ],
    )
}

pub fn add_proxy(delegate: &AccountId) -> Value {
    runtime_call(
        "Proxy",
        "add_proxy",
        vec![
            ("delegate", address(delegate)),
            ("proxy_type", Value::unnamed_variant("Any", [])),
            ("delay", Value::u128(0)),
        ],
    )
}

pub fn remove_proxy(delegate: &AccountId) -> Value {
    runtime_call(
        "Proxy",
        "remove_proxy",
        vec![
            ("delegate", address(delegate)),
            ("proxy_type", Value::unnamed_variant("Any", [])),
            ("delay", Value::u128(0)),
        ],
    )
}

/// Dispatch `call` as `real` through an existing proxy relationship.
pub fn proxy(real: &AccountId, call: Value) -> Value {
    runtime_call(
        "Proxy",
        "proxy",
        vec![
            ("real", address(real)),
            ("force_proxy_type", Value::unnamed_variant("None", [])),
            ("call", call),
        ],
    )
}

pub fn vested_transfer(dest: &AccountId, vesting_schedule: &VestingSchedule) -> Value {
    runtime_call(
        "Vesting",
        "vested_transfer",
        vec![
            ("dest", address(dest)),
            ("schedule", schedule(vesting_schedule)),
        ],
    )
}

/// Replace the full schedule list of an account (root only).
pub fn update_vesting_schedules(who: &AccountId, schedules: &[VestingSchedule]) -> Value {
    runtime_call(
        "Vesting",
        "update_vesting_schedules",
        vec![
            ("who", address(who)),
            (
                "vesting_schedules",
                Value::unnamed_composite(schedules.iter().map(schedule)),
            ),
        ],
    )
}

pub fn sudo(call: Value) -> Value {
    runtime_call("Sudo", "sudo", vec![("call", call)])
}

pub fn sudo_as(who: &AccountId, call: Value) -> Value {
    runtime_call("Sudo", "sudo_as", vec![("who", address(who)), ("call", call)])
}

/// Root dispatch with the weight check bypassed. A full `set_code` blob
/// overruns the block weight limit, so the upgrade has to go in this way.
pub fn sudo_unchecked_weight(call: Value) -> Value {
    runtime_call(
        "Sudo",
        "sudo_unchecked_weight",
        vec![
            ("call", call),
            (
                "weight",
                Value::named_composite(vec![
                    ("ref_time", Value::u128(0)),
                    ("proof_size", Value::u128(0)),
                ]),
            ),
        ],
    )
}

pub fn set_code(code: Vec<u8>) -> Value {
    runtime_call("System", "set_code", vec![("code", Value::from_bytes(code))])
}

/// Atomic batch: all calls apply or the whole extrinsic fails.
pub fn batch_all(calls: Vec<Value>) -> Value {
    runtime_call(
        "Utility",
        "batch_all",
        vec![("calls", Value::unnamed_composite(calls))],
    )
}
