pub mod distribute;
pub mod prelude;
pub mod reconcile;
pub mod shared;
pub mod upgrade;
