use thiserror::Error;

use crate::Balance;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IntegerError {
    #[error("integer overflow during {0}")]
    Overflow(&'static str),
}

pub fn erroring_add(left: Balance, right: Balance) -> Result<Balance, IntegerError> {
    left.checked_add(right).ok_or(IntegerError::Overflow("addition"))
}

pub fn erroring_mul(left: Balance, right: Balance) -> Result<Balance, IntegerError> {
    left.checked_mul(right).ok_or(IntegerError::Overflow("multiplication"))
}
