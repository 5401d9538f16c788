//! Account identity and amount primitives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token amount in the smallest indivisible unit.
pub type Amount = u128;

/// Identity of a participant: a depositor, an external trader, or the
/// engine itself when it executes resting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl AccountId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn index(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct_{}", self.0)
    }
}

impl From<u64> for AccountId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
