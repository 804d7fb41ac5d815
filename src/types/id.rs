// ABOUTME: Transfer identifiers issued by systemd-importd.
// ABOUTME: A newtype so transfer ids are never confused with other integers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the transfer service assigns to a pull, import or export.
#[must_use = "transfer ids identify in-flight work and should not be ignored"]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(u32);

impl TransferId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
