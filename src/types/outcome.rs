// ABOUTME: Transfer kinds and their terminal outcomes.
// ABOUTME: Normalizes the result strings importd reports when a transfer ends.

use serde::Serialize;
use std::fmt;

/// The long-running operations tracked by the transfer service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Pull,
    Import,
    Export,
}

impl TransferKind {
    /// Label used in user-facing messages ("Pull failed").
    pub fn label(&self) -> &'static str {
        match self {
            TransferKind::Pull => "Pull",
            TransferKind::Import => "Import",
            TransferKind::Export => "Export",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal classification of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failed,
    Canceled,
}

impl Outcome {
    /// Map a `TransferRemoved` result string onto an outcome.
    ///
    /// importd reports `done`, `failed` or `canceled`. The short form `cancel`
    /// is accepted as canceled as well; anything unrecognised counts as a
    /// failure so an unknown result can never pass for success.
    pub fn from_result(result: &str) -> Self {
        match result {
            "done" => Outcome::Success,
            "canceled" | "cancel" => Outcome::Canceled,
            _ => Outcome::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failed => write!(f, "failed"),
            Outcome::Canceled => write!(f, "canceled"),
        }
    }
}
