// ABOUTME: Transfer state marker types for the type state pattern.
// ABOUTME: A transfer can only be issued once its completion subscription is live.

use crate::types::TransferId;

/// Subscribed: completion events are being captured, nothing issued yet.
/// Available actions: `issued()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Subscribed;

/// Issued: the service accepted the work under this id.
/// Available actions: `wait()`, `wait_holding()`
#[derive(Debug, Clone, Copy)]
pub struct Issued {
    pub(crate) id: TransferId,
}
