// ABOUTME: Correlates issued transfers with their asynchronous completion events.
// ABOUTME: Exports the Transfer type state machine and the execute entry points.

mod correlator;
mod error;
mod state;

pub use correlator::{Completion, FileTransfer, Transfer, WaitMode, execute, execute_with_file};
pub use error::TransferError;
pub use state::{Issued, Subscribed};
