// ABOUTME: Command module aggregator for the machine-image CLI.
// ABOUTME: Re-exports apply, list, and service connection handlers.

mod apply;
mod list;
mod service_connection;

pub use apply::{RunOptions, apply_resources};
pub use list::list;
pub use service_connection::connect_to_service;
