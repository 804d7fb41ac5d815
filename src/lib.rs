// ABOUTME: Library root for machine-image - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod actions;
pub mod config;
pub mod error;
pub mod output;
pub mod service;
pub mod transfer;
pub mod types;
