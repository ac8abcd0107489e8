//! AWS-oriented adapters and handlers for the marketplace functions.
//!
//! This crate owns runtime integration details (Lambda handlers, the payment
//! processor, record store and push adapters, environment configuration) on
//! top of the pure contracts in `marketplace_core`.

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
