//! Shared marketplace function primitives.
//!
//! This crate owns request/response contracts, payment request validation,
//! the sold-transition rule and record-store paths. It intentionally excludes
//! AWS SDK, HTTP client and Lambda runtime concerns.

pub mod contract;
pub mod listing;
pub mod paths;
