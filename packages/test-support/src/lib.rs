//! Test support utilities shared by the workspace crates.
//!
//! Provides idempotent logging initialization for test binaries and an
//! in-memory log sink for asserting on what the gate reports.

pub mod capture;
pub mod logging;
