//! Receipt intake, asynchronous reward-points scoring, and eventually-consistent lookup.
//!
//! Receipts enter through [`receipts::ReceiptService::submit`], which validates them, assigns
//! an identifier, and schedules scoring in the background. Scores are read back through
//! [`receipts::ReceiptService::points`], which polls a bounded number of times while scoring
//! is still in flight.

pub mod config;
pub mod error;
pub mod receipts;
pub mod telemetry;
