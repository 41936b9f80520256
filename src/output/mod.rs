//! Run output files.
//!
//! # Responsibilities
//! - Persist the failed-URL set for the next pipeline stage
//! - Write an optional JSON report of evaluated endpoints

pub mod report;

pub use report::{write_failed_urls, write_report, ProbeReport};
