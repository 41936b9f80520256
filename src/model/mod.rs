//! Data model shared by every subsystem.
//!
//! - `endpoint.rs`: the mutable unit of work
//! - `failed.rs`: URLs that ended offline, for downstream reporting

pub mod endpoint;
pub mod failed;

pub use endpoint::{Endpoint, Status};
pub use failed::FailedUrls;
