//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProbeConfig (validated, immutable)
//!     → TesterConfig handed to the engine once per run
//!
//! whitelist file
//!     → lists.rs (lowercased name set)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a run never observes changes
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod lists;
pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ProbeConfig;
pub use schema::TesterConfig;
pub use schema::ObservabilityConfig;
pub use schema::PathsConfig;
