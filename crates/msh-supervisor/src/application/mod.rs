//! Application layer use cases for the supervisor.
//!
//! Use cases here orchestrate domain objects from `msh_core` and talk to the
//! machine only through the traits defined in `infrastructure`
//! ([`PersistenceBackend`](crate::infrastructure::storage::PersistenceBackend)
//! and [`EnvironmentProber`](crate::infrastructure::environment::EnvironmentProber)),
//! so tests can run them against in-memory doubles.
//!
//! # Sub-modules
//!
//! - **`config_manager`** – Loads, validates, default-completes and saves the
//!   configuration document.

pub mod config_manager;
