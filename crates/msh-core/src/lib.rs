//! # msh-core
//!
//! Shared domain types for the msh server supervisor: the persisted
//! configuration document and the closed set of operating-system families the
//! supervisor knows how to launch servers on.
//!
//! This crate has zero dependencies on the file system, the `PATH`, or any
//! logging sink.  Everything that touches the machine lives in
//! `msh-supervisor`'s infrastructure layer.
//!
//! - **`domain::config`** – The `Configuration` document (`Basic` and
//!   `Advanced` groups), force-stop default derivation, target path
//!   computation, and per-platform command selection.
//!
//! - **`domain::platform`** – `OsFamily`, the enum the validation and command
//!   selection logic dispatches on.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `msh_core::Configuration` instead of `msh_core::domain::config::Configuration`.
pub use domain::config::{AdvancedSettings, BasicSettings, Configuration, PlatformCommands};
pub use domain::platform::OsFamily;
