//! Infrastructure layer for the supervisor.
//!
//! Contains OS-facing adapters: the configuration file backend and the
//! environment prober (file stat, `PATH` lookup, OS identification).
//!
//! **Dependency rule**: this layer may depend on `msh_core`, but MUST NOT
//! import the `application` layer.

pub mod environment;
pub mod storage;
