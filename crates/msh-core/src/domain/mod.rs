//! Domain layer: pure types with no OS dependencies.

pub mod config;
pub mod platform;
