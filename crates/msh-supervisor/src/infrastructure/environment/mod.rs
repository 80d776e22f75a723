//! Environment probing: file existence, executable lookup and OS identity.
//!
//! Validation needs three read-only facts about the machine.  The
//! [`EnvironmentProber`] trait exposes exactly those, so the application layer
//! can be tested with [`mock::MockProber`] instead of the real file system and
//! `PATH`.

use std::path::Path;

use msh_core::OsFamily;

pub mod mock;
pub mod system;

/// Read-only view of the machine the supervisor runs on.
pub trait EnvironmentProber {
    /// Returns `true` unless `path` definitely does not exist.
    fn path_exists(&self, path: &Path) -> bool;
    /// Returns `true` if `name` resolves to an executable on the search path.
    fn executable_on_path(&self, name: &str) -> bool;
    /// Returns the operating-system family of this machine.
    fn os_family(&self) -> OsFamily;
}
