//! Production [`EnvironmentProber`] backed by the real machine.

use std::io::ErrorKind;
use std::path::Path;

use msh_core::OsFamily;
use tracing::trace;

use super::EnvironmentProber;

/// Probes the local file system and `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProber;

impl SystemProber {
    pub fn new() -> Self {
        Self
    }
}

impl EnvironmentProber for SystemProber {
    fn path_exists(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(_) => true,
            // Only a definite "not found" counts as missing; a permission
            // error still means something is there.
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                trace!("stat {} failed: {e}", path.display());
                true
            }
        }
    }

    fn executable_on_path(&self, name: &str) -> bool {
        match which::which(name) {
            Ok(found) => {
                trace!("{name} resolved to {}", found.display());
                true
            }
            Err(_) => false,
        }
    }

    fn os_family(&self) -> OsFamily {
        OsFamily::current()
    }
}
