//! The persisted configuration document.
//!
//! The document is a JSON file with two groups, `Basic` and `Advanced`, each a
//! flat map of PascalCase field names to scalar values:
//!
//! ```json
//! {
//!   "Basic": {
//!     "ServerDirPath": "/opt/mc",
//!     "ServerFileName": "server.jar",
//!     "StartMinecraftServerLin": "screen -dmS mc java -jar server.jar nogui",
//!     "StopMinecraftServerLin": "screen -S mc -X stuff 'stop\\n'",
//!     "ForceStopMinecraftServerLin": "",
//!     "MinecraftServerStartupTime": 20,
//!     "TimeBeforeStoppingEmptyServer": 60,
//!     "CheckForUpdates": true
//!   },
//!   "Advanced": {
//!     "ListenHost": "0.0.0.0",
//!     "ListenPort": "25555",
//!     "TargetHost": "127.0.0.1",
//!     "TargetPort": "25565",
//!     "Debug": false
//!   }
//! }
//! ```
//!
//! Field names are case-sensitive.  A field that is absent from the file takes
//! its zero value (`""`, `0` or `false`), and so does one explicitly set to
//! `null`; fields this crate does not know about are ignored.  Ports are kept
//! as strings so a document with a non-numeric port token still loads.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use super::platform::OsFamily;

/// Root of the configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Configuration {
    #[serde(deserialize_with = "null_as_zero")]
    pub basic: BasicSettings,
    #[serde(deserialize_with = "null_as_zero")]
    pub advanced: AdvancedSettings,
}

/// Server location, per-platform launch commands and player-facing messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BasicSettings {
    /// Directory containing the server.
    #[serde(deserialize_with = "null_as_zero")]
    pub server_dir_path: String,
    /// Server jar (or folder) inside `server_dir_path`.  May be empty.
    #[serde(deserialize_with = "null_as_zero")]
    pub server_file_name: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub start_minecraft_server_lin: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub stop_minecraft_server_lin: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub force_stop_minecraft_server_lin: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub start_minecraft_server_win: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub stop_minecraft_server_win: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub force_stop_minecraft_server_win: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub start_minecraft_server_mac: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub stop_minecraft_server_mac: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub force_stop_minecraft_server_mac: String,
    /// Banner shown to players while the server hibernates.
    #[serde(deserialize_with = "null_as_zero")]
    pub hibernation_info: String,
    /// Banner shown to players while the server is starting.
    #[serde(deserialize_with = "null_as_zero")]
    pub starting_info: String,
    /// Seconds the server needs to come up.
    #[serde(deserialize_with = "null_as_zero")]
    pub minecraft_server_startup_time: i64,
    /// Seconds an empty server stays up before it is stopped.
    #[serde(deserialize_with = "null_as_zero")]
    pub time_before_stopping_empty_server: i64,
    #[serde(deserialize_with = "null_as_zero")]
    pub check_for_updates: bool,
}

/// Network endpoints and protocol identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AdvancedSettings {
    #[serde(deserialize_with = "null_as_zero")]
    pub listen_host: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub listen_port: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub target_host: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub target_port: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub debug: bool,
    #[serde(deserialize_with = "null_as_zero")]
    pub server_version: String,
    #[serde(deserialize_with = "null_as_zero")]
    pub server_protocol: String,
}

/// Reads `null` as the field's zero value.
fn null_as_zero<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The three commands configured for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCommands<'a> {
    pub start: &'a str,
    pub stop: &'a str,
    pub force_stop: &'a str,
}

impl Configuration {
    /// Path of the server file or folder whose existence is required.
    ///
    /// `ServerFileName` is always appended below `ServerDirPath`, even when
    /// it starts with a separator, and the result is cleaned lexically: `.`
    /// parts and trailing separators are dropped and `name/..` pairs cancel.
    /// With an empty file name this names the directory itself.
    pub fn target_path(&self) -> PathBuf {
        join_clean(&self.basic.server_dir_path, &self.basic.server_file_name)
    }

    /// Fills every blank force-stop command with the same platform's stop
    /// command.
    ///
    /// Platforms are handled independently and non-empty values are never
    /// touched, so calling this again is a no-op.
    pub fn derive_defaults(&mut self) {
        let basic = &mut self.basic;
        fill_if_empty(
            &mut basic.force_stop_minecraft_server_lin,
            &basic.stop_minecraft_server_lin,
        );
        fill_if_empty(
            &mut basic.force_stop_minecraft_server_mac,
            &basic.stop_minecraft_server_mac,
        );
        fill_if_empty(
            &mut basic.force_stop_minecraft_server_win,
            &basic.stop_minecraft_server_win,
        );
    }
}

fn join_clean(dir: &str, file: &str) -> PathBuf {
    if dir.is_empty() && file.is_empty() {
        return PathBuf::new();
    }

    let relative_file = Path::new(file)
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir));

    let mut parts: Vec<Component<'_>> = Vec::new();
    for part in Path::new(dir).components().chain(relative_file) {
        match part {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) => {}
                _ => parts.push(part),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        PathBuf::from(".")
    } else {
        parts.into_iter().collect()
    }
}

fn fill_if_empty(target: &mut String, fallback: &str) {
    if target.is_empty() {
        fallback.clone_into(target);
    }
}

impl BasicSettings {
    /// Selects the commands configured for `os`.
    ///
    /// Returns `None` for [`OsFamily::Other`], which has no command set.
    pub fn commands_for(&self, os: OsFamily) -> Option<PlatformCommands<'_>> {
        match os {
            OsFamily::Linux => Some(PlatformCommands {
                start: &self.start_minecraft_server_lin,
                stop: &self.stop_minecraft_server_lin,
                force_stop: &self.force_stop_minecraft_server_lin,
            }),
            OsFamily::Darwin => Some(PlatformCommands {
                start: &self.start_minecraft_server_mac,
                stop: &self.stop_minecraft_server_mac,
                force_stop: &self.force_stop_minecraft_server_mac,
            }),
            OsFamily::Windows => Some(PlatformCommands {
                start: &self.start_minecraft_server_win,
                stop: &self.stop_minecraft_server_win,
                force_stop: &self.force_stop_minecraft_server_win,
            }),
            OsFamily::Other => None,
        }
    }

    /// Startup time as a `Duration`.  Negative values clamp to zero.
    pub fn startup_time(&self) -> Duration {
        seconds(self.minecraft_server_startup_time)
    }

    /// Idle timeout as a `Duration`.  Negative values clamp to zero.
    pub fn idle_timeout(&self) -> Duration {
        seconds(self.time_before_stopping_empty_server)
    }
}

fn seconds(value: i64) -> Duration {
    Duration::from_secs(u64::try_from(value).unwrap_or(0))
}

impl AdvancedSettings {
    /// `host:port` the supervisor accepts player connections on.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    /// `host:port` of the supervised server.
    pub fn target_address(&self) -> String {
        format!("{}:{}", self.target_host, self.target_port)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
