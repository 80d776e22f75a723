//! Use case: configuration lifecycle.
//!
//! [`ConfigManager`] owns the two collaborators the lifecycle needs, a
//! [`PersistenceBackend`] for the document and an [`EnvironmentProber`] for
//! the machine, and exposes the four lifecycle steps:
//!
//! ```text
//! startup:  load() = read → parse → validate() → icon hook → derive_defaults()
//! anytime:  save() = serialize → write
//! ```
//!
//! The manager never holds the [`Configuration`] itself.  `load` hands the
//! value to the caller (the composition root in `main.rs`), which owns it and
//! passes it by reference to everything else.  Likewise `load` never
//! terminates the process; deciding that a failed load is fatal is the
//! caller's job.

use std::path::{Path, PathBuf};

use msh_core::{Configuration, OsFamily};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::infrastructure::environment::EnvironmentProber;
use crate::infrastructure::storage::{PersistenceBackend, StorageError};

/// Executable the supervised server runs on.
pub const JAVA_EXECUTABLE: &str = "java";

/// Terminal multiplexer some start commands wrap the server in.
pub const SCREEN_EXECUTABLE: &str = "screen";

/// The first environment check a configuration failed.
///
/// The `Display` text is the human-readable message reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("specified server file/folder does not exist: {}", .0.display())]
    MissingServerPath(PathBuf),

    #[error("java not installed!")]
    JavaNotInstalled,

    #[error("screen not installed!")]
    ScreenNotInstalled,
}

/// Error type for the configuration lifecycle.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backend could not read or write the document.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// The stored document is not valid configuration JSON.
    #[error("failed to parse config JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The configuration could not be serialized.
    #[error("could not marshal configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The document parsed but describes an unusable environment.
    #[error("config error: {0}")]
    Invalid(#[from] ValidationError),
}

/// Hook notified with the server directory once a configuration validates.
///
/// The supervisor uses it to pick up the server icon; the manager treats it
/// as opaque and ignores what it does.
pub trait IconLoader {
    fn load_icon(&self, server_dir: &Path);
}

/// Loads, validates, default-completes and saves the configuration document.
pub struct ConfigManager<P, E> {
    backend: P,
    prober: E,
    icon_loader: Option<Box<dyn IconLoader>>,
}

impl<P: PersistenceBackend, E: EnvironmentProber> ConfigManager<P, E> {
    /// Creates a manager over `backend` and `prober` with no icon hook.
    pub fn new(backend: P, prober: E) -> Self {
        Self {
            backend,
            prober,
            icon_loader: None,
        }
    }

    /// Installs the hook called with the server directory after validation.
    pub fn with_icon_loader(mut self, loader: impl IconLoader + 'static) -> Self {
        self.icon_loader = Some(Box::new(loader));
        self
    }

    pub fn prober(&self) -> &E {
        &self.prober
    }

    /// Reads, parses and validates the stored document, then fills defaults.
    ///
    /// On success the returned configuration needs no further checking.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Storage`] if the document cannot be read.
    /// - [`ConfigError::Parse`] if it is not valid configuration JSON.
    /// - [`ConfigError::Invalid`] if the environment check fails.
    pub fn load(&self) -> Result<Configuration, ConfigError> {
        let bytes = self.backend.read()?;
        let mut config: Configuration =
            serde_json::from_slice(&bytes).map_err(ConfigError::Parse)?;

        self.validate(&config)?;

        if let Some(loader) = &self.icon_loader {
            loader.load_icon(Path::new(&config.basic.server_dir_path));
        }

        self.derive_defaults(&mut config);
        debug!("configuration loaded");
        Ok(config)
    }

    /// Checks that `config` describes a usable environment on this machine.
    ///
    /// Checks run in order and stop at the first failure:
    ///
    /// 1. the server file (or, with an empty file name, the server directory)
    ///    exists;
    /// 2. `java` resolves on `PATH`;
    /// 3. on Linux and macOS, `screen` resolves on `PATH` if that platform's
    ///    start command mentions it.
    ///
    /// Only the prober's read-only queries are performed.
    pub fn validate(&self, config: &Configuration) -> Result<(), ValidationError> {
        let target = config.target_path();
        debug!("checking for {}", target.display());
        if !self.prober.path_exists(&target) {
            return Err(ValidationError::MissingServerPath(target));
        }

        if !self.prober.executable_on_path(JAVA_EXECUTABLE) {
            return Err(ValidationError::JavaNotInstalled);
        }

        // macOS checks its own start command, not the Windows one.
        let start_command = match self.prober.os_family() {
            OsFamily::Linux => Some(&config.basic.start_minecraft_server_lin),
            OsFamily::Darwin => Some(&config.basic.start_minecraft_server_mac),
            OsFamily::Windows | OsFamily::Other => None,
        };

        if let Some(command) = start_command {
            if command.contains(SCREEN_EXECUTABLE)
                && !self.prober.executable_on_path(SCREEN_EXECUTABLE)
            {
                return Err(ValidationError::ScreenNotInstalled);
            }
        }

        Ok(())
    }

    /// Fills blank force-stop commands; see [`Configuration::derive_defaults`].
    pub fn derive_defaults(&self, config: &mut Configuration) {
        config.derive_defaults();
    }

    /// Serializes `config` as indented JSON and writes it to the backend.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serialize`] or [`ConfigError::Storage`].
    pub fn try_save(&self, config: &Configuration) -> Result<(), ConfigError> {
        let bytes = serde_json::to_vec_pretty(config).map_err(ConfigError::Serialize)?;
        self.backend.write(&bytes)?;
        Ok(())
    }

    /// Best-effort save: failures are logged and otherwise ignored.
    pub fn save(&self, config: &Configuration) {
        match self.try_save(config) {
            Ok(()) => info!("configuration saved"),
            Err(e) => warn!("could not save configuration: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::infrastructure::environment::mock::MockProber;
    use crate::infrastructure::storage::mock::InMemoryBackend;
    use crate::infrastructure::storage::MockPersistenceBackend;

    const SCREEN_START: &str = "screen -S mc -d -m java -jar server.jar";

    fn config(dir: &str, file: &str) -> Configuration {
        let mut cfg = Configuration::default();
        cfg.basic.server_dir_path = dir.to_string();
        cfg.basic.server_file_name = file.to_string();
        cfg
    }

    fn healthy_linux() -> MockProber {
        MockProber::new(OsFamily::Linux)
            .with_path("/opt/mc/server.jar")
            .with_executable(JAVA_EXECUTABLE)
    }

    fn manager(prober: MockProber) -> ConfigManager<InMemoryBackend, MockProber> {
        ConfigManager::new(InMemoryBackend::new(), prober)
    }

    #[derive(Clone, Default)]
    struct RecordingIconLoader {
        calls: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl IconLoader for RecordingIconLoader {
        fn load_icon(&self, server_dir: &Path) {
            self.calls.borrow_mut().push(server_dir.to_path_buf());
        }
    }

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_existing_target_with_java() {
        let mgr = manager(healthy_linux());
        assert_eq!(mgr.validate(&config("/opt/mc", "server.jar")), Ok(()));
    }

    #[test]
    fn test_validate_empty_file_name_checks_bare_directory() {
        // Arrange
        let prober = MockProber::new(OsFamily::Windows)
            .with_path("/opt/mc")
            .with_executable(JAVA_EXECUTABLE);
        let mgr = manager(prober);

        // Act
        let result = mgr.validate(&config("/opt/mc", ""));

        // Assert
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_validate_missing_target_names_joined_path() {
        // Arrange: java is installed but the jar is not on disk
        let prober = MockProber::new(OsFamily::Linux).with_executable(JAVA_EXECUTABLE);
        let mgr = manager(prober);

        // Act
        let err = mgr
            .validate(&config("/opt/mc", "server.jar"))
            .expect_err("missing jar must fail");

        // Assert
        assert_eq!(
            err,
            ValidationError::MissingServerPath(PathBuf::from("/opt/mc/server.jar"))
        );
        assert!(err.to_string().contains("/opt/mc/server.jar"));
    }

    #[test]
    fn test_validate_absolute_file_name_stays_under_server_dir() {
        // Arrange: only /opt/mc/server.jar exists, /server.jar does not
        let mgr = manager(healthy_linux());

        // Act
        let result = mgr.validate(&config("/opt/mc", "/server.jar"));

        // Assert
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_validate_trailing_slash_dir_reports_cleaned_path() {
        let prober = MockProber::new(OsFamily::Linux).with_executable(JAVA_EXECUTABLE);
        let mgr = manager(prober);

        let err = mgr.validate(&config("/srv/mc/", "")).unwrap_err();

        assert_eq!(
            err.to_string(),
            "specified server file/folder does not exist: /srv/mc"
        );
    }

    #[test]
    fn test_validate_missing_target_is_reported_before_java() {
        // Nothing exists and nothing is installed: the path check wins.
        let mgr = manager(MockProber::new(OsFamily::Linux));
        let err = mgr.validate(&config("/opt/mc", "server.jar")).unwrap_err();
        assert!(matches!(err, ValidationError::MissingServerPath(_)));
    }

    #[test]
    fn test_validate_requires_java() {
        let prober = MockProber::new(OsFamily::Windows).with_path("/opt/mc/server.jar");
        let mgr = manager(prober);

        let err = mgr.validate(&config("/opt/mc", "server.jar")).unwrap_err();

        assert_eq!(err, ValidationError::JavaNotInstalled);
        assert_eq!(err.to_string(), "java not installed!");
    }

    #[test]
    fn test_validate_linux_screen_command_requires_screen() {
        // Arrange
        let mgr = manager(healthy_linux());
        let mut cfg = config("/opt/mc", "server.jar");
        cfg.basic.start_minecraft_server_lin = SCREEN_START.to_string();

        // Act
        let err = mgr.validate(&cfg).unwrap_err();

        // Assert
        assert_eq!(err, ValidationError::ScreenNotInstalled);
        assert_eq!(err.to_string(), "screen not installed!");
    }

    #[test]
    fn test_validate_linux_screen_command_with_screen_installed_passes() {
        let mgr = manager(healthy_linux().with_executable(SCREEN_EXECUTABLE));
        let mut cfg = config("/opt/mc", "server.jar");
        cfg.basic.start_minecraft_server_lin = SCREEN_START.to_string();

        assert_eq!(mgr.validate(&cfg), Ok(()));
    }

    #[test]
    fn test_validate_linux_without_screen_in_command_skips_tool_check() {
        let mgr = manager(healthy_linux());
        let mut cfg = config("/opt/mc", "server.jar");
        cfg.basic.start_minecraft_server_lin = "java -jar server.jar nogui".to_string();

        assert_eq!(mgr.validate(&cfg), Ok(()));
    }

    #[test]
    fn test_validate_darwin_checks_mac_start_command() {
        // Arrange
        let prober = MockProber::new(OsFamily::Darwin)
            .with_path("/opt/mc/server.jar")
            .with_executable(JAVA_EXECUTABLE);
        let mgr = manager(prober);
        let mut cfg = config("/opt/mc", "server.jar");
        cfg.basic.start_minecraft_server_mac = SCREEN_START.to_string();

        // Act / Assert
        assert_eq!(mgr.validate(&cfg), Err(ValidationError::ScreenNotInstalled));
    }

    #[test]
    fn test_validate_darwin_ignores_windows_start_command() {
        let prober = MockProber::new(OsFamily::Darwin)
            .with_path("/opt/mc/server.jar")
            .with_executable(JAVA_EXECUTABLE);
        let mgr = manager(prober);
        let mut cfg = config("/opt/mc", "server.jar");
        cfg.basic.start_minecraft_server_win = SCREEN_START.to_string();

        assert_eq!(mgr.validate(&cfg), Ok(()));
    }

    #[test]
    fn test_validate_windows_and_other_skip_tool_check() {
        for os in [OsFamily::Windows, OsFamily::Other] {
            let prober = MockProber::new(os)
                .with_path("/opt/mc/server.jar")
                .with_executable(JAVA_EXECUTABLE);
            let mgr = manager(prober);
            let mut cfg = config("/opt/mc", "server.jar");
            cfg.basic.start_minecraft_server_lin = SCREEN_START.to_string();
            cfg.basic.start_minecraft_server_mac = SCREEN_START.to_string();
            cfg.basic.start_minecraft_server_win = SCREEN_START.to_string();

            assert_eq!(mgr.validate(&cfg), Ok(()), "os = {os}");
        }
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_parses_validates_and_derives_defaults() {
        // Arrange
        let json = r#"{
            "Basic": {
                "ServerDirPath": "/opt/mc",
                "ServerFileName": "server.jar",
                "StopMinecraftServerLin": "stop",
                "ForceStopMinecraftServerLin": "",
                "StopMinecraftServerWin": "win-stop",
                "ForceStopMinecraftServerWin": "taskkill /F"
            },
            "Advanced": { "ListenPort": "25555" }
        }"#;
        let mgr = ConfigManager::new(InMemoryBackend::with_document(json), healthy_linux());

        // Act
        let cfg = mgr.load().expect("load must succeed");

        // Assert
        assert_eq!(cfg.basic.force_stop_minecraft_server_lin, "stop");
        assert_eq!(cfg.basic.force_stop_minecraft_server_win, "taskkill /F");
        assert_eq!(cfg.advanced.listen_port, "25555");
    }

    #[test]
    fn test_load_calls_icon_loader_with_server_dir() {
        let loader = RecordingIconLoader::default();
        let json = r#"{"Basic": {"ServerDirPath": "/opt/mc", "ServerFileName": "server.jar"}}"#;
        let mgr = ConfigManager::new(InMemoryBackend::with_document(json), healthy_linux())
            .with_icon_loader(loader.clone());

        mgr.load().expect("load");

        assert_eq!(*loader.calls.borrow(), vec![PathBuf::from("/opt/mc")]);
    }

    #[test]
    fn test_load_invalid_environment_skips_icon_loader() {
        // Arrange: jar is absent
        let loader = RecordingIconLoader::default();
        let json = r#"{"Basic": {"ServerDirPath": "/opt/mc", "ServerFileName": "server.jar"}}"#;
        let prober = MockProber::new(OsFamily::Linux).with_executable(JAVA_EXECUTABLE);
        let mgr = ConfigManager::new(InMemoryBackend::with_document(json), prober)
            .with_icon_loader(loader.clone());

        // Act
        let err = mgr.load().expect_err("load must fail");

        // Assert
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::MissingServerPath(_))
        ));
        assert!(err.to_string().starts_with("config error: "));
        assert!(loader.calls.borrow().is_empty());
    }

    #[test]
    fn test_load_malformed_document_is_parse_error() {
        let mgr = ConfigManager::new(InMemoryBackend::with_document("{ not json"), healthy_linux());
        assert!(matches!(mgr.load(), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_unreadable_document_is_storage_error() {
        // Arrange
        let mut backend = MockPersistenceBackend::new();
        backend.expect_read().times(1).returning(|| {
            Err(StorageError::Io {
                path: PathBuf::from("config.json"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        });
        let mgr = ConfigManager::new(backend, healthy_linux());

        // Act
        let err = mgr.load().expect_err("read failure must surface");

        // Assert
        assert!(matches!(err, ConfigError::Storage(StorageError::Io { .. })));
        assert!(err.to_string().contains("config.json"));
    }

    // ── save ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_save_writes_indented_json() {
        // Arrange
        let backend = InMemoryBackend::new();
        let mgr = ConfigManager::new(backend.clone(), healthy_linux());

        // Act
        mgr.save(&config("/opt/mc", "server.jar"));

        // Assert
        let text = String::from_utf8(backend.document().expect("document written")).unwrap();
        assert!(text.starts_with("{\n  \"Basic\": {\n    \"ServerDirPath\": \"/opt/mc\""));
        assert!(text.contains("\n  \"Advanced\": {"));
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        // Arrange
        let backend = InMemoryBackend::new();
        let mgr = ConfigManager::new(backend, healthy_linux());
        let mut original = config("/opt/mc", "server.jar");
        original.basic.stop_minecraft_server_lin = "stop".to_string();
        original.basic.force_stop_minecraft_server_lin = "kill".to_string();
        original.basic.hibernation_info = "sleeping".to_string();
        original.basic.time_before_stopping_empty_server = 120;
        original.advanced.debug = true;
        original.advanced.server_version = "1.20.4".to_string();

        // Act
        mgr.try_save(&original).expect("save");
        let loaded = mgr.load().expect("load");

        // Assert
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_save_then_load_only_changes_blank_force_stop_fields() {
        let mgr = ConfigManager::new(InMemoryBackend::new(), healthy_linux());
        let mut original = config("/opt/mc", "server.jar");
        original.basic.stop_minecraft_server_mac = "mac-stop".to_string();

        mgr.try_save(&original).expect("save");
        let loaded = mgr.load().expect("load");

        let mut expected = original.clone();
        expected.basic.force_stop_minecraft_server_mac = "mac-stop".to_string();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        // Arrange
        let mut backend = MockPersistenceBackend::new();
        backend.expect_write().times(1).returning(|_| {
            Err(StorageError::Io {
                path: PathBuf::from("config.json"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        });
        let mgr = ConfigManager::new(backend, healthy_linux());
        let cfg = config("/opt/mc", "server.jar");

        // Act: must not panic
        mgr.save(&cfg);

        // Assert: the fallible variant surfaces the same failure
        let mut backend = MockPersistenceBackend::new();
        backend.expect_write().returning(|_| Err(StorageError::Empty));
        let mgr = ConfigManager::new(backend, healthy_linux());
        assert!(matches!(
            mgr.try_save(&cfg),
            Err(ConfigError::Storage(StorageError::Empty))
        ));
    }

    #[test]
    fn test_derive_defaults_via_manager_matches_domain() {
        let mgr = manager(healthy_linux());
        let mut cfg = config("/opt/mc", "server.jar");
        cfg.basic.stop_minecraft_server_lin = "stop".to_string();

        mgr.derive_defaults(&mut cfg);

        assert_eq!(cfg.basic.force_stop_minecraft_server_lin, "stop");
    }
}
