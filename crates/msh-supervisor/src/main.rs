//! msh supervisor entry point.
//!
//! This is the composition root: it owns the single [`Configuration`] for the
//! life of the process and decides that a failed load is fatal.
//!
//! # Usage
//!
//! ```text
//! msh [OPTIONS]
//!
//! Options:
//!   --config <PATH>  Configuration document [default: config.json] [env: MSH_CONFIG]
//!   --check          Validate the configuration, print this platform's commands and exit
//!   --save           Write the default-completed configuration back to disk
//! ```
//!
//! The log level comes from `RUST_LOG` (default `info`).  When `RUST_LOG` is
//! unset and the document has `"Advanced": { "Debug": true }`, the level is
//! raised to `debug` once the configuration has loaded.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

use msh_core::{Configuration, OsFamily};
use msh_supervisor::application::config_manager::ConfigManager;
use msh_supervisor::infrastructure::environment::system::SystemProber;
use msh_supervisor::infrastructure::environment::EnvironmentProber;
use msh_supervisor::infrastructure::storage::config::{JsonFileBackend, DEFAULT_CONFIG_FILE};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Minecraft server hibernation supervisor.
#[derive(Debug, Parser)]
#[command(name = "msh", about = "Minecraft server hibernation supervisor", version)]
struct Cli {
    /// Path of the JSON configuration document.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, env = "MSH_CONFIG")]
    config: PathBuf,

    /// Validate the configuration, print the commands for this platform and exit.
    #[arg(long)]
    check: bool,

    /// Persist the loaded configuration (with derived defaults) back to disk.
    #[arg(long)]
    save: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // The filter sits behind a reload layer so the document's Debug switch can
    // lower it after loading.
    let env_filter = EnvFilter::try_from_default_env();
    let rust_log_set = env_filter.is_ok();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let manager = ConfigManager::new(JsonFileBackend::new(&cli.config), SystemProber::new());
    let config = match manager.load() {
        Ok(config) => config,
        Err(e) => {
            error!("loadConfig: {e}");
            std::process::exit(1);
        }
    };

    if config.advanced.debug && !rust_log_set {
        filter_handle.modify(|filter| *filter = EnvFilter::new("debug"))?;
    }

    info!("configuration loaded from {}", cli.config.display());

    let os = manager.prober().os_family();
    if cli.check {
        print_commands(&config, os);
        return Ok(());
    }

    info!(
        "listening on {}, forwarding to {}",
        config.advanced.listen_address(),
        config.advanced.target_address()
    );
    info!(
        "startup time {:?}, idle timeout {:?}",
        config.basic.startup_time(),
        config.basic.idle_timeout()
    );

    if cli.save {
        manager.save(&config);
    }

    Ok(())
}

fn print_commands(config: &Configuration, os: OsFamily) {
    println!("configuration OK ({os})");
    match config.basic.commands_for(os) {
        Some(commands) => {
            println!("start:      {}", commands.start);
            println!("stop:       {}", commands.stop);
            println!("force stop: {}", commands.force_stop);
        }
        None => println!("no server commands are configured for this platform"),
    }
}
