//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--prefix`, server URL argument)
//! 2. `$RFM_CONFIG` environment variable (path to config file)
//! 3. Project-local `.rfm.toml` in the current working directory
//! 4. Global `~/.config/rfm/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

/// Remote server settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the file server (overridden by the CLI positional arg).
    pub url: Option<String>,
    /// Path prefix for reverse-proxy mounts, e.g. "/filesuploader".
    pub prefix: Option<String>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
}

/// Post-rename convergence refresh settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RefreshConfig {
    /// Total refresh cycles after a rename (the first is immediate).
    pub attempts: Option<u32>,
    /// Delay in milliseconds before each cycle after the first.
    pub delay_ms: Option<u64>,
}

/// Interactive shell settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ShellConfig {
    /// Ask for confirmation before delete operations.
    pub confirm_delete: Option<bool>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub refresh: RefreshConfig,
    pub shell: ShellConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default server base URL (the server's stock listen address).
pub const DEFAULT_SERVER_URL: &str = "http://localhost:6012";
/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default number of post-rename refresh cycles.
pub const DEFAULT_REFRESH_ATTEMPTS: u32 = 2;
/// Default delay between refresh cycles in milliseconds.
pub const DEFAULT_REFRESH_DELAY_MS: u64 = 500;

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path — that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. $RFM_CONFIG environment variable
    if let Ok(env_path) = std::env::var("RFM_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    // 2. Project-local `.rfm.toml` in CWD
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".rfm.toml"));
    }

    // 3. Global `~/.config/rfm/config.toml`
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("rfm").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return None,
    };
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self` — `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                url: other.server.url.clone().or(self.server.url),
                prefix: other.server.prefix.clone().or(self.server.prefix),
                connect_timeout_secs: other
                    .server
                    .connect_timeout_secs
                    .or(self.server.connect_timeout_secs),
            },
            refresh: RefreshConfig {
                attempts: other.refresh.attempts.or(self.refresh.attempts),
                delay_ms: other.refresh.delay_ms.or(self.refresh.delay_ms),
            },
            shell: ShellConfig {
                confirm_delete: other.shell.confirm_delete.or(self.shell.confirm_delete),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        // Start with built-in defaults (all None — the struct Default).
        let mut config = AppConfig::default();

        // Load from candidate files (lowest priority first so higher overwrites).
        let paths = candidate_paths();
        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in paths.iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        // Explicit --config file has higher priority than candidates.
        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        // CLI flag overrides are highest priority.
        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Base URL of the file server.
    pub fn server_url(&self) -> &str {
        self.server.url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Path prefix the server is mounted under; empty means none.
    pub fn prefix(&self) -> &str {
        self.server.prefix.as_deref().unwrap_or("")
    }

    /// Connect timeout for the HTTP client.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.server
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Post-rename refresh cycles; at least one cycle always runs.
    pub fn refresh_attempts(&self) -> u32 {
        self.refresh
            .attempts
            .unwrap_or(DEFAULT_REFRESH_ATTEMPTS)
            .max(1)
    }

    /// Delay between post-rename refresh cycles.
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh.delay_ms.unwrap_or(DEFAULT_REFRESH_DELAY_MS))
    }

    /// Whether to confirm before delete.
    pub fn confirm_delete(&self) -> bool {
        self.shell.confirm_delete.unwrap_or(true)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
