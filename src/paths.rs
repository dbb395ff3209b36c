//! Centralized path resolution for sysreq
//!
//! # Environment Variables
//!
//! - `SYSREQ_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/sysreq`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `SYSREQ_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/sysreq` (if set)
//! 3. `~/.config/sysreq`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "SYSREQ_CONFIG_DIR";

/// File name of the default host manifest inside the config directory
pub const MANIFEST_FILE: &str = "host.toml";

/// Get the sysreq config directory path
pub fn config_dir() -> Result<PathBuf> {
    // 1. Check environment variable override
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    // 2. Check XDG_CONFIG_HOME
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("sysreq");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    // 3. Default: ~/.config/sysreq
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("sysreq");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Path of the default host manifest
pub fn default_manifest() -> Result<PathBuf> {
    Ok(config_dir()?.join(MANIFEST_FILE))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
