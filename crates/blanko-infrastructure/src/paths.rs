//! Default configuration file locations.

use std::path::PathBuf;

use blanko_core::error::{BlankoError, Result};

/// Path resolution for blanko's configuration.
///
/// Only the config file lives in a well-known place; templates, photos, and
/// render scratch are wherever the config points.
pub struct BlankoPaths;

impl BlankoPaths {
    /// The blanko configuration directory (e.g. `~/.config/blanko/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("blanko"))
            .ok_or_else(|| BlankoError::config("cannot determine the configuration directory"))
    }

    /// The default configuration file (`config.toml` in the config
    /// directory).
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
