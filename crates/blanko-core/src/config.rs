//! Application configuration model.
//!
//! Loaded once at startup from a TOML file (see the infrastructure crate).
//! Every section falls back to a sensible default so a missing file still
//! yields a runnable configuration. The bot token is the exception: startup
//! validates it explicitly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Bot identity and credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Opaque API token. May also arrive via the `BLANKO_BOT_TOKEN`
    /// environment variable, which wins over the file.
    #[serde(default)]
    pub token: String,
}

/// Filesystem locations for templates, menu photos, and render scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    #[serde(default = "default_photos_dir")]
    pub photos_dir: PathBuf,
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Optional catalog file overriding the built-in menu tree and chains.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Optional lexicon file overriding built-in strings.
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            photos_dir: default_photos_dir(),
            work_dir: default_work_dir(),
            catalog: None,
            lexicon: None,
        }
    }
}

/// Session lifecycle tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// An in-progress fill idle for this long is abandoned and cleared.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// How often the idle sweeper runs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Menu rendering tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Desired number of buttons per keyboard row.
    #[serde(default = "default_keyboard_width")]
    pub keyboard_width: usize,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            keyboard_width: default_keyboard_width(),
        }
    }
}

/// Typesetter invocation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Executable run over the filled template.
    #[serde(default = "default_typeset_command")]
    pub typeset_command: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            typeset_command: default_typeset_command(),
        }
    }
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootConfig {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("assets/templates")
}

fn default_photos_dir() -> PathBuf {
    PathBuf::from("assets/photos")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("tmp/render")
}

fn default_idle_timeout_secs() -> u64 {
    1800
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_keyboard_width() -> usize {
    3
}

fn default_typeset_command() -> String {
    "xelatex".to_string()
}
