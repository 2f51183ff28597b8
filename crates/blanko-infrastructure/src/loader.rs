//! Startup loading of configuration, catalog, and lexicon.
//!
//! Everything is read exactly once at process start. A missing file falls
//! back to built-in defaults so a bare checkout still runs; a present but
//! unparsable file is a hard error rather than a silent default.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use blanko_core::catalog::{
    default_field_chains, default_menu_tree, CategoryEntry, DocumentEntry, FieldChainRegistry,
    MenuTree,
};
use blanko_core::config::RootConfig;
use blanko_core::error::Result;
use blanko_core::lexicon::{default_lexicon, Lexicon};

use crate::paths::BlankoPaths;

/// Environment variable overriding the configured bot token.
pub const BOT_TOKEN_ENV: &str = "BLANKO_BOT_TOKEN";

/// On-disk catalog shape: repeated `[[category]]` and `[[document]]`
/// tables.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(rename = "category", default)]
    categories: Vec<CategoryEntry>,
    #[serde(rename = "document", default)]
    documents: Vec<DocumentEntry>,
}

/// On-disk lexicon shape: one `[entries]` table of key → string.
#[derive(Debug, Default, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    entries: HashMap<String, String>,
}

/// Loads the root configuration.
///
/// `explicit` wins over the default location; a missing file yields the
/// default configuration. The `BLANKO_BOT_TOKEN` environment variable, when
/// set and non-empty, overrides the configured token.
pub fn load_config(explicit: Option<&Path>) -> Result<RootConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => BlankoPaths::config_file()?,
    };

    let mut config = if path.is_file() {
        let raw = std::fs::read_to_string(&path)?;
        info!(path = %path.display(), "configuration loaded");
        toml::from_str(&raw)?
    } else {
        info!(path = %path.display(), "no configuration file, using defaults");
        RootConfig::default()
    };

    if let Ok(token) = std::env::var(BOT_TOKEN_ENV) {
        if !token.is_empty() {
            config.bot.token = token;
        }
    }
    Ok(config)
}

/// Loads the menu tree and field chains, built-in when no file is
/// configured.
pub fn load_catalog(path: Option<&Path>) -> Result<(MenuTree, FieldChainRegistry)> {
    let Some(path) = path else {
        return Ok((default_menu_tree(), default_field_chains()));
    };
    let raw = std::fs::read_to_string(path)?;
    let file: CatalogFile = toml::from_str(&raw)?;
    info!(path = %path.display(), "catalog loaded");
    Ok((
        MenuTree::new(file.categories)?,
        FieldChainRegistry::new(file.documents)?,
    ))
}

/// Loads the lexicon; a configured file extends the built-in table.
pub fn load_lexicon(path: Option<&Path>) -> Result<Lexicon> {
    let Some(path) = path else {
        return Ok(default_lexicon());
    };
    let raw = std::fs::read_to_string(path)?;
    let file: LexiconFile = toml::from_str(&raw)?;
    info!(path = %path.display(), "lexicon loaded");
    Ok(Lexicon::with_overrides(file.entries))
}
