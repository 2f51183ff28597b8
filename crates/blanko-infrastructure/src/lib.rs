//! Infrastructure layer: filesystem-facing implementations behind the core
//! trait seams.
//!
//! - `renderer`: MiniJinja template filling plus external typesetting
//! - `loader`: one-shot startup loading of config, catalog, and lexicon
//! - `paths`: default configuration locations

pub mod loader;
pub mod paths;
pub mod renderer;

pub use loader::{load_catalog, load_config, load_lexicon, BOT_TOKEN_ENV};
pub use paths::BlankoPaths;
pub use renderer::TypesetRenderer;
