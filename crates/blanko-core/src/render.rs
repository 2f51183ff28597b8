//! Template renderer contract.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::ids::ConversationId;

/// Produces the final artifact for a completed fill.
///
/// Implementations own their temporary files: whatever intermediate
/// artifacts a render produces must be gone when `render` returns, on the
/// failure path as much as on success. Only the returned document survives,
/// and [`RenderedDocument`] removes that one when dropped.
#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    /// Merges `fields` into the template for `document` and typesets it.
    ///
    /// Fails with [`crate::error::BlankoError::RenderFailure`] when the
    /// template is missing, the typesetter exits non-zero, or no output file
    /// appears.
    async fn render(
        &self,
        document: &str,
        conversation: ConversationId,
        fields: &HashMap<String, String>,
    ) -> Result<RenderedDocument>;
}

/// A rendered artifact on disk, deleted when this guard drops.
#[derive(Debug)]
pub struct RenderedDocument {
    path: PathBuf,
}

impl RenderedDocument {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File extension of the artifact ("pdf" for a typeset template),
    /// appended to the user-chosen filename on delivery.
    pub fn extension(&self) -> &str {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("pdf")
    }
}

impl Drop for RenderedDocument {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), %err, "failed to remove rendered artifact");
            }
        }
    }
}
