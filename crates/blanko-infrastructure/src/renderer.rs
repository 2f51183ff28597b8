//! Template renderer backed by MiniJinja and an external typesetter.
//!
//! A render fills `<document>.tex` from the templates directory with the
//! collected field values, writes the result into the work directory, and
//! runs the configured typesetter over it. Work files (`.tex`, `.aux`,
//! `.idx`, `.log`) are removed on success and failure alike; only the
//! produced document leaves this module, wrapped in a guard that deletes it
//! after delivery.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use minijinja::Environment;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use blanko_core::error::{BlankoError, Result};
use blanko_core::ids::ConversationId;
use blanko_core::render::{RenderedDocument, TemplateRenderer};

pub struct TypesetRenderer {
    env: Environment<'static>,
    work_dir: PathBuf,
    typeset_command: String,
}

impl TypesetRenderer {
    pub fn new(templates_dir: PathBuf, work_dir: PathBuf, typeset_command: String) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(templates_dir));
        Self {
            env,
            work_dir,
            typeset_command,
        }
    }

    fn fill_template(
        &self,
        document: &str,
        conversation: ConversationId,
        fields: &HashMap<String, String>,
    ) -> Result<String> {
        let name = format!("{document}.tex");
        let template = self
            .env
            .get_template(&name)
            .map_err(|err| BlankoError::render(format!("template '{name}' unavailable: {err}")))?;

        // Templates address values as `user_data.<field>`; the conversation
        // id rides along as `user_data.id`.
        let mut user_data: HashMap<&str, String> = fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect();
        user_data.insert("id", conversation.to_string());

        template
            .render(minijinja::context! { user_data })
            .map_err(|err| BlankoError::render(format!("filling '{name}' failed: {err}")))
    }
}

#[async_trait]
impl TemplateRenderer for TypesetRenderer {
    async fn render(
        &self,
        document: &str,
        conversation: ConversationId,
        fields: &HashMap<String, String>,
    ) -> Result<RenderedDocument> {
        let filled = self.fill_template(document, conversation, fields)?;

        tokio::fs::create_dir_all(&self.work_dir).await?;

        // The request id keeps concurrent renders apart even when different
        // conversations pick the same output filename.
        let stem = format!("form_{}_{}", conversation, Uuid::new_v4().simple());
        let work_files = WorkFiles {
            base: self.work_dir.join(&stem),
        };
        let tex_path = work_files.base.with_extension("tex");
        tokio::fs::write(&tex_path, filled).await?;

        debug!(%conversation, document, command = %self.typeset_command, "typesetting");
        let output = Command::new(&self.typeset_command)
            .arg(format!("-output-directory={}", self.work_dir.display()))
            .arg("-interaction=nonstopmode")
            .arg(&tex_path)
            .output()
            .await
            .map_err(|err| {
                BlankoError::render(format!(
                    "failed to run '{}': {err}",
                    self.typeset_command
                ))
            })?;

        if !output.status.success() {
            return Err(BlankoError::render(format!(
                "'{}' exited with {} for '{document}'",
                self.typeset_command, output.status
            )));
        }

        let artifact = work_files.base.with_extension("pdf");
        if !artifact.is_file() {
            return Err(BlankoError::render(format!(
                "'{}' produced no output for '{document}'",
                self.typeset_command
            )));
        }
        Ok(RenderedDocument::new(artifact))
    }
}

/// Removes the intermediate typesetter files when dropped, whichever way
/// the render ended.
struct WorkFiles {
    base: PathBuf,
}

impl Drop for WorkFiles {
    fn drop(&mut self) {
        for ext in ["tex", "aux", "idx", "log"] {
            let path = self.base.with_extension(ext);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), %err, "failed to remove work file"),
            }
        }
    }
}
