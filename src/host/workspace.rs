//! Filesystem-backed host for the terminal front end.
//!
//! There is no editor pane in a terminal, so "open and select" prints the
//! selected lines with a little surrounding context instead.

use std::fmt::Write as _;
use std::path::PathBuf;

use async_trait::async_trait;
use lsp_types::Range;
use tracing::{debug, warn};

use crate::config::{Settings, SettingsOverrides};
use crate::error::{ConfigError, LineOutOfRange};
use crate::navigation::NavigationTarget;

use super::{EditorContext, HostBridge, HostError};

/// Host bridge over a workspace directory and a settings file.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceHost {
    root: Option<PathBuf>,
    settings_file: Option<PathBuf>,
    overrides: SettingsOverrides,
    active: Option<EditorContext>,
    context_lines: usize,
}

impl WorkspaceHost {
    /// Creates a host for `root`; `None` behaves like an editor with no folder open.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            context_lines: 2,
            ..Self::default()
        }
    }

    /// Reads settings from `path` on every send; a missing file means defaults.
    #[must_use]
    pub fn settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    /// Applies command-line overrides on top of the settings file.
    #[must_use]
    pub fn overrides(mut self, overrides: SettingsOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Sets the document reported as active.
    #[must_use]
    pub fn active_document(mut self, context: EditorContext) -> Self {
        self.active = Some(context);
        self
    }

    /// Number of unselected lines shown around a preview.
    #[must_use]
    pub fn context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    /// Renders the preview printed for `target`.
    ///
    /// # Errors
    ///
    /// Returns the read error, or an error when the selection starts past
    /// the end of the file.
    pub async fn preview(&self, target: &NavigationTarget) -> Result<String, HostError> {
        let content = tokio::fs::read_to_string(&target.path)
            .await
            .map_err(|e| HostError(format!("{}: {e}", target.path.display())))?;

        let body = excerpt(&content, &target.selection, self.context_lines).map_err(|e| {
            HostError(format!("{}: {e}", target.path.display()))
        })?;

        Ok(format!(
            "── {}:{}-{} ──\n{body}",
            target.path.display(),
            target.start_line() + 1,
            target.end_line() + 1
        ))
    }
}

/// Formats the selected lines with line numbers and a `>` marker.
///
/// # Errors
///
/// Returns [`LineOutOfRange`] when the selection starts past the last line.
pub fn excerpt(
    content: &str,
    selection: &Range,
    context: usize,
) -> Result<String, LineOutOfRange> {
    let lines: Vec<&str> = content.lines().collect();
    let first = selection.start.line as usize;
    if first >= lines.len() {
        return Err(LineOutOfRange {
            line: first + 1,
            total: lines.len(),
        });
    }
    let last = (selection.end.line as usize).clamp(first, lines.len() - 1);

    let start = first.saturating_sub(context);
    let end = (last + context + 1).min(lines.len());

    let mut result = String::new();
    for (idx, line_text) in lines[start..end].iter().enumerate() {
        let line_idx = start + idx;
        let marker = if (first..=last).contains(&line_idx) {
            ">"
        } else {
            " "
        };
        let _ = writeln!(result, "{marker} {:4} | {line_text}", line_idx + 1);
    }
    Ok(result)
}

#[async_trait]
impl HostBridge for WorkspaceHost {
    fn active_document_context(&self) -> Option<EditorContext> {
        self.active.clone()
    }

    fn workspace_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn configuration(&self, namespace: &str) -> Result<Settings, ConfigError> {
        let settings = match &self.settings_file {
            Some(path) => Settings::load_or_default(path, namespace)?,
            None => Settings::default(),
        };
        Ok(self.overrides.apply(settings))
    }

    async fn open_and_select(&self, target: &NavigationTarget) -> Result<(), HostError> {
        let preview = self.preview(target).await?;
        debug!(path = %target.path.display(), "showing citation preview");
        println!("{preview}");
        Ok(())
    }

    fn show_error(&self, message: &str) {
        warn!(message, "notification");
        eprintln!("error: {message}");
    }
}
