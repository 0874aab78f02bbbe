//! Host bridge: the editor/UI runtime the core talks to.
//!
//! The core never reaches into an editor directly. It asks the host for the
//! active document, the workspace root and the settings, and hands it
//! resolved [`NavigationTarget`]s to open. The terminal front end uses
//! [`workspace::WorkspaceHost`]; tests use an in-memory double.

pub mod workspace;

use std::path::PathBuf;

use async_trait::async_trait;
use lsp_types::{Position, Range};

use crate::config::Settings;
use crate::error::ConfigError;
use crate::navigation::NavigationTarget;

pub use crate::error::HostError;
pub use workspace::WorkspaceHost;

/// Selection state of the active editor, in 0-based document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSelection {
    /// Selected range; empty when start equals end.
    pub range: Range,
    /// Cursor position.
    pub active: Position,
}

impl EditorSelection {
    /// A collapsed selection (plain cursor) at the given 0-based line.
    pub fn cursor(line: u32) -> Self {
        let position = Position { line, character: 0 };
        Self {
            range: Range {
                start: position,
                end: position,
            },
            active: position,
        }
    }

    /// A selection covering whole 0-based lines `start..=end`.
    pub fn lines(start: u32, end: u32) -> Self {
        let range = Range {
            start: Position {
                line: start,
                character: 0,
            },
            end: Position {
                line: end,
                character: 1,
            },
        };
        Self {
            range,
            active: range.end,
        }
    }

    /// Returns `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.range.start == self.range.end
    }
}

/// Snapshot of the active document taken at send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContext {
    /// Path of the document relative to the workspace root.
    pub relative_path: String,
    /// Selection, when the host can report one.
    pub selection: Option<EditorSelection>,
}

/// The narrow interface the core consumes from its host.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// The active document and its selection, if any document is active.
    fn active_document_context(&self) -> Option<EditorContext>;

    /// The first workspace root, if a workspace is open.
    fn workspace_root(&self) -> Option<PathBuf>;

    /// Reads the option bag for `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings source cannot be read.
    fn configuration(&self, namespace: &str) -> Result<Settings, ConfigError>;

    /// Opens the target document, selects its span and centers it.
    async fn open_and_select(&self, target: &NavigationTarget) -> Result<(), HostError>;

    /// Shows a transient error notification.
    fn show_error(&self, message: &str);
}
