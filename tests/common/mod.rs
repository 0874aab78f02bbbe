//! Common test helpers and utilities.

#![allow(dead_code)]

pub mod temp_workspace;

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use rag_chat::config::Settings;
use rag_chat::error::ConfigError;
use rag_chat::host::{EditorContext, HostBridge, HostError};
use rag_chat::navigation::NavigationTarget;
use rag_chat::session::PanelEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::MockServer;

// Re-export for convenience
pub use temp_workspace::TestWorkspace;

/// Path the mock webhook is mounted on.
pub const WEBHOOK_PATH: &str = "/webhook/rag";

/// Settings pointing at a mock webhook.
pub fn webhook_settings(server: &MockServer) -> Settings {
    Settings {
        webhook_url: format!("{}{WEBHOOK_PATH}", server.uri()),
        ..Settings::default()
    }
}

/// In-memory host that records what the session asks of it.
#[derive(Default)]
pub struct MockHost {
    settings: Mutex<Settings>,
    root: Option<PathBuf>,
    active: Option<EditorContext>,
    fail_open: bool,
    /// Targets passed to `open_and_select`.
    pub opened: Mutex<Vec<NavigationTarget>>,
    /// Messages passed to `show_error`.
    pub errors: Mutex<Vec<String>>,
}

impl MockHost {
    /// A host with the given settings and no workspace.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
            ..Self::default()
        }
    }

    /// Sets the workspace root.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Sets the active document.
    #[must_use]
    pub fn with_active(mut self, context: EditorContext) -> Self {
        self.active = Some(context);
        self
    }

    /// Makes every `open_and_select` fail.
    #[must_use]
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Replaces the settings seen by later sends.
    pub fn set_settings(&self, settings: Settings) {
        *self.settings.lock().unwrap() = settings;
    }

    /// Snapshot of recorded error notifications.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    /// Snapshot of recorded navigation targets.
    pub fn opened(&self) -> Vec<NavigationTarget> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostBridge for MockHost {
    fn active_document_context(&self) -> Option<EditorContext> {
        self.active.clone()
    }

    fn workspace_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn configuration(&self, _namespace: &str) -> Result<Settings, ConfigError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn open_and_select(&self, target: &NavigationTarget) -> Result<(), HostError> {
        if self.fail_open {
            return Err(HostError(format!("{} is unreadable", target.path.display())));
        }
        self.opened.lock().unwrap().push(target.clone());
        Ok(())
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Collects every event currently queued on a panel receiver.
pub fn drain(events: &mut UnboundedReceiver<PanelEvent>) -> Vec<PanelEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
