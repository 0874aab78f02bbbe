//! Typed message channel between a panel and its chat session.
//!
//! The panel sends [`PanelRequest`]s; the session answers with
//! [`PanelEvent`]s. Both are closed, internally tagged enums so they
//! serialize as `{"type": "sendMessage", ...}` for panels living across a
//! process or webview boundary.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

use super::transcript::ConversationTurn;

/// Panel → session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PanelRequest {
    /// The user submitted a question.
    SendMessage {
        /// Raw input text.
        message: String,
    },
    /// The user clicked a citation.
    OpenFile {
        /// Workspace-relative path.
        file: String,
        /// `"N"` or `"N-M"`.
        lines: String,
    },
}

/// Session → panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PanelEvent {
    /// Display one new turn.
    AddMessage {
        /// The appended turn.
        message: ConversationTurn,
    },
    /// A request is outstanding; input must be disabled.
    ShowLoading,
    /// The request settled; input may be re-enabled.
    HideLoading,
    /// Replay the whole transcript after the panel was (re)attached.
    LoadHistory {
        /// Every turn so far, oldest first.
        messages: Vec<ConversationTurn>,
    },
}

/// Sending half for panel events.
///
/// Events sent after the panel went away are dropped, as there is nobody
/// left to render them.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<PanelEvent>,
}

impl EventSink {
    /// Sends an event to the panel.
    pub fn emit(&self, event: PanelEvent) {
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event) {
            trace!(?event, "panel detached, dropping event");
        }
    }

    /// Returns `true` once the panel side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The panel's ends of a channel.
#[derive(Debug)]
pub struct PanelEndpoint {
    /// Requests to the session.
    pub requests: mpsc::UnboundedSender<PanelRequest>,
    /// Events from the session.
    pub events: mpsc::UnboundedReceiver<PanelEvent>,
}

/// The session's ends of a channel.
#[derive(Debug)]
pub struct SessionEndpoint {
    /// Requests from the panel.
    pub requests: mpsc::UnboundedReceiver<PanelRequest>,
    /// Events to the panel.
    pub events: EventSink,
}

/// Creates a connected pair of endpoints.
pub fn channel() -> (PanelEndpoint, SessionEndpoint) {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    (
        PanelEndpoint {
            requests: request_tx,
            events: event_rx,
        },
        SessionEndpoint {
            requests: request_rx,
            events: EventSink { tx: event_tx },
        },
    )
}
