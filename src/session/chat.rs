//! The chat session: send pipeline and citation navigation.
//!
//! A [`ChatSession`] is owned by whatever creates the panel. It outlives any
//! single panel attachment: when a panel is attached again it receives the
//! whole transcript through a `loadHistory` event.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::NAMESPACE;
use crate::error::{ClientError, NavigationError};
use crate::host::HostBridge;
use crate::navigation::{self, NavigationTarget};
use crate::rag::{NormalizedResponse, Query, RagClient, RequestBuilder};

use super::channel::{EventSink, PanelEvent, PanelRequest, SessionEndpoint};
use super::transcript::{ConversationTurn, Transcript};

/// Emits `showLoading` on creation and `hideLoading` when dropped.
///
/// Dropping covers every way a send can settle, including the send future
/// itself being cancelled.
struct LoadingGuard {
    sink: Option<EventSink>,
}

impl LoadingGuard {
    fn show(sink: Option<EventSink>) -> Self {
        if let Some(sink) = &sink {
            sink.emit(PanelEvent::ShowLoading);
        }
        Self { sink }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(sink) = &self.sink {
            sink.emit(PanelEvent::HideLoading);
        }
    }
}

/// One conversation with the RAG webhook.
pub struct ChatSession<H: HostBridge> {
    host: Arc<H>,
    transcript: Transcript,
    panel: Option<EventSink>,
    client: Option<RagClient>,
}

impl<H: HostBridge> ChatSession<H> {
    /// Creates a session with an empty transcript and no panel attached.
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            transcript: Transcript::new(),
            panel: None,
            client: None,
        }
    }

    /// The host bridge.
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// The transcript so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Attaches a panel, replaying the transcript when it is not empty.
    pub fn attach(&mut self, sink: EventSink) {
        if !self.transcript.is_empty() {
            sink.emit(PanelEvent::LoadHistory {
                messages: self.transcript.snapshot(),
            });
        }
        self.panel = Some(sink);
    }

    /// Detaches the current panel; later events are not delivered.
    pub fn detach(&mut self) {
        self.panel = None;
    }

    /// Serves one panel until it closes its request channel.
    ///
    /// Requests are handled one at a time in arrival order, so a second
    /// `sendMessage` waits for the first to settle.
    pub async fn serve(&mut self, endpoint: SessionEndpoint) {
        let SessionEndpoint {
            mut requests,
            events,
        } = endpoint;
        self.attach(events);

        while let Some(request) = requests.recv().await {
            self.handle(request).await;
        }

        debug!(turns = self.transcript.len(), "panel closed");
        self.detach();
    }

    /// Dispatches one panel request.
    pub async fn handle(&mut self, request: PanelRequest) {
        match request {
            PanelRequest::SendMessage { message } => {
                self.send_message(&message).await;
            }
            PanelRequest::OpenFile { file, lines } => {
                let _ = self.open_file(&file, &lines).await;
            }
        }
    }

    /// Sends one message and records the outcome.
    ///
    /// Blank input is ignored: no turn is appended and no request is made.
    /// Otherwise exactly one user turn and then exactly one assistant or
    /// error turn are appended, and the reply turn is returned.
    pub async fn send_message(&mut self, text: &str) -> Option<ConversationTurn> {
        let query = Query::new(text)?;

        self.record(ConversationTurn::user(query.as_str()));
        let _loading = LoadingGuard::show(self.panel.clone());

        let reply = match self.ask(&query).await {
            Ok(response) => ConversationTurn::assistant(response),
            Err(err) => {
                warn!(error = %err, "send failed");
                ConversationTurn::error(&err)
            }
        };

        self.record(reply.clone());
        Some(reply)
    }

    /// Opens a citation in the host.
    ///
    /// Failures are shown as a transient host notification and never touch
    /// the transcript.
    ///
    /// # Errors
    ///
    /// Returns the navigation error after it has been reported.
    pub async fn open_file(
        &self,
        file: &str,
        lines: &str,
    ) -> Result<NavigationTarget, NavigationError> {
        let result = navigation::navigate(self.host.as_ref(), file, lines).await;
        if let Err(err) = &result {
            warn!(file, lines, error = %err, "citation navigation failed");
            self.host.show_error(&err.to_string());
        }
        result
    }

    fn record(&mut self, turn: ConversationTurn) {
        self.transcript.append(turn.clone());
        if let Some(panel) = &self.panel {
            panel.emit(PanelEvent::AddMessage { message: turn });
        }
    }

    async fn ask(&mut self, query: &Query) -> Result<NormalizedResponse, ClientError> {
        let settings = self
            .host
            .configuration(NAMESPACE)
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        let endpoint = settings.webhook_url()?;

        let workspace_root = self.host.workspace_root();
        let editor = self.host.active_document_context();
        let params = RequestBuilder::new(&settings).build(
            query,
            editor.as_ref(),
            workspace_root.is_some(),
        )?;

        info!(
            collection = params.collection.as_deref().unwrap_or_default(),
            with_context = params.context.is_some(),
            "sending query"
        );

        let client = self.client_for(settings.validate_ssl)?;
        client.query(endpoint, &params, settings.timeout()).await
    }

    /// Reuses the cached client unless the TLS setting changed.
    fn client_for(&mut self, validate_certificates: bool) -> Result<RagClient, ClientError> {
        if let Some(client) = &self.client
            && client.validates_certificates() == validate_certificates
        {
            return Ok(client.clone());
        }
        let client = RagClient::builder()
            .validate_certificates(validate_certificates)
            .build()?;
        self.client = Some(client.clone());
        Ok(client)
    }
}
