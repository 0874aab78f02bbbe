//! Error types for the rag-chat client.
//!
//! This module defines all error types used throughout the application,
//! organized by subsystem: the webhook client, citation navigation, and
//! settings handling.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while sending a query to the RAG webhook.
///
/// Every variant is caught at the send boundary and turned into an
/// `error` turn in the transcript; none of them end the session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required setting is missing or unusable.
    #[error("{0}")]
    Configuration(String),

    /// DNS, connect, TLS or abort failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// The round trip exceeded the configured timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The response body is not valid JSON, or not shaped like a RAG response.
    #[error("failed to parse response: {0}")]
    MalformedResponse(String),

    /// Well-formed response carrying a non-200 `code`.
    #[error("{message}{}", .hint.as_ref().map(|h| format!("\n\n{h}")).unwrap_or_default())]
    Application {
        /// The `code` field from the response; 0 when it is not a number.
        code: i64,
        /// The `message` field, or a generic fallback.
        message: String,
        /// Optional remediation text from the server.
        hint: Option<String>,
    },
}

impl ClientError {
    /// The error raised when no webhook URL is configured.
    pub fn missing_webhook_url() -> Self {
        Self::Configuration(
            "webhook URL is not configured; set ragChat.webhookUrl in settings".to_string(),
        )
    }
}

/// Errors related to opening a cited file.
///
/// These are reported as transient notifications, never as transcript turns.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The `lines` field has no numeric start line.
    #[error("invalid line reference '{0}'")]
    InvalidLines(String),

    /// No workspace root is known to the host.
    #[error("no workspace folder is open")]
    NoWorkspace,

    /// The host could not open the document.
    #[error("failed to open file: {0}")]
    OpenFailed(String),
}

/// Failure reported by the host while opening a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

/// A preview selection that starts after the last line of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("line {line} is past the end of the file ({total} lines)")]
pub struct LineOutOfRange {
    /// Requested 1-based start line.
    pub line: usize,
    /// Number of lines in the file.
    pub total: usize,
}

/// Errors related to loading or writing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read or written.
    #[error("settings file {path}: {source}")]
    Io {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON or has mistyped options.
    #[error("invalid settings in {path}: {source}")]
    Invalid {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying parse or type error.
        #[source]
        source: serde_json::Error,
    },

    /// `init` found an existing settings file.
    #[error("{0} already exists; remove it first to reinitialize")]
    AlreadyInitialized(PathBuf),
}

/// A unified error type for the entire application.
#[derive(Debug, Error)]
pub enum Error {
    /// Webhook client error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Citation navigation error.
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Settings error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for rag-chat operations.
pub type Result<T> = std::result::Result<T, Error>;
