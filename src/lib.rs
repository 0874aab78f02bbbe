//! RAG Chat
//!
//! A chat client for a retrieval-augmented generation webhook. Questions are
//! sent together with the active editor context; answers come back with
//! source citations that can be opened at the cited lines.
//!
//! # Overview
//!
//! This library provides:
//! - A webhook client that posts questions and normalizes the replies
//! - Citation parsing and navigation to `file:lines` references
//! - A chat session that owns the transcript and drives a panel
//! - A terminal front end built on the same panel protocol
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐  PanelRequest  ┌─────────────────┐
//! │      Panel      │───────────────►│   ChatSession   │
//! │   (terminal)    │◄───────────────│  (transcript)   │
//! └─────────────────┘   PanelEvent   └───┬─────────┬───┘
//!                                        │         │
//!                                 ┌──────▼───┐ ┌───▼────────┐
//!                                 │RagClient │ │ HostBridge │
//!                                 └──────┬───┘ │ (editor or │
//!                                        │     │ workspace) │
//!                                  HTTP POST   └────────────┘
//!                                        │
//!                                 ┌──────▼──────┐
//!                                 │ RAG webhook │
//!                                 └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`error`] - Error types for the entire application
//! - [`config`] - Settings and the settings file
//! - [`rag`] - Webhook request building and the HTTP client
//! - [`navigation`] - Citation parsing and file navigation
//! - [`session`] - Chat session, transcript and panel channel
//! - [`host`] - The editor boundary and its filesystem implementation
//! - [`terminal`] - Text rendering and input handling for the CLI
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rag_chat::{host::WorkspaceHost, session::ChatSession};
//!
//! #[tokio::main]
//! async fn main() {
//!     let host = WorkspaceHost::new(Some(".".into())).settings_file(".rag-chat.json");
//!     let mut session = ChatSession::new(Arc::new(host));
//!
//!     if let Some(reply) = session.send_message("Where are tokens refreshed?").await {
//!         println!("{}", reply.content());
//!     }
//! }
//! ```

// Enforce documentation and other quality attributes
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are too strict
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod host;
pub mod navigation;
pub mod rag;
pub mod session;
pub mod terminal;

// Re-export commonly used types at the crate root
pub use error::{Error, Result};
