//! Conversation session.
//!
//! - `transcript`: conversation turns and the append-only transcript
//! - `channel`: the typed panel ⇄ session message channel
//! - `chat`: the session object tying host, client and transcript together

pub mod channel;
pub mod chat;
pub mod transcript;

pub use channel::{EventSink, PanelEndpoint, PanelEvent, PanelRequest, SessionEndpoint, channel};
pub use chat::ChatSession;
pub use transcript::{ConversationTurn, Role, Transcript};
