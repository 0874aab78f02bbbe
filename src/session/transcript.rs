//! Conversation turns and the append-only transcript.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::rag::{NormalizedResponse, SourceCitation};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking.
    User,
    /// A successful answer.
    Assistant,
    /// A failed send.
    Error,
}

/// One entry of the transcript.
///
/// Turns have no setters; once built they are only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sources: Vec<SourceCitation>,
}

impl ConversationTurn {
    /// A user question.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
        }
    }

    /// An answer with its citations.
    pub fn assistant(response: NormalizedResponse) -> Self {
        Self {
            role: Role::Assistant,
            content: response.answer,
            sources: response.sources,
        }
    }

    /// A failed send, rendered as `Error: <message>`.
    pub fn error(err: &ClientError) -> Self {
        Self {
            role: Role::Error,
            content: format!("Error: {err}"),
            sources: Vec::new(),
        }
    }

    /// The role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Citations; empty unless this is an assistant turn that returned some.
    pub fn sources(&self) -> &[SourceCitation] {
        &self.sources
    }
}

/// The ordered turns of one session.
///
/// Insertion order is chronological order. Nothing is ever removed,
/// replaced or reordered.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn and returns its index.
    pub fn append(&mut self, turn: ConversationTurn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    /// A copy of every turn, oldest first.
    pub fn snapshot(&self) -> Vec<ConversationTurn> {
        self.turns.clone()
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` when no turn has been appended.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Iterates over the turns, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// The most recent assistant turn.
    pub fn last_assistant(&self) -> Option<&ConversationTurn> {
        self.turns.iter().rev().find(|t| t.role == Role::Assistant)
    }
}

impl FromIterator<ConversationTurn> for Transcript {
    fn from_iter<I: IntoIterator<Item = ConversationTurn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}
