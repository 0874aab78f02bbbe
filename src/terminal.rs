//! Plain-text panel for the terminal front end.
//!
//! [`Terminal`] plays the role of the chat panel: it renders
//! [`PanelEvent`]s as text and turns input lines into [`PanelRequest`]s.
//! While a request is outstanding new questions are refused.

use std::fmt::Write as _;

use crate::navigation::find_references;
use crate::rag::SourceCitation;
use crate::session::{ConversationTurn, PanelEvent, PanelRequest, Role, Transcript};

/// Help shown for `:help`.
pub const HELP: &str = "\
Type a question and press enter to ask it.
  :open N           open source N of the latest answer
  :open path:lines  open any file reference, e.g. :open src/main.rs:10-20
  :refs             list file references mentioned in the latest answer
  :ref N            open reference N from :refs
  :history          show the whole conversation
  :quit             leave";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask a question.
    Send(String),
    /// Open the N-th (1-based) source of the latest answer.
    OpenSource(usize),
    /// Open the N-th (1-based) inline reference of the latest answer.
    OpenReference(usize),
    /// Open an explicit `file:lines` reference.
    OpenPath {
        /// Workspace-relative path.
        file: String,
        /// `"N"` or `"N-M"`.
        lines: String,
    },
    /// List inline references.
    Refs,
    /// Show the conversation.
    History,
    /// Show help.
    Help,
    /// Leave.
    Quit,
    /// Blank line.
    Nothing,
}

/// Parses one input line.
///
/// # Errors
///
/// Returns a usage message for unknown or malformed commands.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Command::Nothing);
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return Ok(Command::Send(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "history" => Ok(Command::History),
        "help" | "h" => Ok(Command::Help),
        "refs" => Ok(Command::Refs),
        "ref" => parse_index(arg).map(Command::OpenReference),
        "open" => {
            if let Ok(index) = parse_index(arg) {
                return Ok(Command::OpenSource(index));
            }
            match arg.rsplit_once(':') {
                Some((file, lines)) if !file.is_empty() && !lines.is_empty() => {
                    Ok(Command::OpenPath {
                        file: file.to_string(),
                        lines: lines.to_string(),
                    })
                }
                _ => Err("usage: :open N | :open path:lines".to_string()),
            }
        }
        other => Err(format!("unknown command ':{other}'; try :help")),
    }
}

fn parse_index(arg: &str) -> Result<usize, String> {
    arg.parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| format!("expected a number starting at 1, got '{arg}'"))
}

/// Renders the sources block of an assistant turn.
pub fn render_sources(sources: &[SourceCitation]) -> String {
    let mut out = format!("Sources ({}):\n", sources.len());
    for (index, source) in sources.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {}\n      Lines: {} | Score: {:.3}  {}",
            index + 1,
            source.file,
            source.lines,
            source.score,
            source.reference()
        );
    }
    out
}

/// Renders one turn.
pub fn render_turn(turn: &ConversationTurn) -> String {
    match turn.role() {
        Role::User => format!("you> {}", turn.content()),
        Role::Error => turn.content().to_string(),
        Role::Assistant if turn.sources().is_empty() => turn.content().to_string(),
        Role::Assistant => format!("{}\n\n{}", turn.content(), render_sources(turn.sources())),
    }
}

/// What the front end should do with an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Forward to the session.
    Request(PanelRequest),
    /// Print locally.
    Print(String),
    /// A question was typed while another one is outstanding.
    Busy,
    /// End the session.
    Quit,
    /// Nothing to do.
    Nothing,
}

/// Terminal panel state.
#[derive(Debug, Default)]
pub struct Terminal {
    loading: bool,
    turns: Transcript,
}

impl Terminal {
    /// Creates an empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` between `showLoading` and `hideLoading`.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Applies an event and returns the text to print, if any.
    pub fn apply(&mut self, event: PanelEvent) -> Option<String> {
        match event {
            PanelEvent::AddMessage { message } => {
                // The user's own line is already on screen.
                let text = (message.role() != Role::User).then(|| render_turn(&message));
                self.turns.append(message);
                text
            }
            PanelEvent::ShowLoading => {
                self.loading = true;
                Some("… thinking".to_string())
            }
            PanelEvent::HideLoading => {
                self.loading = false;
                None
            }
            PanelEvent::LoadHistory { messages } => {
                self.turns = messages.into_iter().collect();
                Some(self.render_history())
            }
        }
    }

    /// Interprets an input line.
    pub fn input(&self, line: &str) -> InputAction {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(usage) => return InputAction::Print(usage),
        };

        match command {
            Command::Nothing => InputAction::Nothing,
            Command::Quit => InputAction::Quit,
            Command::Help => InputAction::Print(HELP.to_string()),
            Command::History => InputAction::Print(self.render_history()),
            Command::Send(_) if self.loading => InputAction::Busy,
            Command::Send(message) => InputAction::Request(PanelRequest::SendMessage { message }),
            Command::OpenPath { file, lines } => {
                InputAction::Request(PanelRequest::OpenFile { file, lines })
            }
            Command::OpenSource(index) => {
                let source = self
                    .turns
                    .last_assistant()
                    .and_then(|turn| turn.sources().get(index - 1));
                match source {
                    Some(source) => InputAction::Request(PanelRequest::OpenFile {
                        file: source.file.clone(),
                        lines: source.lines.clone(),
                    }),
                    None => InputAction::Print(format!("no source {index} in the latest answer")),
                }
            }
            Command::Refs => InputAction::Print(self.render_references()),
            Command::OpenReference(index) => {
                let reference = self
                    .turns
                    .last_assistant()
                    .map(|turn| find_references(turn.content()))
                    .and_then(|refs| refs.into_iter().nth(index - 1));
                match reference {
                    Some(r) => InputAction::Request(PanelRequest::OpenFile {
                        file: r.file,
                        lines: r.lines,
                    }),
                    None => {
                        InputAction::Print(format!("no reference {index} in the latest answer"))
                    }
                }
            }
        }
    }

    fn render_history(&self) -> String {
        if self.turns.is_empty() {
            return "(no messages yet)".to_string();
        }
        self.turns
            .iter()
            .map(render_turn)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_references(&self) -> String {
        let refs = self
            .turns
            .last_assistant()
            .map(|turn| find_references(turn.content()))
            .unwrap_or_default();
        if refs.is_empty() {
            return "no file references in the latest answer".to_string();
        }
        let mut out = String::new();
        for (index, r) in refs.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}:{}", index + 1, r.file, r.lines);
        }
        out
    }
}
