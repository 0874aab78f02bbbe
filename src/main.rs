//! RAG Chat - Entry Point
//!
//! Sets up logging, parses arguments, and runs the chat session against a
//! terminal panel.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rag_chat::config::{self, SETTINGS_FILE, SettingsOverrides};
use rag_chat::host::{EditorContext, EditorSelection, HostBridge, WorkspaceHost};
use rag_chat::navigation::LineSpan;
use rag_chat::session::{ChatSession, channel};
use rag_chat::terminal::{InputAction, Terminal};

/// Chat with a RAG webhook about the code in a workspace.
#[derive(Parser, Debug)]
#[command(name = "rag-chat")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Workspace root directory citations are resolved against.
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Run as if no workspace were open.
    #[arg(long)]
    no_workspace: bool,

    /// Settings file; defaults to .rag-chat.json in the workspace.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Webhook URL, overriding the settings file.
    #[arg(long)]
    webhook_url: Option<String>,

    /// Collection name, overriding the settings file.
    #[arg(short, long)]
    collection: Option<String>,

    /// Request timeout in milliseconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Accept invalid TLS certificates.
    #[arg(long)]
    insecure: bool,

    /// Never send editor context.
    #[arg(long)]
    no_context: bool,

    /// File to report as the active document, relative to the workspace.
    #[arg(short, long)]
    file: Option<String>,

    /// Cursor line (1-based) in the active document.
    #[arg(short, long, requires = "file", conflicts_with = "selection")]
    line: Option<u32>,

    /// Selected lines in the active document, e.g. 5-10.
    #[arg(long, requires = "file")]
    selection: Option<String>,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default settings file into the current directory.
    Init,
}

impl Args {
    /// Parses the log level string into a tracing Level.
    fn parse_log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            other => anyhow::bail!("invalid log level: {}", other),
        }
    }

    /// The editor context reported to the session, built from `--file`.
    fn active_document(&self) -> Result<Option<EditorContext>> {
        let Some(file) = &self.file else {
            return Ok(None);
        };

        let selection = if let Some(line) = self.line {
            let line = line.checked_sub(1).context("--line starts at 1")?;
            Some(EditorSelection::cursor(line))
        } else if let Some(lines) = &self.selection {
            let span = LineSpan::parse(lines).context("invalid --selection")?;
            Some(EditorSelection::lines(span.start - 1, span.last() - 1))
        } else {
            None
        };

        Ok(Some(EditorContext {
            relative_path: file.clone(),
            selection,
        }))
    }

    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            webhook_url: self.webhook_url.clone(),
            collection: self.collection.clone(),
            timeout: self.timeout,
            insecure: self.insecure,
            no_context: self.no_context,
        }
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(level: Level) -> Result<()> {
    // Create an env filter that respects RUST_LOG but has a default level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rag_chat={level},reqwest={level}")));

    // Logs go to stderr so they do not interleave with answers on stdout
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    Ok(())
}

fn build_host(args: &Args) -> Result<WorkspaceHost> {
    let workspace = args.workspace.canonicalize().context(format!(
        "failed to canonicalize workspace path: {}",
        args.workspace.display()
    ))?;
    let settings_file = args
        .settings
        .clone()
        .unwrap_or_else(|| workspace.join(SETTINGS_FILE));

    let root = (!args.no_workspace).then_some(workspace);
    let mut host = WorkspaceHost::new(root)
        .settings_file(settings_file)
        .overrides(args.overrides());
    if let Some(active) = args.active_document()? {
        host = host.active_document(active);
    }
    Ok(host)
}

/// Main entry point.
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing
    let log_level = args.parse_log_level()?;
    init_tracing(log_level)?;

    if let Some(Command::Init) = args.command {
        let path = config::init().context("failed to write settings file")?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let host = build_host(&args)?;
    info!(workspace = ?host.workspace_root(), "starting rag-chat");

    let (mut panel, endpoint) = channel();
    let mut session = ChatSession::new(Arc::new(host));
    let session_task = tokio::spawn(async move {
        session.serve(endpoint).await;
    });

    println!("Ask a question about your code (:help for commands).");

    let mut terminal = Terminal::new();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                match terminal.input(&line) {
                    InputAction::Request(request) => {
                        if panel.requests.send(request).is_err() {
                            break;
                        }
                    }
                    InputAction::Print(text) => println!("{text}"),
                    InputAction::Busy => println!("still waiting for the previous answer"),
                    InputAction::Quit => {
                        quit = true;
                        break;
                    }
                    InputAction::Nothing => {}
                }
            }
            event = panel.events.recv() => {
                let Some(event) = event else { break };
                if let Some(text) = terminal.apply(event) {
                    println!("{text}");
                }
            }
        }
    }

    drop(panel.requests);
    if quit {
        session_task.abort();
    } else {
        // Input ended; let an outstanding answer arrive before exiting
        while let Some(event) = panel.events.recv().await {
            if let Some(text) = terminal.apply(event) {
                println!("{text}");
            }
        }
    }

    if let Err(err) = session_task.await
        && !err.is_cancelled()
    {
        return Err(err).context("chat session panicked");
    }
    debug!("chat session finished");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["rag-chat"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_args_parse_log_level() {
        let args = args(&["--log-level", "debug"]);
        assert_eq!(args.parse_log_level().unwrap(), Level::DEBUG);
        assert!(self::args(&["--log-level", "loud"]).parse_log_level().is_err());
    }

    #[test]
    fn test_active_document_from_selection() {
        let context = args(&["--file", "src/lib.rs", "--selection", "5-10"])
            .active_document()
            .unwrap()
            .unwrap();
        assert_eq!(context.relative_path, "src/lib.rs");
        assert_eq!(context.selection, Some(EditorSelection::lines(4, 9)));
    }

    #[test]
    fn test_active_document_from_cursor_line() {
        let context = args(&["--file", "a.py", "--line", "3"])
            .active_document()
            .unwrap()
            .unwrap();
        assert_eq!(context.selection, Some(EditorSelection::cursor(2)));
        assert!(args(&["--file", "a.py", "--line", "0"]).active_document().is_err());
        assert!(args(&[]).active_document().unwrap().is_none());
    }

    #[test]
    fn test_overrides_follow_flags() {
        let overrides = args(&["--insecure", "--collection", "docs"]).overrides();
        assert!(overrides.insecure);
        assert_eq!(overrides.collection.as_deref(), Some("docs"));
        assert!(overrides.webhook_url.is_none());
    }
}
