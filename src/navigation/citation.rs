//! Citation addressing: `file` + `lines` to an editor selection.
//!
//! A citation's `lines` field is either a single 1-based line (`"42"`) or an
//! inclusive range (`"10-20"`). Resolution converts it to the 0-based
//! [`Range`] the document model uses, with the end column pushed past the
//! end of the last line so whole lines are selected.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use lsp_types::{Position, Range, Url};
use tracing::debug;

use crate::error::NavigationError;
use crate::host::HostBridge;

/// Column used for the end of a selection; hosts clamp it to the line length.
pub const END_OF_LINE: u32 = u32::MAX;

/// A parsed `lines` field, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// First line.
    pub start: u32,
    /// Last line, when the reference is a range.
    pub end: Option<u32>,
}

impl LineSpan {
    /// Parses `"42"` or `"10-20"`.
    ///
    /// The text is split on the first `-`. A missing or non-numeric start is
    /// an error; a missing, non-numeric or backwards end is dropped and the
    /// span collapses to the start line.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::InvalidLines`] when no start line parses.
    pub fn parse(lines: &str) -> Result<Self, NavigationError> {
        let (start, end) = match lines.split_once('-') {
            Some((start, end)) => (start, Some(end)),
            None => (lines, None),
        };

        let start =
            parse_line(start).ok_or_else(|| NavigationError::InvalidLines(lines.to_string()))?;
        let end = end.and_then(parse_line).filter(|&end| end >= start);

        Ok(Self { start, end })
    }

    /// The last line covered, 1-based.
    pub fn last(&self) -> u32 {
        self.end.unwrap_or(self.start)
    }

    /// The 0-based selection covering every line of the span.
    pub fn to_range(&self) -> Range {
        Range {
            start: Position {
                line: self.start - 1,
                character: 0,
            },
            end: Position {
                line: self.last() - 1,
                character: END_OF_LINE,
            },
        }
    }
}

fn parse_line(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|&n| n > 0)
}

impl FromStr for LineSpan {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

/// How the host should scroll the selection into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reveal {
    /// Center the selection in the viewport.
    #[default]
    Center,
}

/// A concrete navigation request for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    /// Absolute path of the document.
    pub path: PathBuf,
    /// 0-based selection.
    pub selection: Range,
    /// Scroll behavior.
    pub reveal: Reveal,
}

impl NavigationTarget {
    /// First selected line, 0-based.
    pub fn start_line(&self) -> u32 {
        self.selection.start.line
    }

    /// Last selected line, 0-based.
    pub fn end_line(&self) -> u32 {
        self.selection.end.line
    }

    /// The `file://` URI of the document.
    pub fn uri(&self) -> Option<Url> {
        Url::from_file_path(&self.path).ok()
    }
}

/// Resolves a citation against the first workspace root.
///
/// # Errors
///
/// Returns [`NavigationError::InvalidLines`] for an unparseable `lines`
/// field and [`NavigationError::NoWorkspace`] when no root is known.
pub fn resolve(
    workspace_root: Option<&Path>,
    file: &str,
    lines: &str,
) -> Result<NavigationTarget, NavigationError> {
    let span = LineSpan::parse(lines)?;
    let root = workspace_root.ok_or(NavigationError::NoWorkspace)?;

    Ok(NavigationTarget {
        path: root.join(file.trim_start_matches('/')),
        selection: span.to_range(),
        reveal: Reveal::Center,
    })
}

/// Resolves a citation and asks the host to open and select it.
///
/// # Errors
///
/// Returns the resolution error, or [`NavigationError::OpenFailed`] with the
/// host's message when the document cannot be opened.
pub async fn navigate<H>(
    host: &H,
    file: &str,
    lines: &str,
) -> Result<NavigationTarget, NavigationError>
where
    H: HostBridge + ?Sized,
{
    let root = host.workspace_root();
    let target = resolve(root.as_deref(), file, lines)?;

    debug!(
        path = %target.path.display(),
        start = target.start_line(),
        end = target.end_line(),
        "opening citation"
    );

    host.open_and_select(&target)
        .await
        .map_err(|e| NavigationError::OpenFailed(e.to_string()))?;

    Ok(target)
}
