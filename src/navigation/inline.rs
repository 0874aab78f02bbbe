//! Inline `path:line` references in free-form answer text.
//!
//! Answers often mention code as `src/auth.rs:42` or `src/auth.rs:10-20`.
//! These carry the same `(file, lines)` addressing as structured citations
//! and can be opened the same way.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\w/.-]+\.[a-zA-Z]+):(\d+)(?:-(\d+))?").expect("static pattern compiles")
});

/// A reference found in answer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineReference {
    /// Path as written in the text.
    pub file: String,
    /// `"N"` or `"N-M"`.
    pub lines: String,
    /// Byte range of the whole match in the text.
    pub span: Range<usize>,
}

/// Finds every inline reference in `text`, in order of appearance.
pub fn find_references(text: &str) -> Vec<InlineReference> {
    REFERENCE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let file = caps.get(1)?.as_str().to_string();
            let start = caps.get(2)?.as_str();
            let lines = match caps.get(3) {
                Some(end) => format!("{start}-{}", end.as_str()),
                None => start.to_string(),
            };
            Some(InlineReference {
                file,
                lines,
                span: whole.range(),
            })
        })
        .collect()
}
