//! Citation navigation.
//!
//! This module turns `(file, lines)` pairs, whether they come from the
//! structured `sources` of a response or from references inside the answer
//! text, into concrete editor navigation.
//!
//! - `citation`: line-span parsing and resolution to a [`NavigationTarget`]
//! - `inline`: detection of `path:N` and `path:N-M` references in text

pub mod citation;
pub mod inline;

pub use citation::{END_OF_LINE, LineSpan, NavigationTarget, Reveal, navigate, resolve};
pub use inline::{InlineReference, find_references};
