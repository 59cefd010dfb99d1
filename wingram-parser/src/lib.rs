//! # wingram-parser
//!
//! Validation of window layout documents: a `Window` with a layout manager and a tree of
//! widgets. A document is either accepted or rejected at its first deviation from the
//! grammar, and every run writes a human-readable trace of the productions it entered and
//! the tokens it consumed.
//!
//! File Layout
//!
//!     token     the terminal vocabulary and the lexeme lookup table
//!     lexing    preprocessing and the pull-based lexer (raw scanning in lexing::base_tokenization)
//!     parsing   the recursive-descent matcher, verdicts
//!     trace     the line formats written to the trace sink
//!     loader    buffering documents from files or strings, opening trace outputs
//!
//! Nothing is shared between documents: each run owns its own lexer, parser and sink, so a
//! batch can be validated in any order or in parallel.

pub mod lexing;
pub mod loader;
pub mod parsing;
pub mod token;
pub mod trace;

pub use lexing::{preprocess, tokenize, Lexer};
pub use loader::{open_sink, Document, ValidationError};
pub use parsing::{Offending, Parser, Validation, Verdict};
pub use token::{is_number, TokenKind};
pub use trace::Trace;
