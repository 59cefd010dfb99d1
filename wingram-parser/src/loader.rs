//! Document loading
//!
//! [`Document`] buffers and preprocesses one source up front, then validates it against a
//! caller-supplied trace sink. A document can be validated any number of times; every run
//! builds a fresh lexer and parser.
//!
//! ```text
//! let doc = Document::from_path("window.gui")?;
//! let sink = open_sink("OUTPUT_window.gui")?;
//! let validation = doc.validate(sink)?;
//! ```

use crate::lexing::{preprocess, Lexer};
use crate::parsing::{Parser, Validation};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures that prevent a document from being validated at all.
///
/// These are distinct from a rejected document, which is a [`Validation`] with a
/// non-accepting verdict.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("cannot read source {}: {source}", path.display())]
    SourceUnreadable { path: PathBuf, source: io::Error },

    #[error("cannot open trace output {}: {source}", path.display())]
    SinkUnopenable { path: PathBuf, source: io::Error },

    #[error("cannot write trace: {0}")]
    SinkWrite(#[from] io::Error),
}

/// A fully buffered, preprocessed source document.
#[derive(Debug, Clone)]
pub struct Document {
    origin: Option<PathBuf>,
    source: String,
}

impl Document {
    /// Read and preprocess a file.
    ///
    /// Bytes that are not valid UTF-8 become U+FFFD: string content inside quotes, an
    /// unrecognized lexeme anywhere else.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ValidationError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = String::from_utf8_lossy(&bytes);
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded document");
        Ok(Document {
            origin: Some(path.to_path_buf()),
            source: preprocess(&raw),
        })
    }

    pub fn from_string<S: AsRef<str>>(raw: S) -> Self {
        Document {
            origin: None,
            source: preprocess(raw.as_ref()),
        }
    }

    /// The preprocessed buffer the lexer scans.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Where the document was read from, if it came from a file.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn lexer(&self) -> Lexer<'_> {
        Lexer::new(&self.source)
    }

    /// Validate the document, writing the trace to `sink`.
    pub fn validate<W: Write>(&self, sink: W) -> Result<Validation, ValidationError> {
        let validation = Parser::new(self.lexer(), sink).run()?;
        tracing::debug!(
            origin = ?self.origin,
            verdict = %validation.verdict,
            tokens = validation.tokens_consumed,
            "validated document"
        );
        Ok(validation)
    }
}

/// Create (or truncate) a trace output file.
pub fn open_sink<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>, ValidationError> {
    let path = path.as_ref();
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ValidationError::SinkUnopenable {
            path: path.to_path_buf(),
            source,
        })
}
