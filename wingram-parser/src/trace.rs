//! Parse trace
//!
//! The trace is the only output of a validation run besides its verdict. Lines are written
//! to the injected sink as they are produced, in the order productions and tokens are
//! visited; nothing is buffered here beyond what the sink itself buffers.

use crate::parsing::Verdict;
use crate::token::TokenKind;
use std::io::{self, Write};

/// Line-oriented writer over a trace sink.
pub struct Trace<W: Write> {
    sink: W,
    lines: usize,
}

impl<W: Write> Trace<W> {
    pub fn new(sink: W) -> Self {
        Trace { sink, lines: 0 }
    }

    pub fn enter(&mut self, production: &str) -> io::Result<()> {
        self.line(format_args!("Entering {} Production", production))
    }

    pub fn exit(&mut self, production: &str) -> io::Result<()> {
        self.line(format_args!("Exiting {} Production", production))
    }

    /// Record a token by ordinal and lexeme.
    pub fn token(&mut self, kind: TokenKind, lexeme: &str) -> io::Result<()> {
        self.line(format_args!(
            "Next Token is: {}; Next Lexeme is: {}",
            kind.ordinal(),
            lexeme
        ))
    }

    /// Banner naming the failure class. Accepted runs write nothing.
    pub fn failure(&mut self, verdict: Verdict) -> io::Result<()> {
        match verdict {
            Verdict::Accepted => Ok(()),
            Verdict::LexicalError => self.line(format_args!("******** Lexical Error!! ********")),
            Verdict::SyntaxError => self.line(format_args!("******** Syntax Error!! ********")),
        }
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(self.sink, "{}", text)?;
        self.lines += 1;
        Ok(())
    }

    /// Number of lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flush and hand the sink back.
    pub fn finish(mut self) -> io::Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}
