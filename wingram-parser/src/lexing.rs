//! Lexer
//!
//!     The lexer turns a preprocessed source buffer into a lazily pulled stream of
//!     (TokenKind, lexeme) pairs. It is driven one token at a time by the parser and never
//!     backtracks: the cursor only moves forward.
//!
//! Preprocessing
//!
//!     Before any scanning the whole document is buffered and flattened. Blank lines are
//!     dropped, carriage returns are dropped, and the remaining lines are joined with a
//!     single space. Line breaks therefore carry no grammatical meaning beyond separating
//!     tokens. See [preprocess].
//!
//! Scanning
//!
//!     1. Raw scanning with logos. See [base_tokenization]. Runs are maximal: a run of
//!        letters is consumed completely before it is looked up, so `Windowx` is one run
//!        and not `Window` followed by `x`.
//!
//!     2. Resolution. Letter and digit runs go through [TokenKind::from_lexeme]; quoted
//!        strings become [TokenKind::String] with the quotes stripped; punctuation maps
//!        directly. Scan errors and unterminated strings become [TokenKind::None] with the
//!        offending text as lexeme.
//!
//!     The lexer itself never fails on malformed input. It reports problems only through
//!     [TokenKind::None] and leaves the classification to the parser.

pub mod base_tokenization;

use crate::token::TokenKind;
use base_tokenization::RawToken;
use logos::Logos;

/// Flatten a raw document into the single-line buffer the lexer scans.
pub fn preprocess(raw: &str) -> String {
    raw.lines()
        .map(|line| line.replace('\r', ""))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull-based lexer over one preprocessed document.
pub struct Lexer<'src> {
    raw: logos::Lexer<'src, RawToken>,
    current: TokenKind,
    previous: TokenKind,
    lexeme: &'src str,
}

impl<'src> Lexer<'src> {
    /// Create a lexer over an already preprocessed buffer.
    pub fn new(source: &'src str) -> Self {
        Lexer {
            raw: RawToken::lexer(source),
            current: TokenKind::None,
            previous: TokenKind::None,
            lexeme: "",
        }
    }

    /// Advance to the next token and return its kind.
    ///
    /// Once the buffer is exhausted every further call yields [`TokenKind::EndOfInput`]
    /// with an empty lexeme.
    pub fn next_token(&mut self) -> TokenKind {
        self.previous = self.current;

        let (kind, lexeme) = match self.raw.next() {
            None => (TokenKind::EndOfInput, ""),
            Some(Err(())) => (TokenKind::None, self.raw.slice()),
            Some(Ok(raw)) => Self::resolve(raw, self.raw.slice()),
        };

        self.current = kind;
        self.lexeme = lexeme;
        kind
    }

    fn resolve(raw: RawToken, slice: &'src str) -> (TokenKind, &'src str) {
        if let Some(kind) = raw.punctuation() {
            return (kind, slice);
        }
        match raw {
            RawToken::Word | RawToken::Digits => (TokenKind::from_lexeme(slice), slice),
            RawToken::Quoted => (TokenKind::String, &slice[1..slice.len() - 1]),
            RawToken::Unterminated => (TokenKind::None, &slice[1..]),
            _ => (TokenKind::None, slice),
        }
    }

    /// The lexeme that produced the current token.
    pub fn lexeme(&self) -> &'src str {
        self.lexeme
    }

    pub fn current(&self) -> TokenKind {
        self.current
    }

    pub fn previous(&self) -> TokenKind {
        self.previous
    }

    /// Byte offset of the cursor in the preprocessed buffer.
    pub fn offset(&self) -> usize {
        self.raw.span().end
    }
}

/// Collect every token of a preprocessed buffer, stopping before end of input.
pub fn tokenize(source: &str) -> Vec<(TokenKind, String)> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let kind = lexer.next_token();
        if kind == TokenKind::EndOfInput {
            break;
        }
        tokens.push((kind, lexer.lexeme().to_string()));
    }

    tokens
}
