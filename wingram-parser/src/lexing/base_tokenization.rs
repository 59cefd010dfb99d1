//! Raw scanning with logos
//!
//! The raw scanner only splits the preprocessed source into maximal runs: punctuation,
//! letter runs, digit runs and quoted strings. It knows nothing about keywords or the
//! number rule; [`Lexer`](super::Lexer) resolves each run against the lookup table.
//!
//! Only spaces, carriage returns and line feeds are skipped. Any other ASCII character that
//! does not start one of the runs below is a scan error (tabs included); characters outside
//! ASCII are matched one at a time so the error lexeme is always a whole character.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \r\n]+")]
pub enum RawToken {
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Period,

    /// A maximal run of ASCII letters, resolved as a keyword afterwards.
    #[regex(r"[A-Za-z]+")]
    Word,

    /// A maximal run of ASCII digits, resolved by the number rule afterwards.
    #[regex(r"[0-9]+")]
    Digits,

    /// A quoted string; everything between the quotes is kept verbatim.
    #[regex(r#""[^"]*""#)]
    Quoted,

    /// An opening quote that never closes before the end of the source.
    #[regex(r#""[^"]*"#)]
    Unterminated,

    /// A single character outside ASCII, which the grammar never uses outside strings.
    #[regex(r"[^\x00-\x7F]")]
    NonAscii,
}

impl RawToken {
    /// The kind for single-character punctuation, if this is one.
    pub fn punctuation(self) -> Option<crate::token::TokenKind> {
        use crate::token::TokenKind;
        match self {
            RawToken::OpenParen => Some(TokenKind::OpenParen),
            RawToken::CloseParen => Some(TokenKind::CloseParen),
            RawToken::Colon => Some(TokenKind::Colon),
            RawToken::Semicolon => Some(TokenKind::Semicolon),
            RawToken::Comma => Some(TokenKind::Comma),
            RawToken::Period => Some(TokenKind::Period),
            RawToken::Word
            | RawToken::Digits
            | RawToken::Quoted
            | RawToken::Unterminated
            | RawToken::NonAscii => None,
        }
    }
}
