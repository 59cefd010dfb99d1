//! Token vocabulary shared by the lexer, the parser and the trace.
//!
//! Every terminal of the window grammar is a [`TokenKind`]. Kinds carry no payload: the
//! text that produced a token travels next to it as its lexeme. Two sentinel kinds exist,
//! [`TokenKind::None`] for text the lexer could not classify and [`TokenKind::EndOfInput`]
//! once the source is exhausted.
//!
//! The ordinal of each kind is part of the trace format, so the discriminants are fixed.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// All terminal symbols of the window grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum TokenKind {
    Window = 0,
    String = 1,
    Layout = 2,
    OpenParen = 3,
    CloseParen = 4,
    Colon = 5,
    Semicolon = 6,
    Flow = 7,
    Border = 8,
    Grid = 9,
    Left = 10,
    Right = 11,
    Center = 12,
    Button = 13,
    Group = 14,
    Label = 15,
    Panel = 16,
    Textfield = 17,
    Radio = 18,
    End = 19,
    Period = 20,
    /// Nothing matched: the lexical error signal.
    None = 21,
    // 22 was an end-of-line marker, never produced since lines are joined up front.
    EndOfInput = 23,
    Number = 24,
    Comma = 25,
}

/// Keywords and punctuation with a fixed spelling.
static FIXED_SPELLINGS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    [
        Window, Layout, Flow, Border, Grid, Left, Right, Center, Button, Group, Label, Panel,
        Textfield, Radio, End, OpenParen, CloseParen, Colon, Semicolon, Comma, Period,
    ]
    .into_iter()
    .filter_map(|kind| kind.spelling().map(|text| (text, kind)))
    .collect()
});

impl TokenKind {
    /// Resolve a complete lexeme against the lookup table.
    ///
    /// Keywords and punctuation match by exact spelling. Anything else is accepted as a
    /// [`TokenKind::Number`] only when [`is_number`] holds, otherwise it is
    /// [`TokenKind::None`].
    pub fn from_lexeme(lexeme: &str) -> TokenKind {
        if let Some(kind) = FIXED_SPELLINGS.get(lexeme) {
            return *kind;
        }
        if is_number(lexeme) {
            TokenKind::Number
        } else {
            TokenKind::None
        }
    }

    /// The tag written to the trace for this kind.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Canonical text for keywords and punctuation, `None` for literal classes and sentinels.
    pub fn spelling(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            Window => "Window",
            Layout => "Layout",
            Flow => "Flow",
            Border => "Border",
            Grid => "Grid",
            Left => "Left",
            Right => "Right",
            Center => "Center",
            Button => "Button",
            Group => "Group",
            Label => "Label",
            Panel => "Panel",
            Textfield => "Textfield",
            Radio => "Radio",
            End => "End",
            OpenParen => "(",
            CloseParen => ")",
            Colon => ":",
            Semicolon => ";",
            Comma => ",",
            Period => ".",
            String | Number | None | EndOfInput => return Option::None,
        };
        Some(text)
    }

    /// Whether a `widget` production can begin with this kind.
    pub fn starts_widget(self) -> bool {
        matches!(
            self,
            TokenKind::Button
                | TokenKind::Group
                | TokenKind::Label
                | TokenKind::Panel
                | TokenKind::Textfield
        )
    }

    pub fn is_alignment(self) -> bool {
        matches!(self, TokenKind::Left | TokenKind::Right | TokenKind::Center)
    }

    pub fn is_layout_type(self) -> bool {
        matches!(self, TokenKind::Flow | TokenKind::Border | TokenKind::Grid)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spelling() {
            Some(text) => write!(f, "'{}'", text),
            None => match self {
                TokenKind::String => write!(f, "STRING"),
                TokenKind::Number => write!(f, "NUMBER"),
                TokenKind::EndOfInput => write!(f, "end of input"),
                _ => write!(f, "unrecognized text"),
            },
        }
    }
}

/// A signed decimal integer that survives a round trip through `i32` unchanged.
///
/// This rejects leading zeros, explicit plus signs, `-0`, embedded non-digits, the empty
/// string and anything out of range.
pub fn is_number(text: &str) -> bool {
    text.parse::<i32>()
        .map(|value| value.to_string() == text)
        .unwrap_or(false)
}
