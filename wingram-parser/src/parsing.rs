//! Parser
//!
//!     A recursive-descent matcher for the window grammar. It decides whether a document
//!     belongs to the language and, if not, where it first deviates. No tree is built: the
//!     outcome is a [Validation] plus the trace written along the way.
//!
//! Grammar
//!
//!     gui          ::= Window STRING '(' NUMBER ',' NUMBER ')' layout widgets End '.'
//!     layout       ::= Layout layout_type ':'
//!     layout_type  ::= Flow '(' [align] ')'
//!                    | Border '(' [NUMBER ',' NUMBER] ')'
//!                    | Grid '(' NUMBER ',' NUMBER [',' NUMBER ',' NUMBER] ')'
//!     align        ::= Left | Right | Center
//!     widgets      ::= widget+
//!     widget       ::= Button STRING ';'
//!                    | Group radio_button+ End ';'
//!                    | Label STRING ';'
//!                    | Panel layout widgets End ';'
//!                    | Textfield NUMBER ';'
//!     radio_button ::= Radio STRING ';'
//!
//! Execution
//!
//!     One method per production. Each writes an entering/exiting pair around its body and a
//!     line for every token it consumes. The first mismatch stops all consumption and
//!     unwinds to `gui`, which classifies it: [Verdict::LexicalError] if the offending token
//!     is [TokenKind::None], [Verdict::SyntaxError] otherwise. There is no recovery.
//!
//!     Sibling repetitions (`widgets`, `radio_button+`) are loops driven by the lookahead, so
//!     stack depth only grows with `Panel` nesting. Nesting is not capped; a document nested
//!     thousands of panels deep needs a thread with a correspondingly large stack.

use crate::lexing::Lexer;
use crate::token::TokenKind;
use crate::trace::Trace;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Overall result of validating one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Accepted,
    /// The offending token was text the lexer could not classify.
    LexicalError,
    /// The offending token was well formed but not what the grammar expected.
    SyntaxError,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::LexicalError => write!(f, "lexical error"),
            Verdict::SyntaxError => write!(f, "syntax error"),
        }
    }
}

/// The token at which parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offending {
    pub kind: TokenKind,
    pub lexeme: String,
}

/// Verdict of one run together with the first point of deviation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub verdict: Verdict,
    pub offending: Option<Offending>,
    pub tokens_consumed: usize,
}

/// Why a production stopped early.
enum Halt {
    /// The current token is not what the production expected.
    Mismatch,
    /// The trace sink failed.
    Io(io::Error),
}

impl From<io::Error> for Halt {
    fn from(err: io::Error) -> Self {
        Halt::Io(err)
    }
}

type Step = Result<(), Halt>;

/// Drives one lexer over the grammar, writing the trace to `W`.
pub struct Parser<'src, W: Write> {
    lexer: Lexer<'src>,
    trace: Trace<W>,
    token: TokenKind,
    consumed: usize,
}

impl<'src, W: Write> Parser<'src, W> {
    pub fn new(lexer: Lexer<'src>, sink: W) -> Self {
        Parser {
            lexer,
            trace: Trace::new(sink),
            token: TokenKind::None,
            consumed: 0,
        }
    }

    /// Run the top-level production once and return its outcome.
    ///
    /// The trace is complete when this returns `Ok`, whatever the verdict. An `Err` means
    /// the sink could not be written and the trace is incomplete.
    pub fn run(mut self) -> io::Result<Validation> {
        self.token = self.lexer.next_token();
        let validation = self.gui()?;
        tracing::trace!(lines = self.trace.lines(), "trace complete");
        self.trace.finish()?;
        Ok(validation)
    }

    fn gui(&mut self) -> io::Result<Validation> {
        self.trace.enter("GUI")?;

        let validation = match self.gui_body() {
            Ok(()) => Validation {
                verdict: Verdict::Accepted,
                offending: None,
                tokens_consumed: self.consumed,
            },
            Err(Halt::Mismatch) => {
                let verdict = if self.token == TokenKind::None {
                    Verdict::LexicalError
                } else {
                    Verdict::SyntaxError
                };
                let lexeme = self.lexer.lexeme();
                tracing::debug!(%verdict, token = ?self.token, lexeme, "validation stopped");
                self.trace.failure(verdict)?;
                self.trace.token(self.token, lexeme)?;
                Validation {
                    verdict,
                    offending: Some(Offending {
                        kind: self.token,
                        lexeme: lexeme.to_string(),
                    }),
                    tokens_consumed: self.consumed,
                }
            }
            Err(Halt::Io(err)) => return Err(err),
        };

        self.trace.exit("GUI")?;
        Ok(validation)
    }

    fn gui_body(&mut self) -> Step {
        self.expect(TokenKind::Window)?;
        self.expect(TokenKind::String)?;
        self.expect(TokenKind::OpenParen)?;
        self.expect(TokenKind::Number)?;
        self.expect(TokenKind::Comma)?;
        self.expect(TokenKind::Number)?;
        self.expect(TokenKind::CloseParen)?;
        self.layout()?;
        self.widgets()?;
        self.expect(TokenKind::End)?;
        // Last token of the document: record it without pulling another one, so anything
        // after the period is never looked at.
        if self.token != TokenKind::Period {
            return Err(Halt::Mismatch);
        }
        self.record()
    }

    fn layout(&mut self) -> Step {
        self.production("Layout", |p| {
            p.expect(TokenKind::Layout)?;
            p.layout_type()?;
            p.expect(TokenKind::Colon)
        })
    }

    fn layout_type(&mut self) -> Step {
        self.production("Layout Type", |p| {
            let kind = p.token;
            if !kind.is_layout_type() {
                return Err(Halt::Mismatch);
            }
            p.advance()?;
            p.expect(TokenKind::OpenParen)?;

            match kind {
                TokenKind::Flow => {
                    if p.token != TokenKind::CloseParen {
                        p.align()?;
                    }
                }
                TokenKind::Border => {
                    if p.token != TokenKind::CloseParen {
                        p.number_pair()?;
                    }
                }
                TokenKind::Grid => {
                    p.number_pair()?;
                    if p.token != TokenKind::CloseParen {
                        p.expect(TokenKind::Comma)?;
                        p.number_pair()?;
                    }
                }
                _ => unreachable!("checked by is_layout_type"),
            }

            p.expect(TokenKind::CloseParen)
        })
    }

    /// `NUMBER ',' NUMBER`, shared by the Border and Grid arguments.
    fn number_pair(&mut self) -> Step {
        self.expect(TokenKind::Number)?;
        self.expect(TokenKind::Comma)?;
        self.expect(TokenKind::Number)
    }

    fn align(&mut self) -> Step {
        self.production("Align", |p| {
            if !p.token.is_alignment() {
                return Err(Halt::Mismatch);
            }
            p.advance()
        })
    }

    fn widgets(&mut self) -> Step {
        self.production("Widgets", |p| {
            p.widget()?;
            let mut count = 1;
            while p.token.starts_widget() {
                p.widget()?;
                count += 1;
            }
            tracing::trace!(count, "widgets matched");
            Ok(())
        })
    }

    fn widget(&mut self) -> Step {
        self.production("Widget", |p| {
            match p.token {
                TokenKind::Button | TokenKind::Label => {
                    p.advance()?;
                    p.expect(TokenKind::String)?;
                }
                TokenKind::Textfield => {
                    p.advance()?;
                    p.expect(TokenKind::Number)?;
                }
                TokenKind::Group => {
                    p.advance()?;
                    p.radio_buttons()?;
                    p.expect(TokenKind::End)?;
                }
                TokenKind::Panel => {
                    p.advance()?;
                    p.layout()?;
                    p.widgets()?;
                    p.expect(TokenKind::End)?;
                }
                _ => return Err(Halt::Mismatch),
            }
            p.expect(TokenKind::Semicolon)
        })
    }

    fn radio_buttons(&mut self) -> Step {
        self.production("Radio Buttons", |p| {
            p.radio_button()?;
            while p.token == TokenKind::Radio {
                p.radio_button()?;
            }
            Ok(())
        })
    }

    fn radio_button(&mut self) -> Step {
        self.production("Radio Button", |p| {
            p.expect(TokenKind::Radio)?;
            p.expect(TokenKind::String)?;
            p.expect(TokenKind::Semicolon)
        })
    }

    /// Wrap a production body in its entering/exiting trace lines.
    ///
    /// The exiting line is written on mismatch too; a sink failure skips it.
    fn production(&mut self, name: &str, body: impl FnOnce(&mut Self) -> Step) -> Step {
        self.trace.enter(name)?;
        let outcome = body(self);
        if let Err(Halt::Io(_)) = outcome {
            return outcome;
        }
        self.trace.exit(name)?;
        outcome
    }

    /// Consume the current token if it is `expected`.
    fn expect(&mut self, expected: TokenKind) -> Step {
        if self.token != expected {
            return Err(Halt::Mismatch);
        }
        self.advance()
    }

    /// Record the current, already validated token and pull the next one.
    fn advance(&mut self) -> Step {
        self.record()?;
        self.token = self.lexer.next_token();
        Ok(())
    }

    fn record(&mut self) -> Step {
        self.trace.token(self.token, self.lexer.lexeme())?;
        self.consumed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::preprocess;

    fn validate(source: &str) -> (Validation, String) {
        let source = preprocess(source);
        let mut sink = Vec::new();
        let validation = Parser::new(Lexer::new(&source), &mut sink).run().unwrap();
        (validation, String::from_utf8(sink).unwrap())
    }

    fn verdict(source: &str) -> Verdict {
        validate(source).0.verdict
    }

    #[test]
    fn test_minimal_window_trace() {
        let (validation, trace) = validate(r#"Window "Main" (100,200) Layout Flow(): Button "OK"; End."#);
        assert_eq!(validation.verdict, Verdict::Accepted);
        assert_eq!(validation.offending, None);
        assert_eq!(validation.tokens_consumed, 17);

        let expected = [
            "Entering GUI Production",
            "Next Token is: 0; Next Lexeme is: Window",
            "Next Token is: 1; Next Lexeme is: Main",
            "Next Token is: 3; Next Lexeme is: (",
            "Next Token is: 24; Next Lexeme is: 100",
            "Next Token is: 25; Next Lexeme is: ,",
            "Next Token is: 24; Next Lexeme is: 200",
            "Next Token is: 4; Next Lexeme is: )",
            "Entering Layout Production",
            "Next Token is: 2; Next Lexeme is: Layout",
            "Entering Layout Type Production",
            "Next Token is: 7; Next Lexeme is: Flow",
            "Next Token is: 3; Next Lexeme is: (",
            "Next Token is: 4; Next Lexeme is: )",
            "Exiting Layout Type Production",
            "Next Token is: 5; Next Lexeme is: :",
            "Exiting Layout Production",
            "Entering Widgets Production",
            "Entering Widget Production",
            "Next Token is: 13; Next Lexeme is: Button",
            "Next Token is: 1; Next Lexeme is: OK",
            "Next Token is: 6; Next Lexeme is: ;",
            "Exiting Widget Production",
            "Exiting Widgets Production",
            "Next Token is: 19; Next Lexeme is: End",
            "Next Token is: 20; Next Lexeme is: .",
            "Exiting GUI Production",
        ];
        assert_eq!(trace.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_missing_colon_is_syntax_error() {
        let (validation, trace) = validate(r#"Window "Main" (100,200) Layout Flow() Button "OK"; End."#);
        assert_eq!(validation.verdict, Verdict::SyntaxError);
        assert_eq!(
            validation.offending,
            Some(Offending {
                kind: TokenKind::Button,
                lexeme: "Button".to_string(),
            })
        );

        let tail: Vec<_> = trace.lines().rev().take(5).collect();
        assert_eq!(
            tail,
            vec![
                "Exiting GUI Production",
                "Next Token is: 13; Next Lexeme is: Button",
                "******** Syntax Error!! ********",
                "Exiting Layout Production",
                "Exiting Layout Type Production",
            ]
        );
    }

    #[test]
    fn test_bad_number_is_lexical_error() {
        let (validation, _) = validate(r#"Window "Main" (10x,200) Layout Flow(): Button "OK"; End."#);
        assert_eq!(validation.verdict, Verdict::LexicalError);
        assert_eq!(validation.offending.unwrap().lexeme, "x");

        let (validation, trace) = validate(r#"Window "Main" (007,200) Layout Flow(): Button "OK"; End."#);
        assert_eq!(validation.verdict, Verdict::LexicalError);
        assert_eq!(validation.tokens_consumed, 3);
        assert!(trace.contains("******** Lexical Error!! ********\nNext Token is: 21; Next Lexeme is: 007\n"));
    }

    #[test]
    fn test_layout_arguments() {
        let wrap = |layout: &str| format!(r#"Window "W" (1,1) Layout {}: Label "x"; End."#, layout);

        assert_eq!(verdict(&wrap("Flow()")), Verdict::Accepted);
        assert_eq!(verdict(&wrap("Flow(Left)")), Verdict::Accepted);
        assert_eq!(verdict(&wrap("Flow(Center)")), Verdict::Accepted);
        assert_eq!(verdict(&wrap("Flow(1)")), Verdict::SyntaxError);
        assert_eq!(verdict(&wrap("Flow(Left Right)")), Verdict::SyntaxError);

        assert_eq!(verdict(&wrap("Border()")), Verdict::Accepted);
        assert_eq!(verdict(&wrap("Border(5,5)")), Verdict::Accepted);
        assert_eq!(verdict(&wrap("Border(5)")), Verdict::SyntaxError);

        assert_eq!(verdict(&wrap("Grid(2,3)")), Verdict::Accepted);
        assert_eq!(verdict(&wrap("Grid(2,3,4,5)")), Verdict::Accepted);
        assert_eq!(verdict(&wrap("Grid()")), Verdict::SyntaxError);
        assert_eq!(verdict(&wrap("Grid(2,3,4)")), Verdict::SyntaxError);

        assert_eq!(verdict(&wrap("Panel()")), Verdict::SyntaxError);
    }

    #[test]
    fn test_every_widget_kind() {
        let source = r#"
            Window "All" (640,480)
            Layout Border(2,2):
                Button "Go";
                Label "Name";
                Textfield 20;
                Group Radio "A"; End;
                Panel Layout Grid(1,2): Label "Nested"; Textfield 5; End;
            End.
        "#;
        assert_eq!(verdict(source), Verdict::Accepted);
    }

    #[test]
    fn test_widgets_require_at_least_one() {
        let (validation, _) = validate(r#"Window "W" (1,1) Layout Flow(): End."#);
        assert_eq!(validation.verdict, Verdict::SyntaxError);
        assert_eq!(validation.offending.unwrap().kind, TokenKind::End);
    }

    #[test]
    fn test_failure_inside_later_widget_propagates() {
        let (validation, _) = validate(r#"Window "W" (1,1) Layout Flow(): Label "a"; Label 5; End."#);
        assert_eq!(validation.verdict, Verdict::SyntaxError);
        assert_eq!(validation.offending.unwrap().kind, TokenKind::Number);
    }

    #[test]
    fn test_group_requires_radio_buttons() {
        assert_eq!(
            verdict(r#"Window "W" (1,1) Layout Flow(): Group End; End."#),
            Verdict::SyntaxError
        );
        assert_eq!(
            verdict(r#"Window "W" (1,1) Layout Flow(): Group Radio "A" End; End."#),
            Verdict::SyntaxError
        );
    }

    #[test]
    fn test_unclosed_panel() {
        let (validation, _) = validate(r#"Window "W" (1,1) Layout Flow(): Panel Layout Flow(): Label "a"; End."#);
        assert_eq!(validation.verdict, Verdict::SyntaxError);
        assert_eq!(validation.offending.unwrap().kind, TokenKind::Period);
    }

    #[test]
    fn test_missing_period() {
        let (validation, trace) = validate(r#"Window "W" (1,1) Layout Flow(): Label "a"; End"#);
        assert_eq!(validation.verdict, Verdict::SyntaxError);
        assert_eq!(validation.offending.unwrap().kind, TokenKind::EndOfInput);
        assert!(trace.contains("Next Token is: 23; Next Lexeme is: \n"));
    }

    #[test]
    fn test_content_after_period_is_ignored() {
        assert_eq!(
            verdict(r#"Window "W" (1,1) Layout Flow(): Label "a"; End. trailing # junk"#),
            Verdict::Accepted
        );
    }

    #[test]
    fn test_empty_document() {
        let (validation, trace) = validate("");
        assert_eq!(validation.verdict, Verdict::SyntaxError);
        assert_eq!(validation.tokens_consumed, 0);
        assert_eq!(
            trace,
            "Entering GUI Production\n\
             ******** Syntax Error!! ********\n\
             Next Token is: 23; Next Lexeme is: \n\
             Exiting GUI Production\n"
        );
    }

    #[test]
    fn test_deep_sibling_lists_do_not_recurse() {
        let mut source = String::from(r#"Window "W" (1,1) Layout Flow():"#);
        for _ in 0..50_000 {
            source.push_str(r#" Button "b";"#);
        }
        source.push_str(" End.");
        assert_eq!(verdict(&source), Verdict::Accepted);
    }

    #[test]
    fn test_nested_panels() {
        let depth = 64;
        let mut source = String::from(r#"Window "W" (1,1) Layout Flow():"#);
        for _ in 0..depth {
            source.push_str(" Panel Layout Flow():");
        }
        source.push_str(r#" Label "x";"#);
        for _ in 0..depth {
            source.push_str(" End;");
        }
        source.push_str(" End.");

        let (validation, trace) = validate(&source);
        assert_eq!(validation.verdict, Verdict::Accepted);
        assert_eq!(trace.matches("Entering Widgets Production").count(), depth + 1);
    }

    struct FailAfter {
        remaining: usize,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.remaining -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_aborts_the_run() {
        let accepted = preprocess(r#"Window "Main" (100,200) Layout Flow(): Button "OK"; End."#);
        let rejected = preprocess(r#"Window "Main" (100,200) Layout Flow() Button "OK"; End."#);
        for source in [&accepted, &rejected] {
            for remaining in 0..30 {
                let err = Parser::new(Lexer::new(source), FailAfter { remaining })
                    .run()
                    .unwrap_err();
                assert_eq!(err.kind(), io::ErrorKind::Other);
            }
        }
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Accepted.to_string(), "accepted");
        assert_eq!(Verdict::LexicalError.to_string(), "lexical error");
        assert!(Verdict::Accepted.is_accepted());
        assert!(!Verdict::SyntaxError.is_accepted());
    }
}
