//! # Lexer - Splitting a Logical Line into Fields
//!
//! This module is the first stage of parsing: a single logical line (already
//! folded across any backslash continuations) is broken into raw fields using
//! the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## Token Shapes
//!
//! A PAM line only has three kinds of field:
//!
//! - **Words**: any run of non-whitespace characters that does not start a
//!   bracketed span or a comment (`auth`, `pam_unix.so`, `nullok`, `b]`).
//! - **Bracketed spans**: a `[` and everything up to the matching `]`,
//!   whitespace included. Inner `[...]` pairs nest, and `\]` does not close
//!   the span. An unterminated span simply runs to the end of the line;
//!   deciding whether that is acceptable is the caller's job.
//! - **Comments**: an unbracketed `#` and the rest of the line.
//!
//! Whitespace outside brackets only separates fields and is never emitted.
//!
//! ```
//! use pamconf_syntax::lexer::{tokenize, TokenKind};
//!
//! let tokens = tokenize("auth [success=ok default=bad] pam_unix.so # note");
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [TokenKind::Word, TokenKind::Bracketed, TokenKind::Word, TokenKind::Comment]
//! );
//! ```
//!
//! ## Suppressed complex controls
//!
//! A `-` glued to an opening bracket (`-[success=ok]`) is lexed together with
//! the span. Logos always prefers the longest match, so the one-character
//! `-` word loses to the bracketed form.

use logos::{Lexer, Logos};
use serde::Serialize;

/// Field kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    /// `[ ... ]`, optionally prefixed by `-`. The closing bracket is optional.
    #[regex(r"-?\[", bracketed_span)]
    Bracketed,

    /// `#` and everything after it.
    #[regex(r"#[^\n]*")]
    Comment,

    /// Plain field text.
    #[regex(r"[^ \t\r\n\f\[#]+")]
    Word,
}

/// Extend a bracketed token from its opening `[` to the matching `]`.
fn bracketed_span(lex: &mut Lexer<'_, TokenKind>) {
    let rest = lex.remainder();
    let mut depth = 1usize;
    let mut end = rest.len();
    let mut chars = rest.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\n' => {
                end = i;
                break;
            }
            '\\' => {
                if chars.peek().is_some_and(|&(_, next)| next != '\n') {
                    chars.next();
                }
            }
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    end = i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    lex.bump(end);
}

/// A lexed field with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    /// Comment body without the leading `#` and surrounding whitespace.
    ///
    /// Returns `None` for anything other than a comment token.
    pub fn comment_text(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::Comment => Some(self.text[1..].trim()),
            _ => None,
        }
    }
}

/// Tokenize one logical line.
///
/// Never fails: characters Logos cannot classify are kept as [`TokenKind::Word`].
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    tokenize_with_spans(line)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Tokenize and return each field along with its byte span in `line`.
pub fn tokenize_with_spans(line: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(line);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = result.unwrap_or(TokenKind::Word);
        tokens.push((Token { kind, text }, span));
    }

    tokens
}
