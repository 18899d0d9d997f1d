//! Module argument splitting and escaping.
//!
//! Arguments are separated by spaces or tabs. An argument that itself needs
//! whitespace is wrapped in square brackets, with `\[`, `\]` and `\\`
//! standing for literal brackets and backslashes inside it:
//!
//! ```text
//! pam_mysql.so user=test [query=SELECT * FROM t WHERE x='%u']
//! ```
//!
//! Parsing works on characters rather than lexer tokens and nests the same
//! way the lexer does: `[a [x] b]` is the single argument `a [x] b`.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Split an argument string into individual arguments.
///
/// A bracketed argument left open at the end of the input produces nothing.
pub fn parse_arguments(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = input.trim().chars().peekable();

    while let Some(&c) = chars.peek() {
        if is_separator(c) {
            chars.next();
        } else if c == '[' {
            chars.next();
            if let Some(content) = scan_bracketed(&mut chars) {
                args.push(content);
            }
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if is_separator(c) || c == '[' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            args.push(word);
        }
    }

    args
}

/// Consume a bracketed argument after its opening `[`.
///
/// Returns `None` when input runs out before the matching `]`.
fn scan_bracketed(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut content = String::new();
    let mut depth = 1usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('[' | ']' | '\\')) => content.push(escaped),
                Some(other) => {
                    content.push('\\');
                    content.push(other);
                }
                None => content.push('\\'),
            },
            '[' => {
                depth += 1;
                content.push(c);
            }
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(content);
                }
                content.push(c);
            }
            _ => content.push(c),
        }
    }

    None
}

/// True when `arg` can't be written as a bare word.
///
/// A trailing `\` counts too, since a bare one at the end of a line reads
/// as a continuation.
pub fn needs_brackets(arg: &str) -> bool {
    arg.is_empty() || arg.ends_with('\\') || arg.contains([' ', '\t', '\n', '[', ']', '#'])
}

/// Render one argument, bracketing and escaping it when required.
pub fn format_argument(arg: &str) -> Cow<'_, str> {
    if !needs_brackets(arg) {
        return Cow::Borrowed(arg);
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('[');
    for c in arg.chars() {
        if matches!(c, '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(']');
    Cow::Owned(out)
}

/// Render a list of arguments separated by single spaces.
pub fn format_arguments<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| format_argument(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
