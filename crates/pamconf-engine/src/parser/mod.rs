//! # Parser - Text to [`Configuration`]
//!
//! Reads physical lines, folds backslash continuations into logical lines
//! and hands each logical line to the field-level parser in [`line`].
//!
//! ```text
//! physical lines ──► Normal ──(trailing '\')──► Continuing ──┐
//!                      ▲                                       │
//!                      └────(line without trailing '\')────────┘
//!                              parse accumulated text
//! ```
//!
//! Standalone comment lines are collected on the configuration; comments
//! after a rule stay attached to it. The first structural error aborts the
//! whole parse and carries the 1-based line it was found on. For a folded
//! rule that is the line the rule started on.

mod error;
mod line;

use std::io::{BufRead, Cursor};

use regex::Regex;

pub use error::{ParseError, ParseErrorKind};
use line::{LineContext, LineOutcome, parse_logical_line};

use crate::model::{Configuration, Format};

/// A logical line still being accumulated.
struct Pending {
    start: usize,
    text: String,
    physical_lines: usize,
}

/// Compiled line patterns, built once and reused for every parse.
#[derive(Debug, Clone)]
pub struct Parser {
    comment_line: Regex,
    continuation: Regex,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            comment_line: Regex::new(r"^\s*#(.*)$").expect("Invalid comment regex"),
            continuation: Regex::new(r"^(.*)\\[ \t\r]*$").expect("Invalid continuation regex"),
        }
    }

    pub fn parse_str(&self, input: &str, format: Format) -> Result<Configuration, ParseError> {
        self.parse(Cursor::new(input), format)
    }

    pub fn parse_str_with_service(
        &self,
        input: &str,
        format: Format,
        service: &str,
    ) -> Result<Configuration, ParseError> {
        self.parse_with_service(Cursor::new(input), format, Some(service))
    }

    pub fn parse<R: BufRead>(&self, reader: R, format: Format) -> Result<Configuration, ParseError> {
        self.parse_with_service(reader, format, None)
    }

    /// Parse a whole stream.
    ///
    /// `service` is stamped on every rule of a per-service file; rules in the
    /// many-services format always take the service from their first field.
    pub fn parse_with_service<R: BufRead>(
        &self,
        reader: R,
        format: Format,
        service: Option<&str>,
    ) -> Result<Configuration, ParseError> {
        let mut config = Configuration::new(format);
        let mut pending: Option<Pending> = None;
        let mut line_no = 0;

        for line in reader.lines() {
            line_no += 1;
            let line = line.map_err(|source| ParseError::Io {
                line: line_no,
                source,
            })?;

            if let Some(mut acc) = pending.take() {
                log::trace!("continuation of line {} at line {line_no}", acc.start);
                acc.physical_lines += 1;
                match self.continued_text(&line) {
                    Some(body) => {
                        push_fragment(&mut acc.text, body);
                        pending = Some(acc);
                    }
                    None => {
                        push_fragment(&mut acc.text, &line);
                        self.finish(&mut config, acc, format, service)?;
                    }
                }
                continue;
            }

            if let Some(caps) = self.comment_line.captures(&line) {
                let text = caps.get(1).map_or("", |m| m.as_str()).trim();
                if !text.is_empty() {
                    config.comments.push(text.to_string());
                }
                continue;
            }

            match self.continued_text(&line) {
                Some(body) => {
                    pending = Some(Pending {
                        start: line_no,
                        text: body.trim_end().to_string(),
                        physical_lines: 1,
                    });
                }
                None => {
                    let ctx = LineContext {
                        line: line_no,
                        continuation: false,
                        format,
                        service,
                    };
                    accept(&mut config, parse_logical_line(&line, &ctx), line_no)?;
                }
            }
        }

        // A trailing backslash on the last line has nothing left to join.
        if let Some(acc) = pending {
            self.finish(&mut config, acc, format, service)?;
        }

        log::debug!(
            "parsed {} entries and {} comments from {line_no} lines ({format:?})",
            config.entries.len(),
            config.comments.len(),
        );
        Ok(config)
    }

    /// Text before a trailing `\`, or `None` when the line does not continue.
    fn continued_text<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.continuation
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    fn finish(
        &self,
        config: &mut Configuration,
        acc: Pending,
        format: Format,
        service: Option<&str>,
    ) -> Result<(), ParseError> {
        let ctx = LineContext {
            line: acc.start,
            continuation: acc.physical_lines > 1,
            format,
            service,
        };
        accept(config, parse_logical_line(&acc.text, &ctx), acc.start)
    }
}

fn push_fragment(acc: &mut String, fragment: &str) {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return;
    }
    if !acc.is_empty() {
        acc.push(' ');
    }
    acc.push_str(fragment);
}

fn accept(
    config: &mut Configuration,
    outcome: Result<LineOutcome, ParseErrorKind>,
    line: usize,
) -> Result<(), ParseError> {
    match outcome.map_err(|kind| ParseError::Syntax { line, kind })? {
        LineOutcome::Entry(entry) => config.entries.push(entry),
        LineOutcome::Comment(text) => config.comments.push(text),
        LineOutcome::Blank => {}
    }
    Ok(())
}
