//! Turning one logical line into an entry.
//!
//! Field order is fixed: `[service] category control module [args...]`, or
//! `@kind target [args...]` for directives, optionally followed by a comment.

use pamconf_syntax::{Category, Control, Token, parse_arguments, tokenize};

use super::error::ParseErrorKind;
use crate::model::{Directive, DirectiveKind, Entry, Format, Rule};

/// Where a logical line came from and how to read it.
pub(crate) struct LineContext<'a> {
    pub line: usize,
    pub continuation: bool,
    pub format: Format,
    /// Service name for per-service files, supplied by the caller.
    pub service: Option<&'a str>,
}

#[derive(Debug, PartialEq)]
pub(crate) enum LineOutcome {
    Blank,
    Comment(String),
    Entry(Entry),
}

pub(crate) fn parse_logical_line(
    text: &str,
    ctx: &LineContext<'_>,
) -> Result<LineOutcome, ParseErrorKind> {
    let tokens = tokenize(text);
    let (fields, comment) = match tokens.iter().position(Token::is_comment) {
        Some(at) => (&tokens[..at], tokens[at].comment_text()),
        None => (&tokens[..], None),
    };
    let comment = comment.filter(|c| !c.is_empty()).map(str::to_string);

    let Some(first) = fields.first() else {
        return Ok(match comment {
            Some(comment) => LineOutcome::Comment(comment),
            None => LineOutcome::Blank,
        });
    };

    let entry = if let Some(kind) = first.text.strip_prefix('@') {
        Entry::Directive(parse_directive(kind, &fields[1..], comment, ctx)?)
    } else {
        Entry::Rule(parse_rule(fields, comment, ctx)?)
    };
    Ok(LineOutcome::Entry(entry))
}

fn parse_directive(
    kind: &str,
    rest: &[Token<'_>],
    comment: Option<String>,
    ctx: &LineContext<'_>,
) -> Result<Directive, ParseErrorKind> {
    if kind.is_empty() {
        return Err(ParseErrorKind::EmptyDirective);
    }
    let kind = DirectiveKind::from_name(kind)
        .ok_or_else(|| ParseErrorKind::UnknownDirective(kind.to_string()))?;
    let (target, args) = rest
        .split_first()
        .ok_or_else(|| ParseErrorKind::MissingDirectiveTarget(kind.as_str().to_string()))?;

    Ok(Directive {
        kind,
        target: target.text.to_string(),
        arguments: join_arguments(args),
        comment,
        line: ctx.line,
    })
}

fn parse_rule(
    fields: &[Token<'_>],
    comment: Option<String>,
    ctx: &LineContext<'_>,
) -> Result<Rule, ParseErrorKind> {
    let mut fields = fields.iter().map(|token| token.text);

    let service = match ctx.format {
        Format::MultiService => Some(
            fields
                .next()
                .ok_or(ParseErrorKind::MissingServiceField)?
                .to_string(),
        ),
        Format::PerService => ctx.service.map(str::to_string),
    };

    let category: Category = fields
        .next()
        .ok_or(ParseErrorKind::MissingModuleType)?
        .parse()?;
    let control = Control::parse(fields.next().ok_or(ParseErrorKind::MissingControlField)?)?;
    let module = fields
        .next()
        .ok_or(ParseErrorKind::MissingModulePath)?
        .to_string();

    let rest: Vec<&str> = fields.collect();
    Ok(Rule {
        service,
        category,
        control,
        module,
        arguments: parse_arguments(&rest.join(" ")),
        comment,
        line: ctx.line,
        continuation: ctx.continuation,
    })
}

fn join_arguments(tokens: &[Token<'_>]) -> Vec<String> {
    let joined: Vec<&str> = tokens.iter().map(|token| token.text).collect();
    parse_arguments(&joined.join(" "))
}
