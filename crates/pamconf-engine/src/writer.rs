//! # Writer - [`Configuration`] back to text
//!
//! The writer never mutates the model. Output is grouped the same way every
//! time:
//!
//! 1. standalone comments, each as `# text`
//! 2. rules, grouped by category in [`ModuleClass::order`] order with a
//!    blank line between groups
//! 3. directives, in their original relative order
//!
//! Lines longer than [`WriterOptions::max_line_length`] are folded with a
//! trailing `\` and an indented continuation, which the parser joins back
//! into the same logical line.
//!
//! [`ModuleClass::order`]: pamconf_syntax::ModuleClass::order

use std::io;

use pamconf_syntax::{ModuleClass, format_arguments};
use serde::{Deserialize, Serialize};

use crate::model::{Configuration, Directive, Entry, Format, Rule, grouped_order};

/// Column widths used by pretty output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWidths {
    pub category: usize,
    pub control: usize,
    pub module: usize,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            // "password"
            category: 8,
            control: 12,
            module: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Fold lines longer than this. `0` disables folding.
    pub max_line_length: usize,
    pub continuation_indent: usize,
    /// Align category, control and module into columns. Only applies to
    /// per-service files.
    pub pretty: bool,
    /// Pretty column widths. `None` measures each configuration as it is
    /// written.
    pub columns: Option<ColumnWidths>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            max_line_length: 100,
            continuation_indent: 4,
            pretty: false,
            columns: Some(ColumnWidths::default()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Writer {
    options: WriterOptions,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    pub fn pretty(mut self, enabled: bool) -> Self {
        self.options.pretty = enabled;
        self
    }

    pub fn with_columns(mut self, columns: ColumnWidths) -> Self {
        self.options.columns = Some(columns);
        self
    }

    /// Measure column widths from whatever configuration is written.
    pub fn with_auto_columns(mut self) -> Self {
        self.options.columns = None;
        self
    }

    /// Use column widths measured from `config`.
    pub fn with_measured_columns(self, config: &Configuration) -> Self {
        self.with_columns(measure_columns(config))
    }

    pub fn write<W: io::Write>(&self, config: &Configuration, mut out: W) -> io::Result<()> {
        for line in self.render_lines(config) {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()
    }

    pub fn write_string(&self, config: &Configuration) -> String {
        let mut out = String::new();
        for line in self.render_lines(config) {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Pretty output with widths measured from `config`, leaving this
    /// writer's own options untouched.
    pub fn write_pretty_string(&self, config: &Configuration) -> String {
        self.clone()
            .pretty(true)
            .with_measured_columns(config)
            .write_string(config)
    }

    /// Every output line, without terminators, after grouping and folding.
    pub fn render_lines(&self, config: &Configuration) -> Vec<String> {
        if self.options.pretty && self.options.columns.is_none() {
            return self.clone().with_measured_columns(config).render_lines(config);
        }

        let mut lines: Vec<String> = config
            .comments
            .iter()
            .map(|comment| {
                if comment.is_empty() {
                    "#".to_string()
                } else {
                    format!("# {comment}")
                }
            })
            .collect();

        let mut current: Option<&ModuleClass> = None;
        for index in grouped_order(&config.entries) {
            let entry = &config.entries[index];
            if let Entry::Rule(rule) = entry {
                let class = rule.category.normalized();
                if current != Some(class) {
                    if lines.last().is_some_and(|last| !last.starts_with('#')) {
                        lines.push(String::new());
                    }
                    current = Some(class);
                }
            }
            lines.extend(self.fold_line(&self.format_entry(entry, config.format)));
        }

        lines
    }

    /// Render one entry as a single logical line.
    ///
    /// With auto columns there is no file to measure, so pretty rules use
    /// the default widths.
    pub fn format_entry(&self, entry: &Entry, format: Format) -> String {
        match entry {
            Entry::Rule(rule) => self.format_rule(rule, format),
            Entry::Directive(directive) => format_directive(directive),
        }
    }

    fn format_rule(&self, rule: &Rule, format: Format) -> String {
        let category = rule.category.to_string();
        let control = rule.control.to_string();

        let mut line = match format {
            Format::PerService if self.options.pretty => {
                let columns = self.options.columns.unwrap_or_default();
                let mut line = String::new();
                push_padded(&mut line, &category, columns.category);
                push_padded(&mut line, &control, columns.control);
                if rule.arguments.is_empty() {
                    line.push_str(&rule.module);
                } else {
                    push_padded(&mut line, &rule.module, columns.module);
                    line.push_str(&format_arguments(&rule.arguments));
                }
                line
            }
            _ => {
                let mut parts: Vec<&str> = Vec::with_capacity(5);
                if format == Format::MultiService
                    && let Some(service) = rule.service.as_deref()
                {
                    parts.push(service);
                }
                parts.extend([category.as_str(), control.as_str(), rule.module.as_str()]);
                let arguments = format_arguments(&rule.arguments);
                if !arguments.is_empty() {
                    parts.push(&arguments);
                }
                parts.join(" ")
            }
        };

        push_comment(&mut line, rule.comment.as_deref());
        line
    }

    /// Split an over-long line into continuation lines.
    ///
    /// Breaks only at spaces outside bracketed spans, preferring the last one
    /// that keeps the line and its ` \\` marker within the limit, searching
    /// back no further than half the limit. A line with no usable space is
    /// returned as is.
    pub fn fold_line(&self, line: &str) -> Vec<String> {
        let max = self.options.max_line_length;
        if max == 0 || line.len() <= max {
            return vec![line.to_string()];
        }

        let indent = " ".repeat(self.options.continuation_indent);
        let mut lines = Vec::new();
        let mut remaining = line.to_string();

        while remaining.len() > max {
            let breaks = break_points(&remaining);
            let at = breaks
                .iter()
                .rev()
                .find(|&&i| i > max / 2 && i + 2 <= max)
                .or_else(|| breaks.iter().find(|&&i| i + 2 > max));
            let Some(&at) = at else {
                break;
            };

            lines.push(format!("{} \\", remaining[..at].trim_end()));
            remaining = format!("{indent}{}", remaining[at..].trim());
        }

        lines.push(remaining);
        lines
    }
}

/// Widths that fit every rule of `config`, plus two spaces of gutter.
pub fn measure_columns(config: &Configuration) -> ColumnWidths {
    let mut widths = ColumnWidths {
        category: 0,
        control: 0,
        module: 0,
    };
    for rule in config.rules() {
        widths.category = widths.category.max(rule.category.to_string().len());
        widths.control = widths.control.max(rule.control.to_string().len());
        widths.module = widths.module.max(rule.module.len());
    }
    ColumnWidths {
        category: widths.category + 2,
        control: widths.control + 2,
        module: widths.module + 2,
    }
}

fn format_directive(directive: &Directive) -> String {
    let mut line = format!("@{} {}", directive.kind.as_str(), directive.target);
    let arguments = format_arguments(&directive.arguments);
    if !arguments.is_empty() {
        line.push(' ');
        line.push_str(&arguments);
    }
    push_comment(&mut line, directive.comment.as_deref());
    line
}

fn push_comment(line: &mut String, comment: Option<&str>) {
    if let Some(comment) = comment.filter(|c| !c.is_empty()) {
        line.push_str(" # ");
        line.push_str(comment);
    }
}

/// Append `field` and pad to `width`, always leaving at least one space.
fn push_padded(line: &mut String, field: &str, width: usize) {
    line.push_str(field);
    let padding = width.saturating_sub(field.len()).max(1);
    line.extend(std::iter::repeat_n(' ', padding));
}

/// Byte offsets of spaces a line may be folded at.
///
/// Only single spaces between two non-whitespace characters qualify, so
/// rejoining the halves with one space restores the text exactly. Spaces
/// inside `[...]` are excluded, but inside a trailing comment they count.
fn break_points(line: &str) -> Vec<usize> {
    let start = line.len() - line.trim_start().len();
    let end = line.trim_end().len();

    let mut points = Vec::new();
    let mut depth = 0usize;
    let mut in_comment = false;
    let mut chars = line.char_indices().skip_while(|&(i, _)| i < start);

    while let Some((i, c)) = chars.next() {
        if i >= end {
            break;
        }
        match c {
            ' ' if depth == 0 || in_comment => {
                let solid = |c: Option<char>| c.is_some_and(|c| !c.is_whitespace());
                if solid(line[..i].chars().next_back()) && solid(line[i + 1..].chars().next()) {
                    points.push(i);
                }
            }
            '\\' if depth > 0 && !in_comment => {
                chars.next();
            }
            '[' if !in_comment => depth += 1,
            ']' if !in_comment => depth = depth.saturating_sub(1),
            '#' if depth == 0 => in_comment = true,
            _ => {}
        }
    }

    points
}
