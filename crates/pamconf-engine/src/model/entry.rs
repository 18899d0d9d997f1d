use pamconf_syntax::{Category, Control};
use serde::{Deserialize, Serialize};

/// A module rule: `[service] category control module [args...] [# comment]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Owning service. Read from the line in the many-services format,
    /// supplied by the caller (usually the file name) otherwise.
    pub service: Option<String>,
    pub category: Category,
    pub control: Control,
    pub module: String,
    pub arguments: Vec<String>,
    pub comment: Option<String>,
    /// 1-based line the rule started on; 0 for rules built in code.
    pub line: usize,
    /// True when the rule was folded from several physical lines.
    pub continuation: bool,
}

impl Rule {
    pub fn new(category: impl Into<Category>, control: Control, module: impl Into<String>) -> Self {
        Self {
            service: None,
            category: category.into(),
            control,
            module: module.into(),
            arguments: Vec::new(),
            comment: None,
            line: 0,
            continuation: false,
        }
    }

    pub fn with_arguments<S: Into<String>>(mut self, arguments: impl IntoIterator<Item = S>) -> Self {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

/// Directive kinds. Only `@include` exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    Include,
}

impl DirectiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKind::Include => "include",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "include" => Some(DirectiveKind::Include),
            _ => None,
        }
    }
}

/// A non-rule line such as `@include common-auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub target: String,
    pub arguments: Vec<String>,
    pub comment: Option<String>,
    pub line: usize,
}

impl Directive {
    pub fn include(target: impl Into<String>) -> Self {
        Self {
            kind: DirectiveKind::Include,
            target: target.into(),
            arguments: Vec::new(),
            comment: None,
            line: 0,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// One logical line of a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "lowercase")]
pub enum Entry {
    Rule(Rule),
    Directive(Directive),
}

impl Entry {
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Entry::Rule(rule) => Some(rule),
            Entry::Directive(_) => None,
        }
    }

    pub fn as_rule_mut(&mut self) -> Option<&mut Rule> {
        match self {
            Entry::Rule(rule) => Some(rule),
            Entry::Directive(_) => None,
        }
    }

    pub fn as_directive(&self) -> Option<&Directive> {
        match self {
            Entry::Rule(_) => None,
            Entry::Directive(directive) => Some(directive),
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, Entry::Directive(_))
    }

    pub fn arguments(&self) -> &[String] {
        match self {
            Entry::Rule(rule) => &rule.arguments,
            Entry::Directive(directive) => &directive.arguments,
        }
    }

    pub fn arguments_mut(&mut self) -> &mut Vec<String> {
        match self {
            Entry::Rule(rule) => &mut rule.arguments,
            Entry::Directive(directive) => &mut directive.arguments,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Entry::Rule(rule) => rule.comment.as_deref(),
            Entry::Directive(directive) => directive.comment.as_deref(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Entry::Rule(rule) => rule.line,
            Entry::Directive(directive) => directive.line,
        }
    }

    /// Field equality ignoring where the entry came from (line number and
    /// continuation flag).
    pub fn same_content(&self, other: &Entry) -> bool {
        match (self, other) {
            (Entry::Rule(a), Entry::Rule(b)) => {
                a.service == b.service
                    && a.category == b.category
                    && a.control == b.control
                    && a.module == b.module
                    && a.arguments == b.arguments
                    && a.comment == b.comment
            }
            (Entry::Directive(a), Entry::Directive(b)) => {
                a.kind == b.kind
                    && a.target == b.target
                    && a.arguments == b.arguments
                    && a.comment == b.comment
            }
            _ => false,
        }
    }
}

impl From<Rule> for Entry {
    fn from(rule: Rule) -> Self {
        Entry::Rule(rule)
    }
}

impl From<Directive> for Entry {
    fn from(directive: Directive) -> Self {
        Entry::Directive(directive)
    }
}
