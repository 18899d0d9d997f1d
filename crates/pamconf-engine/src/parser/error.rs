use pamconf_syntax::SyntaxError;
use thiserror::Error;

/// What went wrong on a line, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid module type '{0}'")]
    InvalidModuleType(String),
    #[error("invalid control type '{0}'")]
    InvalidControlType(String),
    #[error("malformed control '{token}': {reason}")]
    MalformedControl { token: String, reason: String },
    /// Many-services format only. Blank and comment-only lines never reach
    /// rule parsing, so the line parser keeps this as a guard; a line with
    /// too few fields reports the next missing field instead.
    #[error("missing service field")]
    MissingServiceField,
    #[error("missing module type")]
    MissingModuleType,
    #[error("missing control field")]
    MissingControlField,
    #[error("missing module path")]
    MissingModulePath,
    #[error("@{0} directive missing target")]
    MissingDirectiveTarget(String),
    #[error("unknown directive type '@{0}'")]
    UnknownDirective(String),
    #[error("empty directive")]
    EmptyDirective,
}

impl From<SyntaxError> for ParseErrorKind {
    fn from(err: SyntaxError) -> Self {
        match err {
            SyntaxError::InvalidModuleType(token) => ParseErrorKind::InvalidModuleType(token),
            SyntaxError::InvalidControlType(token) => ParseErrorKind::InvalidControlType(token),
            SyntaxError::MalformedControl { token, reason } => {
                ParseErrorKind::MalformedControl { token, reason }
            }
        }
    }
}

/// A failure that aborted parsing. Nothing is returned alongside it.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: {kind}")]
    Syntax { line: usize, kind: ParseErrorKind },
    #[error("failed to read line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// 1-based line number the failure was detected on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax { line, .. } | ParseError::Io { line, .. } => *line,
        }
    }

    pub fn kind(&self) -> Option<&ParseErrorKind> {
        match self {
            ParseError::Syntax { kind, .. } => Some(kind),
            ParseError::Io { .. } => None,
        }
    }
}
