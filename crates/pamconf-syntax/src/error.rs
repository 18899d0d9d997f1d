use thiserror::Error;

/// Errors raised while interpreting a single field.
///
/// These carry no position; the line parser attaches the line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("invalid module type '{0}'")]
    InvalidModuleType(String),
    #[error("invalid control type '{0}'")]
    InvalidControlType(String),
    #[error("malformed control '{token}': {reason}")]
    MalformedControl { token: String, reason: String },
}
