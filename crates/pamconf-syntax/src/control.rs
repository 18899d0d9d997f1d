//! # Control Field Syntax
//!
//! The control field decides how a module's result feeds into the stack. It
//! comes in two shapes:
//!
//! - **Simple**: one keyword such as `required` or `sufficient`.
//! - **Complex**: a bracketed list of `outcome=action` pairs, for example
//!   `[success=ok new_authtok_reqd=ok default=die]`. The action is either a
//!   keyword or a non-negative jump count.
//!
//! Either shape may carry a leading `-`, which asks PAM not to log a failure
//! to load the module.
//!
//! Outcome codes and actions that this crate does not know are kept verbatim
//! (`ReturnCode::Other`, `Action::Other`) so that rewriting a file never
//! changes a control it did not understand.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SyntaxError;

/// The six simple control keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKeyword {
    Required,
    Requisite,
    Sufficient,
    Optional,
    Include,
    Substack,
}

impl ControlKeyword {
    pub const ALL: [ControlKeyword; 6] = [
        ControlKeyword::Required,
        ControlKeyword::Requisite,
        ControlKeyword::Sufficient,
        ControlKeyword::Optional,
        ControlKeyword::Include,
        ControlKeyword::Substack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ControlKeyword::Required => "required",
            ControlKeyword::Requisite => "requisite",
            ControlKeyword::Sufficient => "sufficient",
            ControlKeyword::Optional => "optional",
            ControlKeyword::Include => "include",
            ControlKeyword::Substack => "substack",
        }
    }
}

impl FromStr for ControlKeyword {
    type Err = SyntaxError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let lowered = token.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|keyword| keyword.as_str() == lowered)
            .ok_or_else(|| SyntaxError::InvalidControlType(token.to_string()))
    }
}

impl fmt::Display for ControlKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! return_codes {
    ($($variant:ident => $text:literal,)*) => {
        /// Outcome codes usable as keys of a complex control.
        ///
        /// Ordered by their textual form so that maps keyed on them iterate
        /// lexicographically.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum ReturnCode {
            $($variant,)*
            /// An outcome code this crate does not recognise, kept verbatim.
            Other(String),
        }

        impl ReturnCode {
            pub fn as_str(&self) -> &str {
                match self {
                    $(ReturnCode::$variant => $text,)*
                    ReturnCode::Other(text) => text,
                }
            }
        }

        impl From<&str> for ReturnCode {
            fn from(text: &str) -> Self {
                match text {
                    $($text => ReturnCode::$variant,)*
                    other => ReturnCode::Other(other.to_string()),
                }
            }
        }
    };
}

return_codes! {
    Success => "success",
    OpenErr => "open_err",
    SymbolErr => "symbol_err",
    ServiceErr => "service_err",
    SystemErr => "system_err",
    BufErr => "buf_err",
    PermDenied => "perm_denied",
    AuthErr => "auth_err",
    CredInsufficient => "cred_insufficient",
    AuthinfoUnavail => "authinfo_unavail",
    UserUnknown => "user_unknown",
    Maxtries => "maxtries",
    NewAuthtokReqd => "new_authtok_reqd",
    AcctExpired => "acct_expired",
    SessionErr => "session_err",
    CredUnavail => "cred_unavail",
    CredExpired => "cred_expired",
    CredErr => "cred_err",
    NoModuleData => "no_module_data",
    ConvErr => "conv_err",
    AuthtokErr => "authtok_err",
    AuthtokRecoverErr => "authtok_recover_err",
    AuthtokLockBusy => "authtok_lock_busy",
    AuthtokDisableAging => "authtok_disable_aging",
    TryAgain => "try_again",
    Ignore => "ignore",
    Abort => "abort",
    AuthtokExpired => "authtok_expired",
    ModuleUnknown => "module_unknown",
    BadItem => "bad_item",
    ConvAgain => "conv_again",
    Incomplete => "incomplete",
    Default => "default",
}

impl From<String> for ReturnCode {
    fn from(text: String) -> Self {
        ReturnCode::from(text.as_str())
    }
}

impl From<ReturnCode> for String {
    fn from(code: ReturnCode) -> Self {
        code.as_str().to_string()
    }
}

impl Ord for ReturnCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for ReturnCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens when a module returns a given outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Ignore,
    Bad,
    Die,
    Ok,
    Done,
    Reset,
    /// Skip this many following modules.
    Jump(u32),
    /// An action keyword this crate does not recognise, kept verbatim.
    Other(String),
}

impl From<&str> for Action {
    fn from(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(count) = text.parse() {
                return Action::Jump(count);
            }
        }
        match text {
            "ignore" => Action::Ignore,
            "bad" => Action::Bad,
            "die" => Action::Die,
            "ok" => Action::Ok,
            "done" => Action::Done,
            "reset" => Action::Reset,
            other => Action::Other(other.to_string()),
        }
    }
}

impl From<String> for Action {
    fn from(text: String) -> Self {
        Action::from(text.as_str())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Ignore => f.write_str("ignore"),
            Action::Bad => f.write_str("bad"),
            Action::Die => f.write_str("die"),
            Action::Ok => f.write_str("ok"),
            Action::Done => f.write_str("done"),
            Action::Reset => f.write_str("reset"),
            Action::Jump(count) => write!(f, "{count}"),
            Action::Other(text) => f.write_str(text),
        }
    }
}

/// Outcome-to-action mapping of a complex control.
pub type ActionMap = BTreeMap<ReturnCode, Action>;

/// A parsed control field. Exactly one shape is ever populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Simple {
        keyword: ControlKeyword,
        suppress_log: bool,
    },
    Complex {
        actions: ActionMap,
        suppress_log: bool,
    },
}

impl Control {
    pub fn simple(keyword: ControlKeyword) -> Self {
        Control::Simple {
            keyword,
            suppress_log: false,
        }
    }

    pub fn complex(actions: impl IntoIterator<Item = (ReturnCode, Action)>) -> Self {
        Control::Complex {
            actions: actions.into_iter().collect(),
            suppress_log: false,
        }
    }

    /// Same control with the `-` marker set.
    pub fn suppressed(self) -> Self {
        match self {
            Control::Simple { keyword, .. } => Control::Simple {
                keyword,
                suppress_log: true,
            },
            Control::Complex { actions, .. } => Control::Complex {
                actions,
                suppress_log: true,
            },
        }
    }

    pub fn suppress_log(&self) -> bool {
        match self {
            Control::Simple { suppress_log, .. } | Control::Complex { suppress_log, .. } => {
                *suppress_log
            }
        }
    }

    pub fn keyword(&self) -> Option<ControlKeyword> {
        match self {
            Control::Simple { keyword, .. } => Some(*keyword),
            Control::Complex { .. } => None,
        }
    }

    pub fn actions(&self) -> Option<&ActionMap> {
        match self {
            Control::Simple { .. } => None,
            Control::Complex { actions, .. } => Some(actions),
        }
    }

    /// Parse a single control token.
    pub fn parse(token: &str) -> Result<Self, SyntaxError> {
        let (suppress_log, body) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };

        if let Some(inner) = body
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let actions = parse_action_map(token, inner)?;
            return Ok(Control::Complex {
                actions,
                suppress_log,
            });
        }

        let keyword = body
            .parse::<ControlKeyword>()
            .map_err(|_| SyntaxError::InvalidControlType(token.to_string()))?;
        Ok(Control::Simple {
            keyword,
            suppress_log,
        })
    }
}

fn parse_action_map(token: &str, inner: &str) -> Result<ActionMap, SyntaxError> {
    let malformed = |reason: String| SyntaxError::MalformedControl {
        token: token.to_string(),
        reason,
    };

    let mut actions = ActionMap::new();
    for pair in inner.split_whitespace() {
        if pair.matches('=').count() != 1 {
            return Err(malformed(format!("expected one '=' in '{pair}'")));
        }
        let Some((code, action)) = pair.split_once('=') else {
            return Err(malformed(format!("expected one '=' in '{pair}'")));
        };
        if code.is_empty() || action.is_empty() {
            return Err(malformed(format!("incomplete pair '{pair}'")));
        }
        if actions
            .insert(ReturnCode::from(code), Action::from(action))
            .is_some()
        {
            return Err(malformed(format!("duplicate outcome code '{code}'")));
        }
    }

    if actions.is_empty() {
        return Err(malformed("no outcome=action pairs".to_string()));
    }
    Ok(actions)
}

impl FromStr for Control {
    type Err = SyntaxError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Control::parse(token)
    }
}

impl fmt::Display for Control {
    /// Complex controls are written with keys in lexicographic order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.suppress_log() {
            f.write_str("-")?;
        }
        match self {
            Control::Simple { keyword, .. } => f.write_str(keyword.as_str()),
            Control::Complex { actions, .. } => {
                f.write_str("[")?;
                for (i, (code, action)) in actions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{code}={action}")?;
                }
                f.write_str("]")
            }
        }
    }
}
