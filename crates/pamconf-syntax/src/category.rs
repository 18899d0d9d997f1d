//! Module categories (the `type` column of a PAM rule).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SyntaxError;

/// The module class a rule belongs to.
///
/// `Unknown` is never produced by parsing; it exists so that callers
/// constructing rules by hand can carry categories the parser does not know,
/// and so grouping has somewhere to put them (always last).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleClass {
    Account,
    Auth,
    Password,
    Session,
    SessionNoninteractive,
    Unknown(String),
}

impl ModuleClass {
    /// The known classes in grouping order.
    pub const KNOWN: [ModuleClass; 5] = [
        ModuleClass::Account,
        ModuleClass::Auth,
        ModuleClass::Password,
        ModuleClass::Session,
        ModuleClass::SessionNoninteractive,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ModuleClass::Account => "account",
            ModuleClass::Auth => "auth",
            ModuleClass::Password => "password",
            ModuleClass::Session => "session",
            ModuleClass::SessionNoninteractive => "session-noninteractive",
            ModuleClass::Unknown(name) => name,
        }
    }

    /// Position in the grouping order. Unknown classes sort last.
    pub fn order(&self) -> u8 {
        match self {
            ModuleClass::Account => 0,
            ModuleClass::Auth => 1,
            ModuleClass::Password => 2,
            ModuleClass::Session => 3,
            ModuleClass::SessionNoninteractive => 4,
            ModuleClass::Unknown(_) => 5,
        }
    }

    fn known(name: &str) -> Option<Self> {
        Self::KNOWN.into_iter().find(|class| class.as_str() == name)
    }
}

impl fmt::Display for ModuleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule category: a module class plus the optional `-` suppression marker.
///
/// `-auth` and `auth` group together but are distinct values; the marker is
/// preserved through parse and write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub class: ModuleClass,
    pub negated: bool,
}

impl Category {
    pub fn new(class: ModuleClass) -> Self {
        Self {
            class,
            negated: false,
        }
    }

    pub fn negated(class: ModuleClass) -> Self {
        Self {
            class,
            negated: true,
        }
    }

    pub fn order(&self) -> u8 {
        self.class.order()
    }

    /// The category with the suppression marker stripped, used for grouping.
    pub fn normalized(&self) -> &ModuleClass {
        &self.class
    }

    /// True when `token` names a known category, with or without the marker.
    pub fn is_valid(token: &str) -> bool {
        token.parse::<Category>().is_ok()
    }
}

impl From<ModuleClass> for Category {
    fn from(class: ModuleClass) -> Self {
        Self::new(class)
    }
}

impl FromStr for Category {
    type Err = SyntaxError;

    /// Case-insensitive; only the five known classes are accepted.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let lowered = token.to_lowercase();
        let (negated, name) = match lowered.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, lowered.as_str()),
        };

        ModuleClass::known(name)
            .map(|class| Category { class, negated })
            .ok_or_else(|| SyntaxError::InvalidModuleType(token.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("-")?;
        }
        f.write_str(self.class.as_str())
    }
}
