use std::path::PathBuf;

use pamconf_syntax::ModuleClass;
use serde::{Deserialize, Serialize};

use super::entry::{Directive, Entry, Rule};

/// Which of the two PAM file layouts a configuration uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// One file per service (`/etc/pam.d/<service>`); lines have no service field.
    PerService,
    /// A single file for all services (`/etc/pam.conf`); every rule starts
    /// with its service name.
    MultiService,
}

/// A parsed PAM configuration file.
///
/// Owns all of its entries; cloning produces a fully independent copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub entries: Vec<Entry>,
    /// Standalone comment lines, without the leading `#`.
    pub comments: Vec<String>,
    pub format: Format,
    pub source: Option<PathBuf>,
}

impl Configuration {
    pub fn new(format: Format) -> Self {
        Self {
            entries: Vec::new(),
            comments: Vec::new(),
            format,
            source: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.entries.iter().filter_map(Entry::as_rule)
    }

    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.entries.iter().filter_map(Entry::as_directive)
    }

    /// Independent copy for handing across a thread or editing speculatively.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }
}

/// Indices of `entries` in grouped order.
///
/// Rules come first, grouped by category with the suppression marker
/// ignored, groups in [`ModuleClass::order`] order. Unknown classes follow,
/// one group per name in order of first appearance. Directives trail. The
/// relative order inside every group is preserved.
pub fn grouped_order(entries: &[Entry]) -> Vec<usize> {
    let mut unknown: Vec<&str> = Vec::new();
    let mut keys = Vec::with_capacity(entries.len());

    for entry in entries {
        let key = match entry {
            Entry::Directive(_) => (1u8, 0u8, 0usize),
            Entry::Rule(rule) => {
                let class = &rule.category.class;
                let rank = match class {
                    ModuleClass::Unknown(name) => {
                        match unknown.iter().position(|seen| *seen == name.as_str()) {
                            Some(rank) => rank,
                            None => {
                                unknown.push(name);
                                unknown.len() - 1
                            }
                        }
                    }
                    _ => 0,
                };
                (0, class.order(), rank)
            }
        };
        keys.push(key);
    }

    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| keys[i]);
    order
}
