//! # Editor - In-place changes to a [`Configuration`]
//!
//! The editor borrows a configuration mutably and keeps its entry sequence
//! grouped as long as entries are added with [`Editor::add_entry`]: rules go
//! after the last rule of the same or an earlier category, directives go to
//! the end. Positional inserts ([`Editor::insert_at`], [`Editor::insert_before`],
//! [`Editor::insert_after`]) skip that and put the entry exactly where asked.
//!
//! Every failing operation returns before touching the model.

pub mod filters;

use std::fmt;

use pamconf_syntax::{Control, ModuleClass};
use thiserror::Error;

use crate::io::service_name_for_path;
use crate::model::{Configuration, Entry, Format, grouped_order};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no entry matches")]
    NoMatch,
    #[error("entry {0} is a directive, not a rule")]
    NotARule(usize),
}

/// Structural problems that do not stop a configuration from being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    UnknownCategory { index: usize, name: String },
    EmptyModule { index: usize },
    MissingService { index: usize },
    ServiceMismatch {
        index: usize,
        service: String,
        expected: String,
    },
    EmptyIncludeTarget { index: usize },
}

impl ValidationWarning {
    pub fn index(&self) -> usize {
        match self {
            ValidationWarning::UnknownCategory { index, .. }
            | ValidationWarning::EmptyModule { index }
            | ValidationWarning::MissingService { index }
            | ValidationWarning::ServiceMismatch { index, .. }
            | ValidationWarning::EmptyIncludeTarget { index } => *index,
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::UnknownCategory { index, name } => {
                write!(f, "entry {index}: unknown module type '{name}'")
            }
            ValidationWarning::EmptyModule { index } => {
                write!(f, "entry {index}: missing module path")
            }
            ValidationWarning::MissingService { index } => {
                write!(f, "entry {index}: missing service field in pam.conf format")
            }
            ValidationWarning::ServiceMismatch {
                index,
                service,
                expected,
            } => write!(
                f,
                "entry {index}: service '{service}' does not match file service '{expected}'"
            ),
            ValidationWarning::EmptyIncludeTarget { index } => {
                write!(f, "entry {index}: @include directive missing target")
            }
        }
    }
}

pub struct Editor<'a> {
    config: &'a mut Configuration,
}

impl<'a> Editor<'a> {
    pub fn new(config: &'a mut Configuration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Configuration {
        self.config
    }

    /// Independent copy of the configuration as it stands.
    pub fn snapshot(&self) -> Configuration {
        self.config.deep_copy()
    }

    /// Indices of all entries matching `filter`, in order.
    pub fn find(&self, filter: impl Fn(&Entry) -> bool) -> Vec<usize> {
        self.config
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| filter(entry))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn get(&self, index: usize) -> Result<&Entry, EditError> {
        let len = self.config.entries.len();
        self.config
            .entries
            .get(index)
            .ok_or(EditError::IndexOutOfRange { index, len })
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut Entry, EditError> {
        let len = self.config.entries.len();
        self.config
            .entries
            .get_mut(index)
            .ok_or(EditError::IndexOutOfRange { index, len })
    }

    /// Add an entry at its grouped position and return where it landed.
    ///
    /// A rule lands right after the last rule whose category sorts at or
    /// before its own, or at the front when there is none. Directives are
    /// appended.
    pub fn add_entry(&mut self, entry: impl Into<Entry>) -> usize {
        let entry = entry.into();
        let entries = &mut self.config.entries;

        let position = match &entry {
            Entry::Directive(_) => entries.len(),
            Entry::Rule(rule) => {
                let order = rule.category.order();
                entries
                    .iter()
                    .rposition(|existing| {
                        existing
                            .as_rule()
                            .is_some_and(|r| r.category.order() <= order)
                    })
                    .map_or(0, |i| i + 1)
            }
        };

        log::debug!("adding entry at {position}");
        entries.insert(position, entry);
        position
    }

    /// Insert at `index`; `index == len` appends.
    pub fn insert_at(&mut self, index: usize, entry: impl Into<Entry>) -> Result<(), EditError> {
        let len = self.config.entries.len();
        if index > len {
            return Err(EditError::IndexOutOfRange { index, len });
        }
        log::debug!("inserting entry at {index}");
        self.config.entries.insert(index, entry.into());
        Ok(())
    }

    /// Insert directly before the first entry matching `filter`.
    pub fn insert_before(
        &mut self,
        entry: impl Into<Entry>,
        filter: impl Fn(&Entry) -> bool,
    ) -> Result<usize, EditError> {
        let index = self
            .config
            .entries
            .iter()
            .position(|e| filter(e))
            .ok_or(EditError::NoMatch)?;
        self.insert_at(index, entry)?;
        Ok(index)
    }

    /// Insert directly after the last entry matching `filter`.
    pub fn insert_after(
        &mut self,
        entry: impl Into<Entry>,
        filter: impl Fn(&Entry) -> bool,
    ) -> Result<usize, EditError> {
        let index = self
            .config
            .entries
            .iter()
            .rposition(|e| filter(e))
            .ok_or(EditError::NoMatch)?
            + 1;
        self.insert_at(index, entry)?;
        Ok(index)
    }

    /// Replace the entry at `index`, returning the old one.
    pub fn update_at(&mut self, index: usize, entry: impl Into<Entry>) -> Result<Entry, EditError> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::replace(slot, entry.into()))
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Entry, EditError> {
        self.get(index)?;
        log::debug!("removing entry {index}");
        Ok(self.config.entries.remove(index))
    }

    /// Remove every entry matching `filter` and return how many went.
    pub fn remove_matching(&mut self, filter: impl Fn(&Entry) -> bool) -> usize {
        let before = self.config.entries.len();
        self.config.entries.retain(|entry| !filter(entry));
        let removed = before - self.config.entries.len();
        if removed > 0 {
            log::debug!("removed {removed} entries");
        }
        removed
    }

    /// Move the entry at `from` so that it ends up at index `to`.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        let len = self.config.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(EditError::IndexOutOfRange { index, len });
            }
        }
        if from != to {
            let entry = self.config.entries.remove(from);
            self.config.entries.insert(to, entry);
            log::debug!("moved entry {from} to {to}");
        }
        Ok(())
    }

    /// Set `name=value`, replacing an existing `name` or `name=...`
    /// argument, or appending when there is none.
    pub fn update_argument(&mut self, index: usize, name: &str, value: &str) -> Result<(), EditError> {
        let arguments = self.get_mut(index)?.arguments_mut();
        let replacement = format!("{name}={value}");
        match arguments.iter_mut().find(|arg| argument_named(arg, name)) {
            Some(arg) => *arg = replacement,
            None => arguments.push(replacement),
        }
        Ok(())
    }

    /// Drop every `name` and `name=...` argument.
    pub fn remove_argument(&mut self, index: usize, name: &str) -> Result<(), EditError> {
        self.get_mut(index)?
            .arguments_mut()
            .retain(|arg| !argument_named(arg, name));
        Ok(())
    }

    pub fn set_control(&mut self, index: usize, control: Control) -> Result<(), EditError> {
        let rule = self
            .get_mut(index)?
            .as_rule_mut()
            .ok_or(EditError::NotARule(index))?;
        rule.control = control;
        Ok(())
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.config.comments.push(comment.into());
    }

    /// Regroup rules by category, keeping the relative order inside each
    /// group, and move directives to the end.
    pub fn sort_by_category(&mut self) {
        let order = grouped_order(&self.config.entries);
        let mut slots: Vec<Option<Entry>> = std::mem::take(&mut self.config.entries)
            .into_iter()
            .map(Some)
            .collect();
        self.config.entries = order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        log::debug!("sorted {} entries by category", self.config.entries.len());
    }

    pub fn validate(&self) -> Vec<ValidationWarning> {
        let expected = match self.config.format {
            Format::PerService => self
                .config
                .source
                .as_deref()
                .and_then(service_name_for_path),
            Format::MultiService => None,
        };

        let mut warnings = Vec::new();
        for (index, entry) in self.config.entries.iter().enumerate() {
            let rule = match entry {
                Entry::Directive(directive) => {
                    if directive.target.trim().is_empty() {
                        warnings.push(ValidationWarning::EmptyIncludeTarget { index });
                    }
                    continue;
                }
                Entry::Rule(rule) => rule,
            };

            if let ModuleClass::Unknown(name) = &rule.category.class {
                warnings.push(ValidationWarning::UnknownCategory {
                    index,
                    name: name.clone(),
                });
            }
            if rule.module.trim().is_empty() {
                warnings.push(ValidationWarning::EmptyModule { index });
            }

            let service = rule.service.as_deref().filter(|s| !s.is_empty());
            match (self.config.format, service, expected.as_deref()) {
                (Format::MultiService, None, _) => {
                    warnings.push(ValidationWarning::MissingService { index });
                }
                (Format::PerService, Some(service), Some(expected)) if service != expected => {
                    warnings.push(ValidationWarning::ServiceMismatch {
                        index,
                        service: service.to_string(),
                        expected: expected.to_string(),
                    });
                }
                _ => {}
            }
        }
        warnings
    }
}

fn argument_named(arg: &str, name: &str) -> bool {
    arg == name
        || arg
            .strip_prefix(name)
            .is_some_and(|rest| rest.starts_with('='))
}
