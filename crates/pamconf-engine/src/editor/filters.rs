//! Entry predicates for [`Editor`](super::Editor) lookups.
//!
//! Rule-only predicates never match a directive.

use pamconf_syntax::{Category, ControlKeyword, ModuleClass};

use crate::model::Entry;

pub type Filter = Box<dyn Fn(&Entry) -> bool>;

/// Rules owned by `service`, compared case-insensitively.
pub fn by_service(service: impl Into<String>) -> impl Fn(&Entry) -> bool {
    let service = service.into();
    move |entry| {
        entry
            .as_rule()
            .and_then(|rule| rule.service.as_deref())
            .is_some_and(|s| s.eq_ignore_ascii_case(&service))
    }
}

/// Rules with exactly this category, suppression marker included.
pub fn by_category(category: Category) -> impl Fn(&Entry) -> bool {
    move |entry| entry.as_rule().is_some_and(|rule| rule.category == category)
}

/// Rules of this class, with or without the suppression marker.
pub fn by_class(class: ModuleClass) -> impl Fn(&Entry) -> bool {
    move |entry| {
        entry
            .as_rule()
            .is_some_and(|rule| *rule.category.normalized() == class)
    }
}

/// Rules whose module reference contains `fragment`.
pub fn by_module(fragment: impl Into<String>) -> impl Fn(&Entry) -> bool {
    let fragment = fragment.into();
    move |entry| {
        entry
            .as_rule()
            .is_some_and(|rule| rule.module.contains(fragment.as_str()))
    }
}

/// Rules with this simple control keyword. Complex controls never match.
pub fn by_control(keyword: ControlKeyword) -> impl Fn(&Entry) -> bool {
    move |entry| {
        entry
            .as_rule()
            .is_some_and(|rule| rule.control.keyword() == Some(keyword))
    }
}

pub fn is_directive() -> impl Fn(&Entry) -> bool {
    Entry::is_directive
}

/// Matches when every filter matches. An empty list matches everything.
pub fn all_of(filters: Vec<Filter>) -> impl Fn(&Entry) -> bool {
    move |entry| filters.iter().all(|filter| filter(entry))
}
