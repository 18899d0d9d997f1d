pub mod configuration;
pub mod entry;

pub use configuration::{Configuration, Format, grouped_order};
pub use entry::{Directive, DirectiveKind, Entry, Rule};
