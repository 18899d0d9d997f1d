//! # pamconf-syntax
//!
//! Field-level syntax of Linux PAM configuration lines: the tokenizer and
//! the small vocabularies that individual fields are parsed into.
//!
//! ## Architecture Overview
//!
//! ```text
//! logical line → lexer → [Word | Bracketed | Comment] fields
//!                           │
//!                           ├── category  (auth, -session, ...)
//!                           ├── control   (required, [success=ok default=bad])
//!                           └── arguments (nullok, [query=SELECT * ...])
//! ```
//!
//! Assembling fields into rules, handling continuation lines and deciding
//! which field is which belongs to `pamconf-engine`. Everything in this crate
//! works on a single token or a single already-folded line.
//!
//! ## Quick Start
//!
//! ```
//! use pamconf_syntax::{Category, Control, ModuleClass, parse_arguments, tokenize};
//!
//! let tokens = tokenize("-session optional pam_systemd.so [a b]");
//! let category: Category = tokens[0].text.parse().unwrap();
//! assert_eq!(category, Category::negated(ModuleClass::Session));
//!
//! let control = Control::parse(tokens[1].text).unwrap();
//! assert_eq!(control.to_string(), "optional");
//!
//! assert_eq!(parse_arguments(tokens[3].text), vec!["a b"]);
//! ```

pub mod arguments;
pub mod category;
pub mod control;
pub mod error;
pub mod lexer;

pub use arguments::{format_argument, format_arguments, needs_brackets, parse_arguments};
pub use category::{Category, ModuleClass};
pub use control::{Action, ActionMap, Control, ControlKeyword, ReturnCode};
pub use error::SyntaxError;
pub use lexer::{Token, TokenKind, tokenize, tokenize_with_spans};
