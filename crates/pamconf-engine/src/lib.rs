//! # pamconf-engine
//!
//! Reads Linux PAM configuration files into a [`Configuration`], edits them
//! in place and writes them back out.
//!
//! ```text
//! text ──► Parser ──► Configuration ──► Writer ──► text
//!                          ▲
//!                        Editor
//! ```
//!
//! Both file layouts are supported: one file per service under
//! `/etc/pam.d` ([`Format::PerService`]) and the single `/etc/pam.conf`
//! where every rule starts with its service name ([`Format::MultiService`]).
//! The parser and writer never guess the format; [`io`] has the heuristics
//! for callers that only have a path.
//!
//! ```
//! use pamconf_engine::{Editor, Format, Parser, Writer};
//!
//! let mut config = Parser::new()
//!     .parse_str("session required pam_env.so\nauth required pam_unix.so\n", Format::PerService)
//!     .unwrap();
//!
//! Editor::new(&mut config).update_argument(1, "nullok", "1").unwrap();
//!
//! assert_eq!(
//!     Writer::new().write_string(&config),
//!     "auth required pam_unix.so nullok=1\n\nsession required pam_env.so\n"
//! );
//! ```

pub mod editor;
pub mod io;
pub mod model;
pub mod parser;
pub mod writer;

pub use editor::{EditError, Editor, ValidationWarning, filters};
pub use io::{FileManager, IoError};
pub use model::{Configuration, Directive, DirectiveKind, Entry, Format, Rule, grouped_order};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use writer::{ColumnWidths, Writer, WriterOptions, measure_columns};

pub use pamconf_syntax::{Action, Category, Control, ControlKeyword, ModuleClass, ReturnCode};
