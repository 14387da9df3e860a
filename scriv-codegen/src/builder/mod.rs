//! Writer building blocks.
//!
//! - [`CodeWriter`] - Buffered, indentation-aware writer bound to one output file
//! - [`ScopeToken`] - Handle for explicitly opened indent, left-adjusted and prefix scopes
//! - [`Dialect`] - Language family hooks, with [`PlainText`], [`CLike`] and [`Cpp`] built in
//! - [`Indent`] - Indentation configuration

mod code_writer;
mod dialect;
mod indent;
mod scope;

pub use code_writer::{CodeWriter, WriterSettings};
pub use dialect::{
    BraceLanguage, CLike, CLikeCodeWriter, Cpp, CppCodeWriter, Dialect, PlainText,
    PlainTextWriter,
};
pub use indent::Indent;
pub use scope::{ScopeKind, ScopeToken};
