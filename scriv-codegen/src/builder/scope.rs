//! Indent, left-adjusted and prefix scopes.
//!
//! Every scope is recorded on a stack inside the writer when it opens and
//! verified against the writer's state when it closes. Scopes come in two
//! forms: closure methods such as [`CodeWriter::indent`], which always close
//! the scope, and `open_*` methods returning a [`ScopeToken`] that must be
//! handed back to [`CodeWriter::close_scope`].

use std::fmt;

use scrivener_core::{Error, Result};
use tracing::trace;

use super::{CodeWriter, Dialect};

/// The three kinds of scope a writer can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Indent,
    LeftAdjusted,
    Prefix,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indent => write!(f, "indent"),
            Self::LeftAdjusted => write!(f, "left-adjusted"),
            Self::Prefix => write!(f, "prefix"),
        }
    }
}

/// Proof that a scope was opened; consumed by [`CodeWriter::close_scope`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an open scope must be passed to `close_scope`"]
pub struct ScopeToken {
    id: u64,
    kind: ScopeKind,
}

impl ScopeToken {
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }
}

impl fmt::Display for ScopeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} scope #{}", self.kind, self.id)
    }
}

/// State recorded when a scope opens.
#[derive(Debug)]
pub(crate) enum ScopeFrame {
    Indent {
        id: u64,
        expected_level: usize,
        end_line: Option<String>,
    },
    LeftAdjusted {
        id: u64,
        expected_level: usize,
        end_line: String,
    },
    Prefix {
        id: u64,
        installed: String,
        previous: Option<String>,
    },
}

impl ScopeFrame {
    fn id(&self) -> u64 {
        match self {
            Self::Indent { id, .. } | Self::LeftAdjusted { id, .. } | Self::Prefix { id, .. } => {
                *id
            }
        }
    }

    fn kind(&self) -> ScopeKind {
        match self {
            Self::Indent { .. } => ScopeKind::Indent,
            Self::LeftAdjusted { .. } => ScopeKind::LeftAdjusted,
            Self::Prefix { .. } => ScopeKind::Prefix,
        }
    }

    fn describe(&self) -> String {
        format!("{} scope #{}", self.kind(), self.id())
    }
}

impl<D: Dialect> CodeWriter<D> {
    // =========================================================================
    // Closure form
    // =========================================================================

    /// Run `f` one indentation level deeper.
    pub fn indent<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let token = self.open_indent_scope(None, None)?;
        self.run_scope(token, f)
    }

    /// Write `start`, run `f` one level deeper, then write `end`.
    pub fn indent_scope<T>(
        &mut self,
        start: &str,
        end: &str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let token = self.open_indent_scope(Some(start), Some(end))?;
        self.run_scope(token, f)
    }

    /// Write `start` and `end` at column zero around `f`, leaving indentation untouched.
    pub fn left_adjusted_scope<T>(
        &mut self,
        start: &str,
        end: &str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let token = self.open_left_adjusted_scope(start, end)?;
        self.run_scope(token, f)
    }

    /// Run `f` with `prefix` inserted after the indentation of every line.
    pub fn prefix<T>(&mut self, prefix: &str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let token = self.open_prefix_scope(prefix)?;
        self.run_scope(token, f)
    }

    /// Run `f` and close `token` afterwards, whether `f` succeeded or not.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub(crate) fn run_scope<T>(
        &mut self,
        token: ScopeToken,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        match f(self) {
            Ok(value) => {
                self.close_scope(token)?;
                Ok(value)
            }
            Err(err) => {
                self.unwind_to(&token);
                if let Err(close_err) = self.close_scope(token) {
                    trace!(error = %close_err, "ignoring close error after failed scope body");
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // Explicit form
    // =========================================================================

    /// Optionally write `start`, then increase the indentation level.
    pub fn open_indent_scope(&mut self, start: Option<&str>, end: Option<&str>) -> Result<ScopeToken> {
        self.ensure_writable()?;
        if let Some(start) = start {
            self.write_line(start)?;
        }

        self.indent_level += 1;
        let id = self.next_id();
        self.scopes.push(ScopeFrame::Indent {
            id,
            expected_level: self.indent_level,
            end_line: end.map(str::to_string),
        });
        trace!(id, level = self.indent_level, "opened indent scope");

        Ok(ScopeToken {
            id,
            kind: ScopeKind::Indent,
        })
    }

    /// Write `start` at column zero; `end` follows at column zero on close.
    pub fn open_left_adjusted_scope(&mut self, start: &str, end: &str) -> Result<ScopeToken> {
        self.write_line_left_adjusted(start)?;

        let id = self.next_id();
        self.scopes.push(ScopeFrame::LeftAdjusted {
            id,
            expected_level: self.indent_level,
            end_line: end.to_string(),
        });
        trace!(id, "opened left-adjusted scope");

        Ok(ScopeToken {
            id,
            kind: ScopeKind::LeftAdjusted,
        })
    }

    /// Install `prefix` until the scope closes. Prefixes may not contain line breaks.
    pub fn open_prefix_scope(&mut self, prefix: &str) -> Result<ScopeToken> {
        self.ensure_writable()?;
        if prefix.contains(['\r', '\n']) {
            return Err(Error::PrefixContainsNewline {
                prefix: prefix.to_string(),
            });
        }

        let previous = self.prefix.replace(prefix.to_string());
        let id = self.next_id();
        self.scopes.push(ScopeFrame::Prefix {
            id,
            installed: prefix.to_string(),
            previous,
        });
        trace!(id, prefix, "opened prefix scope");

        Ok(ScopeToken {
            id,
            kind: ScopeKind::Prefix,
        })
    }

    /// Close the innermost scope, verifying it is the one `token` refers to
    /// and that the writer is back in the state recorded when it opened.
    pub fn close_scope(&mut self, token: ScopeToken) -> Result<()> {
        let Some(frame) = self.scopes.last() else {
            return Err(Error::ScopeMismatch {
                expected: "no open scope".to_string(),
                found: token.to_string(),
            });
        };
        if frame.id() != token.id {
            return Err(Error::ScopeMismatch {
                expected: frame.describe(),
                found: token.to_string(),
            });
        }

        match frame {
            ScopeFrame::Indent { expected_level, .. }
            | ScopeFrame::LeftAdjusted { expected_level, .. }
                if *expected_level != self.indent_level =>
            {
                return Err(Error::ScopeMismatch {
                    expected: format!("indent level {expected_level}"),
                    found: format!("indent level {}", self.indent_level),
                });
            }
            ScopeFrame::Prefix { installed, .. }
                if self.prefix.as_deref() != Some(installed.as_str()) =>
            {
                return Err(Error::ScopeMismatch {
                    expected: format!("prefix {installed:?}"),
                    found: format!("prefix {:?}", self.prefix),
                });
            }
            _ => {}
        }

        let Some(frame) = self.scopes.pop() else {
            return Ok(());
        };
        trace!(id = token.id, kind = %token.kind, "closing scope");

        match frame {
            ScopeFrame::Indent { end_line, .. } => {
                self.indent_level -= 1;
                if let Some(end) = end_line {
                    self.write_line(&end)?;
                }
            }
            ScopeFrame::LeftAdjusted { end_line, .. } => {
                self.write_line_left_adjusted(&end_line)?;
            }
            ScopeFrame::Prefix { previous, .. } => {
                self.prefix = previous;
            }
        }
        Ok(())
    }

    /// Drop scopes nested inside `token` that a failed body left open,
    /// restoring the state they captured without writing their end lines.
    fn unwind_to(&mut self, token: &ScopeToken) {
        if !self.scopes.iter().any(|frame| frame.id() == token.id) {
            return;
        }

        while let Some(frame) = self.scopes.last() {
            if frame.id() == token.id {
                break;
            }
            let Some(frame) = self.scopes.pop() else {
                break;
            };
            match frame {
                ScopeFrame::Indent { expected_level, .. } => {
                    self.indent_level = expected_level - 1;
                }
                ScopeFrame::LeftAdjusted { expected_level, .. } => {
                    self.indent_level = expected_level;
                }
                ScopeFrame::Prefix { previous, .. } => {
                    self.prefix = previous;
                }
            }
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_scope_id;
        self.next_scope_id += 1;
        id
    }
}
