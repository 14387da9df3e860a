use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for writer and session operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("cannot write to a code writer after it has been finished")]
    #[diagnostic(code(scrivener::write_after_finish))]
    WriteAfterFinish,

    #[error("code writer for '{}' was already finished", path.display())]
    #[diagnostic(code(scrivener::already_finished))]
    AlreadyFinished { path: PathBuf },

    #[error("{depth} scope(s) are still open while finishing '{}'", path.display())]
    #[diagnostic(
        code(scrivener::unclosed_scopes),
        help("every opened indent, prefix or left-adjusted scope must be closed before finish()")
    )]
    UnclosedScopes { path: PathBuf, depth: usize },

    #[error("scope closed out of order: expected {expected}, found {found}")]
    #[diagnostic(
        code(scrivener::scope_mismatch),
        help("scopes nest strictly; close the innermost scope first")
    )]
    ScopeMismatch { expected: String, found: String },

    #[error("cannot {operation} when the current line already contains text")]
    #[diagnostic(code(scrivener::line_not_empty))]
    LineNotEmpty { operation: &'static str },

    #[error("line prefix {prefix:?} must not contain line breaks")]
    #[diagnostic(code(scrivener::prefix_newline))]
    PrefixContainsNewline { prefix: String },

    #[error("'{}' is locked by another writer", path.display())]
    #[diagnostic(
        code(scrivener::path_locked),
        help("two generator tasks are targeting the same output file")
    )]
    PathLocked {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' was already written during this session", path.display())]
    #[diagnostic(
        code(scrivener::output_conflict),
        help("enable `auto_rename_conflicting_files` or give each output a unique name")
    )]
    OutputConflict { path: PathBuf },

    #[error("no writer factory is registered for kind '{kind}'")]
    #[diagnostic(code(scrivener::unknown_writer_kind))]
    UnknownWriterKind { kind: String },

    #[error("I/O error on '{}'", path.display())]
    #[diagnostic(code(scrivener::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse session options from '{file}'")]
    #[diagnostic(code(scrivener::config))]
    Config {
        file: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a TOML error with the source text it came from.
    pub fn config(source: toml::de::Error, content: &str, file: &str) -> Self {
        let span = source.span().map(SourceSpan::from);
        Error::Config {
            file: file.to_string(),
            src: NamedSource::new(file, content.to_string()),
            span,
            source,
        }
    }

    /// Returns true if this error signals a bug in the calling generator rather
    /// than a problem with the environment.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::WriteAfterFinish
                | Error::AlreadyFinished { .. }
                | Error::UnclosedScopes { .. }
                | Error::ScopeMismatch { .. }
                | Error::LineNotEmpty { .. }
                | Error::PrefixContainsNewline { .. }
                | Error::PathLocked { .. }
                | Error::OutputConflict { .. }
                | Error::UnknownWriterKind { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violations() {
        assert!(Error::WriteAfterFinish.is_contract_violation());
        assert!(
            Error::PrefixContainsNewline {
                prefix: "a\nb".into()
            }
            .is_contract_violation()
        );

        let io = Error::io("out.h", std::io::Error::other("disk full"));
        assert!(!io.is_contract_violation());
    }

    #[test]
    fn test_display_includes_path() {
        let err = Error::OutputConflict {
            path: PathBuf::from("gen/Test.txt"),
        };
        assert_eq!(
            err.to_string(),
            "'gen/Test.txt' was already written during this session"
        );
    }

    #[test]
    fn test_config_error_keeps_span() {
        let content = "indent = [\n";
        let source = toml::from_str::<toml::Value>(content).unwrap_err();
        let err = Error::config(source, content, "scrivener.toml");

        assert!(!err.is_contract_violation());
        assert_eq!(
            err.to_string(),
            "failed to parse session options from 'scrivener.toml'"
        );
        assert!(matches!(err, Error::Config { span: Some(_), .. }));
    }
}
