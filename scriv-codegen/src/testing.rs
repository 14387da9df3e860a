//! Test utilities for code generators.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::{path::Path, sync::Once};

use eyre::Result;

static TRACING_INIT: Once = Once::new();

/// Install a fmt subscriber filtered by `RUST_LOG`, once per process.
///
/// Does nothing when `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer().with_target(true))
                .with(filter)
                .try_init();
        }
    });
}

/// Assert that two strings are equal, with a line diff on failure.
pub fn assert_content_eq(expected: &str, actual: &str) {
    if expected == actual {
        return;
    }

    let expected_lines: Vec<&str> = expected.split('\n').collect();
    let actual_lines: Vec<&str> = actual.split('\n').collect();

    let mut diff = String::new();
    let max_lines = expected_lines.len().max(actual_lines.len());

    for i in 0..max_lines {
        let exp = expected_lines.get(i).copied();
        let act = actual_lines.get(i).copied();

        if exp != act {
            diff.push_str(&format!("Line {}:\n", i + 1));
            diff.push_str(&format!("  expected: {}\n", show(exp)));
            diff.push_str(&format!("  actual:   {}\n", show(act)));
        }
    }

    panic!("Content mismatch:\n{}", diff);
}

fn show(line: Option<&str>) -> String {
    match line {
        Some(line) => format!("{line:?}"),
        None => "<missing>".to_string(),
    }
}

/// Run `generate` against a fresh temporary directory and return it.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn write_to_temp<F>(generate: F) -> Result<tempfile::TempDir>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let temp_dir = tempfile::TempDir::new()?;
    generate(temp_dir.path())?;
    Ok(temp_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_content_passes() {
        assert_content_eq("a\nb\n", "a\nb\n");
    }

    #[test]
    #[should_panic(expected = "Line 2")]
    fn test_mismatch_reports_line() {
        assert_content_eq("a\nb\n", "a\nc\n");
    }

    #[test]
    #[should_panic(expected = "<missing>")]
    fn test_trailing_newline_difference() {
        assert_content_eq("a\nb", "a\nb\n\n");
    }

    #[test]
    fn test_write_to_temp() {
        init_tracing();
        let temp = write_to_temp(|dir| {
            std::fs::write(dir.join("x.txt"), "x")?;
            Ok(())
        })
        .unwrap();

        assert!(temp.path().join("x.txt").exists());
    }
}
