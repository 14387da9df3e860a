//! Core primitives for the Scrivener source emitter.
//!
//! This crate provides the error model, file encodings, path helpers and the
//! exclusive [`OutputFile`] slot that every generated file is written through.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod encoding;
mod error;
mod file;
pub mod paths;

pub use encoding::{FileFormat, LineEnding, TextEncoding};
pub use error::{Error, Result};
pub use file::OutputFile;
