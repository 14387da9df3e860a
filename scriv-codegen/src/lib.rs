//! Structured source emission for the Scrivener generator.
//!
//! This crate turns "write this line / open this block / include this file"
//! calls into consistently indented files, one exclusively locked writer per
//! output path.
//!
//! # Module Organization
//!
//! - [`builder`] - The writer itself: [`CodeWriter`](builder::CodeWriter), scopes and dialects
//! - [`generation`] - Output sessions, options, writer registry and include sets
//! - [`testing`] - Test utilities (feature-gated)

pub mod builder;
pub mod generation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
