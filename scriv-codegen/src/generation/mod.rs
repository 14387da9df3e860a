//! Output sessions and the collections that feed them.
//!
//! - [`OutputSession`] - Hands out writers under a base directory and keeps the file log
//! - [`SessionOptions`] - Session configuration, loadable from TOML
//! - [`WriterRegistry`] - Writer factories keyed by kind name
//! - [`IncludeSet`] - Include path tracking and ordering

mod includes;
mod options;
mod registry;
mod session;

pub use includes::{IncludeOrder, IncludeSet};
pub use options::SessionOptions;
pub use registry::{OutputWriter, WriterRegistry};
pub use session::{FILE_LOG_NAME, OutputSession};
