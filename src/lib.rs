//! # pagesnap
//!
//! Saves a web page for offline viewing: the document itself plus local
//! copies of the stylesheets it links to, with the links rewritten to
//! point at those copies and, optionally, scripts removed.
//!
//! ## Modules
//!
//! - `core` - the snapshot entry point and its options
//! - `parsers` - the document tree and the passes run over it
//! - `relocator` - fetching and saving stylesheets
//! - `network` - HTTP and local file access
//! - `storage` - saving resources into a directory
//! - `env` - environment variable configuration
//! - `utils` - URL helpers

pub mod core;
pub mod env;
pub mod network;
pub mod parsers;
pub mod relocator;
pub mod storage;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::core::{create_snapshot, Snapshot, SnapshotError, SnapshotOptions};
pub use network::{Session, SessionError, SessionOptions};
pub use parsers::*;
pub use relocator::{
    CancellationToken, Fetch, FetchError, Persist, PersistError, ResourceMapping, SkipReason,
    SkippedResource,
};
pub use storage::DirectorySink;
