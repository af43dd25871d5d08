//! # Utilities
//!
//! - `url` - reference resolution, URL cleanup and local file name derivation

pub mod url;

// Re-export commonly used items for convenience
pub use url::{clean_url, file_name_from_href, resolve_url, Url, FALLBACK_FILE_NAME};
