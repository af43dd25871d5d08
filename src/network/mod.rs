//! # Network
//!
//! - `session` - HTTP client and local file access used to load the page
//!   and its stylesheets

pub mod session;

// Re-export commonly used items for convenience
pub use session::{Session, SessionError, SessionOptions};
