//! # Parsers
//!
//! - `html` - document parsing, traversal, rewriting and serialization

pub mod html;

// Re-export commonly used items for convenience
pub use html::{
    discover_stylesheets, html_to_dom, rewrite_stylesheet_links, serialize_document,
    strip_scripts, walk, Document,
};
