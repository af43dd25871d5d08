//! HTML parsing and tree manipulation
//!
//! - `dom`: the owned document tree and the parser entry point
//! - `walker`: depth-first traversal with removal support
//! - `stylesheets`: discovery of `<link rel="stylesheet">` elements
//! - `rewriter`: pointing stylesheet links at local copies
//! - `scripts`: removal of `<script>` elements
//! - `metadata`: base URL, charset and the "saved from" comment
//! - `serializer`: rendering the tree back into markup

pub mod dom;
pub mod metadata;
pub mod rewriter;
pub mod scripts;
pub mod serializer;
pub mod stylesheets;
pub mod walker;

pub use dom::{html_to_dom, Attribute, Document, Node, NodeData, NodePath, TreeError};
pub use metadata::{create_metadata_tag, get_base_url, get_charset, parse_content_type};
pub use rewriter::{rewrite_stylesheet_links, strip_base_href};
pub use scripts::strip_scripts;
pub use serializer::{encode_output, serialize_document};
pub use stylesheets::{discover_stylesheets, is_stylesheet_link, StylesheetLink};
pub use walker::{walk, Traverse, Visit, Visitor};
