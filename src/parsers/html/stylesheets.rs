use super::dom::{Document, Node, NodePath};

/// A `<link rel="stylesheet">` element found in the document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StylesheetLink {
    /// Where the element sits in the tree
    pub path: NodePath,
    /// The `href` value exactly as written in the markup
    pub href: String,
}

/// Checks whether a node is a `<link>` referencing a stylesheet
///
/// `rel` must be exactly `stylesheet` (ignoring case and surrounding
/// whitespace) and `href` must not be blank.
pub fn is_stylesheet_link(node: &Node) -> bool {
    node.has_tag("link")
        && node
            .get_attr("rel")
            .map_or(false, |rel| rel.trim().eq_ignore_ascii_case("stylesheet"))
        && node
            .get_attr("href")
            .map_or(false, |href| !href.trim().is_empty())
}

/// Lists every stylesheet link in document order
pub fn discover_stylesheets(document: &Document) -> Vec<StylesheetLink> {
    document
        .traverse()
        .filter(|(_, node)| is_stylesheet_link(node))
        .filter_map(|(path, node)| {
            node.get_attr("href").map(|href| StylesheetLink {
                path,
                href: href.to_string(),
            })
        })
        .collect()
}
