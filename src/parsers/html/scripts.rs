use super::dom::{Document, Node, NodePath};
use super::walker::{walk, Visit};

/// Detaches every `<script>` element from the document
///
/// Inline event handler attributes on other elements are left alone.
/// Returns the number of removed elements.
pub fn strip_scripts(document: &mut Document) -> usize {
    let mut removed = 0;

    walk(document, &mut |node: &mut Node, _: &NodePath| {
        if node.has_tag("script") {
            removed += 1;
            Visit::Remove
        } else {
            Visit::Continue
        }
    });

    removed
}
