use tracing::debug;

use crate::relocator::ResourceMapping;

use super::dom::{Document, Node, NodePath};
use super::stylesheets::is_stylesheet_link;
use super::walker::{walk, Visit};

/// Points stylesheet links at their local copies
///
/// Every stylesheet link whose current `href` is a key of `mapping` gets
/// that attribute's value replaced with the mapped local name. The lookup
/// uses the href as written in the markup; links without a mapping entry
/// are left untouched. Returns the number of rewritten links.
pub fn rewrite_stylesheet_links(document: &mut Document, mapping: &ResourceMapping) -> usize {
    let mut rewritten = 0;

    walk(document, &mut |node: &mut Node, _: &NodePath| {
        if is_stylesheet_link(node) {
            let local_name = node
                .get_attr("href")
                .and_then(|href| mapping.get(href))
                .map(str::to_string);

            if let Some(local_name) = local_name {
                debug!("rewriting stylesheet link to {}", local_name);
                node.set_attr("href", &local_name);
                rewritten += 1;
            }
        }
        Visit::Continue
    });

    rewritten
}

/// Drops the `href` of every `<base>` element
///
/// Links rewritten to local names are relative to the saved document, so a
/// remote base would send the browser back to the original server. Other
/// attributes such as `target` are kept. Returns the number of elements
/// changed.
pub fn strip_base_href(document: &mut Document) -> usize {
    let mut stripped = 0;

    walk(document, &mut |node: &mut Node, _: &NodePath| {
        if node.has_tag("base") && node.remove_attr("href").is_some() {
            debug!("removing <base href> pointing away from local copies");
            stripped += 1;
        }
        Visit::Continue
    });

    stripped
}
