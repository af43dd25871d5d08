//! Depth-first traversal of the document tree
//!
//! Two flavours are provided:
//!
//! - [`walk`] hands every node to a [`Visitor`] which may edit its
//!   attributes or ask for the node to be detached from its parent.
//! - [`Document::traverse`] is a read-only pre-order iterator.
//!
//! Both visit nodes in document order, each node exactly once.

use tracing::debug;

use super::dom::{Document, Node, NodePath};

/// What the walker should do after a node has been visited
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Carry on into the node's children
    Continue,
    /// Keep the node but do not descend into it
    SkipChildren,
    /// Detach the node (and its subtree) from its parent
    Remove,
}

/// Callback invoked by [`walk`] for every node
pub trait Visitor {
    fn visit(&mut self, node: &mut Node, path: &NodePath) -> Visit;
}

impl<F> Visitor for F
where
    F: FnMut(&mut Node, &NodePath) -> Visit,
{
    fn visit(&mut self, node: &mut Node, path: &NodePath) -> Visit {
        self(node, path)
    }
}

/// Walks the whole document in pre-order
///
/// Removal is safe mid-walk: once a node is detached, the sibling that
/// slides into its slot is the next one visited, so no sibling is skipped
/// or visited twice. The root cannot be removed.
pub fn walk<V: Visitor + ?Sized>(document: &mut Document, visitor: &mut V) {
    let mut path = NodePath::root();

    match visitor.visit(&mut document.root, &path) {
        Visit::Continue => walk_children(&mut document.root, &mut path, visitor),
        Visit::SkipChildren => {}
        Visit::Remove => debug!("ignoring request to remove the document root"),
    }
}

fn walk_children<V: Visitor + ?Sized>(node: &mut Node, path: &mut NodePath, visitor: &mut V) {
    let mut i = 0;

    while i < node.children.len() {
        path.push(i);
        let visit = visitor.visit(&mut node.children[i], path);

        match visit {
            Visit::Remove => {
                node.children.remove(i);
                path.pop();
                // children[i] is now the former next sibling
                continue;
            }
            Visit::Continue => walk_children(&mut node.children[i], path, visitor),
            Visit::SkipChildren => {}
        }

        path.pop();
        i += 1;
    }
}

/// Read-only pre-order iterator over a document, see [`Document::traverse`]
pub struct Traverse<'a> {
    stack: Vec<(NodePath, &'a Node)>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (NodePath, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;

        // Pushed in reverse so the first child is popped first
        for (index, child) in node.children.iter().enumerate().rev() {
            self.stack.push((path.child(index), child));
        }

        Some((path, node))
    }
}

impl Document {
    /// Iterates over every node, root included, in document order
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            stack: vec![(NodePath::root(), &self.root)],
        }
    }
}
