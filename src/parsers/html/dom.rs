use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use thiserror::Error;

/// Errors raised by structural edits that would break the tree invariants
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("a document node cannot be nested inside another node")]
    NestedDocument,
    #[error("child index {index} is out of bounds for a node with {len} children")]
    ChildOutOfBounds { index: usize, len: usize },
}

/// A single element attribute
///
/// Attributes live in an ordered `Vec` on their element, the order being
/// the one they had in the source markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string(),
        }
    }
}

/// What kind of node this is, along with its kind-specific payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    /// The unique root of the tree
    Document,
    /// `<!DOCTYPE name>`
    Doctype { name: String },
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    Text(String),
    Comment(String),
}

/// A node of the document tree
///
/// Every node owns its children exclusively; a node's parent is implied by
/// its position in the tree and is never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    data: NodeData,
    pub(crate) children: Vec<Node>,
}

impl Node {
    pub fn element(name: &str, attrs: Vec<Attribute>) -> Node {
        let mut node = Node {
            data: NodeData::Element {
                name: QualName::new(None, ns!(html), LocalName::from(name)),
                attrs: Vec::with_capacity(attrs.len()),
            },
            children: Vec::new(),
        };
        // Route through set_attr so duplicate names collapse into one
        for attr in attrs {
            node.set_attr(&attr.name.local, &attr.value);
        }
        node
    }

    pub fn text(contents: &str) -> Node {
        Node {
            data: NodeData::Text(contents.to_string()),
            children: Vec::new(),
        }
    }

    pub fn comment(contents: &str) -> Node {
        Node {
            data: NodeData::Comment(contents.to_string()),
            children: Vec::new(),
        }
    }

    pub fn doctype(name: &str) -> Node {
        Node {
            data: NodeData::Doctype {
                name: name.to_string(),
            },
            children: Vec::new(),
        }
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    /// Returns the element's local name, as stored
    pub fn tag_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    /// Checks whether this is an element with the given tag name (ASCII case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_name()
            .map_or(false, |name| name.eq_ignore_ascii_case(tag))
    }

    pub fn attrs(&self) -> &[Attribute] {
        match &self.data {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Returns the value of the given attribute, if present
    pub fn get_attr(&self, attr_name: &str) -> Option<&str> {
        self.attrs()
            .iter()
            .find(|attr| attr.name.local.as_ref().eq_ignore_ascii_case(attr_name))
            .map(|attr| attr.value.as_str())
    }

    /// Sets an attribute value
    ///
    /// An existing attribute keeps its position and only has its value
    /// replaced; a new one is appended. Does nothing on non-element nodes.
    pub fn set_attr(&mut self, attr_name: &str, attr_value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.data {
            match attrs
                .iter_mut()
                .find(|attr| attr.name.local.as_ref().eq_ignore_ascii_case(attr_name))
            {
                Some(existing) => {
                    existing.value.clear();
                    existing.value.push_str(attr_value);
                }
                None => attrs.push(Attribute::new(attr_name, attr_value)),
            }
        }
    }

    /// Removes an attribute, returning its former value
    pub fn remove_attr(&mut self, attr_name: &str) -> Option<String> {
        if let NodeData::Element { attrs, .. } = &mut self.data {
            let position = attrs
                .iter()
                .position(|attr| attr.name.local.as_ref().eq_ignore_ascii_case(attr_name))?;
            return Some(attrs.remove(position).value);
        }
        None
    }

    /// Appends a child node
    pub fn append_child(&mut self, child: Node) -> Result<(), TreeError> {
        if matches!(child.data, NodeData::Document) {
            return Err(TreeError::NestedDocument);
        }
        self.children.push(child);
        Ok(())
    }

    /// Detaches and returns the child at `index`
    pub fn remove_child(&mut self, index: usize) -> Result<Node, TreeError> {
        if index >= self.children.len() {
            return Err(TreeError::ChildOutOfBounds {
                index,
                len: self.children.len(),
            });
        }
        Ok(self.children.remove(index))
    }

    /// Concatenated contents of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }
}

fn collect_text(node: &Node, buf: &mut String) {
    if let NodeData::Text(contents) = &node.data {
        buf.push_str(contents);
    }
    for child in &node.children {
        collect_text(child, buf);
    }
}

/// Position of a node, as the list of child indices leading to it from the root
///
/// A path stays valid until the tree is structurally edited; rewriting
/// attribute values does not invalidate it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn child(&self, index: usize) -> NodePath {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        NodePath(indices)
    }

    pub(crate) fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        NodePath(indices)
    }
}

/// A parsed document: the owner of the root node
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub(crate) root: Node,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document
    pub fn new() -> Self {
        Document {
            root: Node {
                data: NodeData::Document,
                children: Vec::new(),
            },
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Looks a node up by its path
    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        path.indices()
            .iter()
            .try_fold(&self.root, |node, &index| node.children.get(index))
    }

    /// Looks a node up by its path, mutably
    pub fn node_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        path.indices()
            .iter()
            .try_fold(&mut self.root, |node, &index| node.children.get_mut(index))
    }

    /// Finds the first element reachable through the given chain of tag names
    ///
    /// Each name must match a direct child of the previous match, starting
    /// from the root, e.g. `["html", "head", "base"]`.
    pub fn find_first(&self, node_names: &[&str]) -> Option<&Node> {
        node_names.iter().try_fold(&self.root, |node, name| {
            node.children.iter().find(|child| child.has_tag(name))
        })
    }

    /// All direct children of the element reached through `node_names` that carry the given tag
    pub fn find_children<'a>(&'a self, node_names: &[&str], tag: &'a str) -> Vec<&'a Node> {
        match self.find_first(node_names) {
            Some(parent) => parent
                .children
                .iter()
                .filter(|child| child.has_tag(tag))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Turns raw HTML bytes into a document tree
///
/// Parsing never fails: malformed markup is repaired the way browsers
/// repair it (implied `html`, `head` and `body` elements and so on).
/// Unknown encoding labels fall back to lossy UTF-8.
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> Document {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let (string, _, _) = encoding.decode(data);
            string.into_owned()
        }
        None => String::from_utf8_lossy(data).into_owned(),
    };

    let dom: RcDom = parse_document(RcDom::default(), Default::default()).one(s.as_str());

    let mut document = Document::new();
    convert_children(&dom.document, &mut document.root);
    document
}

fn convert_children(handle: &Handle, parent: &mut Node) {
    for child in handle.children.borrow().iter() {
        if let Some(node) = convert_node(child) {
            parent.children.push(node);
        }
    }
}

fn convert_node(handle: &Handle) -> Option<Node> {
    let data = match handle.data {
        RcNodeData::Doctype { ref name, .. } => NodeData::Doctype {
            name: name.to_string(),
        },
        RcNodeData::Text { ref contents } => NodeData::Text(contents.borrow().to_string()),
        RcNodeData::Comment { ref contents } => NodeData::Comment(contents.to_string()),
        RcNodeData::Element {
            ref name,
            ref attrs,
            ..
        } => NodeData::Element {
            name: name.clone(),
            attrs: attrs
                .borrow()
                .iter()
                .map(|attr| Attribute {
                    name: attr.name.clone(),
                    value: attr.value.to_string(),
                })
                .collect(),
        },
        // Never produced below the root by the HTML parser
        RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return None,
    };

    let mut node = Node {
        data,
        children: Vec::new(),
    };
    convert_children(handle, &mut node);

    // The parser keeps <template> contents in a separate fragment
    if let RcNodeData::Element {
        ref template_contents,
        ..
    } = handle.data
    {
        if let Some(contents) = template_contents.borrow().as_ref() {
            convert_children(contents, &mut node);
        }
    }

    Some(node)
}
