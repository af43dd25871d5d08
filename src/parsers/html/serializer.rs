use std::io;

use encoding_rs::Encoding;
use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};

use super::dom::{Document, Node, NodeData};

impl Serialize for Node {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let include_self = matches!(traversal_scope, TraversalScope::IncludeNode);

        match self.data() {
            NodeData::Document => serialize_children(self, serializer),
            NodeData::Element { name, attrs } => {
                if include_self {
                    serializer.start_elem(
                        name.clone(),
                        attrs.iter().map(|attr| (&attr.name, attr.value.as_str())),
                    )?;
                }
                serialize_children(self, serializer)?;
                if include_self {
                    serializer.end_elem(name.clone())?;
                }
                Ok(())
            }
            NodeData::Doctype { name } if include_self => serializer.write_doctype(name),
            NodeData::Text(contents) if include_self => serializer.write_text(contents),
            NodeData::Comment(contents) if include_self => serializer.write_comment(contents),
            NodeData::Doctype { .. } | NodeData::Text(_) | NodeData::Comment(_) => Ok(()),
        }
    }
}

fn serialize_children<S: Serializer>(node: &Node, serializer: &mut S) -> io::Result<()> {
    for child in node.children() {
        child.serialize(serializer, TraversalScope::IncludeNode)?;
    }
    Ok(())
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        self.root().serialize(serializer, traversal_scope)
    }
}

/// Renders the document as UTF-8 HTML
///
/// The output is a pure function of the tree. Normalization happens once,
/// when the input is parsed: entities are decoded, implied elements are
/// materialized, void elements lose any self-closing slash and attribute
/// values come back double-quoted.
pub fn serialize_document(document: &Document) -> io::Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    serialize(&mut buf, document, SerializeOpts::default())?;
    Ok(buf)
}

/// Converts serialized UTF-8 output into the given document encoding
///
/// UTF-8, empty and unknown labels leave the bytes as they are.
pub fn encode_output(buf: Vec<u8>, document_encoding: &str) -> Vec<u8> {
    match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) if encoding != encoding_rs::UTF_8 => {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            data.into_owned()
        }
        _ => buf,
    }
}
