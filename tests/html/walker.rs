//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use pagesnap::parsers::html::{walk, Attribute, Document, Node, NodeData, NodePath, Visit};

    fn list(items: &[&str]) -> Document {
        let mut document = Document::new();
        let mut ul = Node::element("ul", vec![]);
        for item in items {
            let mut li = Node::element("li", vec![Attribute::new("class", item)]);
            li.append_child(Node::text(item)).unwrap();
            ul.append_child(li).unwrap();
        }
        document.root_mut().append_child(ul).unwrap();
        document
    }

    fn classes(document: &Document) -> Vec<String> {
        document
            .traverse()
            .filter_map(|(_, node)| node.get_attr("class").map(str::to_string))
            .collect()
    }

    #[test]
    fn every_node_visited_once_while_removing() {
        let mut document = list(&["drop", "keep1", "drop", "drop", "keep2", "drop"]);
        let mut visited = Vec::new();

        walk(&mut document, &mut |node: &mut Node, _: &NodePath| {
            match node.get_attr("class") {
                Some(class) => {
                    visited.push(class.to_string());
                    if class == "drop" {
                        Visit::Remove
                    } else {
                        Visit::Continue
                    }
                }
                None => Visit::Continue,
            }
        });

        assert_eq!(visited.len(), 6);
        assert_eq!(classes(&document), vec!["keep1", "keep2"]);
    }

    #[test]
    fn skip_children_prunes_descent() {
        let mut document = list(&["a", "b"]);
        let mut texts = 0;

        walk(&mut document, &mut |node: &mut Node, _: &NodePath| {
            if matches!(node.data(), NodeData::Text(_)) {
                texts += 1;
            }
            if node.has_tag("li") {
                Visit::SkipChildren
            } else {
                Visit::Continue
            }
        });

        assert_eq!(texts, 0);
        assert_eq!(classes(&document), vec!["a", "b"]);
    }

    #[test]
    fn paths_point_back_at_visited_nodes() {
        let mut document = list(&["a", "b", "c"]);
        let mut paths = Vec::new();

        walk(&mut document, &mut |node: &mut Node, path: &NodePath| {
            if node.has_tag("li") {
                paths.push(path.clone());
            }
            Visit::Continue
        });

        let found: Vec<String> = paths
            .iter()
            .filter_map(|path| document.node(path))
            .filter_map(|node| node.get_attr("class").map(str::to_string))
            .collect();
        assert_eq!(found, vec!["a", "b", "c"]);
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use pagesnap::parsers::html::{walk, Document, Node, NodePath, TreeError, Visit};

    #[test]
    fn root_cannot_be_removed() {
        let mut document = Document::new();
        document
            .root_mut()
            .append_child(Node::element("p", vec![]))
            .unwrap();

        walk(&mut document, &mut |_: &mut Node, _: &NodePath| Visit::Remove);

        // The root survives; its children do not
        assert!(document.root().children().is_empty());
    }

    #[test]
    fn document_cannot_be_nested() {
        let mut document = Document::new();
        let result = document.root_mut().append_child(Document::new().root().clone());

        assert_eq!(result, Err(TreeError::NestedDocument));
    }
}
