//! Structural invariants of the document tree.
//!
//! Trees coming out of the deserializer always satisfy these. A violation
//! means the editing surface corrupted the tree, so callers treat it as a
//! defect rather than patching the tree up.

use crate::error::{NodePath, TreeError};
use crate::node::{Element, ElementKind, Node};
use crate::node_types::DEFAULT_NODE_TYPES;
use std::collections::HashSet;

/// Where a node sits, which decides the kinds allowed there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Root, block quote body.
    Block,
    /// Paragraph, heading, list item text, link, code line.
    Inline,
    /// Flow component body or a lone node; blocks and inline runs mix.
    Either,
}

/// Checks every invariant of a root sequence.
pub fn validate(nodes: &[Node]) -> Result<(), TreeError> {
    if nodes.is_empty() {
        return Err(TreeError::EmptyDocument);
    }
    validate_children(nodes, &NodePath::root(), Slot::Block)
}

/// Checks one node and its subtree as if it sat at the root.
pub fn validate_node(node: &Node) -> Result<(), TreeError> {
    validate_at(node, &NodePath::root(), Slot::Either)
}

/// Splits a list item into its text element and its nested lists.
pub fn list_item_parts<'a>(
    item: &'a Element,
    path: &NodePath,
) -> Result<(&'a Element, &'a [Node]), TreeError> {
    let shape = |reason| TreeError::ListItemShape {
        path: path.clone(),
        reason,
    };
    let (first, rest) = item
        .children
        .split_first()
        .ok_or_else(|| shape("missing list_item_text"))?;
    let text = match first {
        Node::Element(element) if element.kind == ElementKind::ListItemText => element,
        _ => return Err(shape("first child is not list_item_text")),
    };
    if !rest.iter().all(|child| child.kind().is_some_and(ElementKind::is_list)) {
        return Err(shape("only lists may follow the text"));
    }
    Ok((text, rest))
}

fn validate_children(children: &[Node], path: &NodePath, slot: Slot) -> Result<(), TreeError> {
    for (index, child) in children.iter().enumerate() {
        validate_at(child, &path.child(index), slot)?;
    }
    Ok(())
}

fn validate_at(node: &Node, path: &NodePath, slot: Slot) -> Result<(), TreeError> {
    let element = match node {
        Node::Text(_) if slot == Slot::Block => return Err(misplaced("text", path)),
        Node::Text(_) => return Ok(()),
        Node::Element(element) => element,
    };

    let fits = match &element.kind {
        ElementKind::Link { .. } | ElementKind::Image { .. } => slot != Slot::Block,
        ElementKind::Component(_) => true,
        ElementKind::ListItem | ElementKind::ListItemText | ElementKind::CodeLine => false,
        _ => slot != Slot::Inline,
    };
    if !fits {
        return Err(misplaced(DEFAULT_NODE_TYPES.tag_of(&element.kind), path));
    }

    validate_element(element, path, slot)
}

fn validate_element(element: &Element, path: &NodePath, slot: Slot) -> Result<(), TreeError> {
    if element.kind.is_void() && !element.children.is_empty() {
        return Err(TreeError::VoidWithChildren {
            kind: DEFAULT_NODE_TYPES.tag_of(&element.kind).to_string(),
            path: path.clone(),
        });
    }

    match &element.kind {
        ElementKind::Paragraph
        | ElementKind::Heading(_)
        | ElementKind::ListItemText
        | ElementKind::CodeLine
        | ElementKind::Link { .. } => validate_children(&element.children, path, Slot::Inline),
        ElementKind::BlockQuote => validate_children(&element.children, path, Slot::Block),
        ElementKind::OrderedList { .. } | ElementKind::UnorderedList => {
            for (index, child) in element.children.iter().enumerate() {
                let child_path = path.child(index);
                match child {
                    Node::Element(item) if item.kind == ElementKind::ListItem => {
                        validate_list_item(item, &child_path)?;
                    }
                    _ => return Err(TreeError::ListChild { path: child_path }),
                }
            }
            Ok(())
        }
        ElementKind::ListItem => validate_list_item(element, path),
        ElementKind::CodeBlock { .. } => {
            for (index, child) in element.children.iter().enumerate() {
                let child_path = path.child(index);
                match child {
                    Node::Element(line) if line.kind == ElementKind::CodeLine => {
                        validate_children(&line.children, &child_path, Slot::Inline)?;
                    }
                    _ => return Err(TreeError::CodeChild { path: child_path }),
                }
            }
            Ok(())
        }
        ElementKind::Component(component) => {
            let mut seen = HashSet::new();
            for attribute in &component.attributes {
                if !seen.insert(attribute.name.as_str()) {
                    return Err(TreeError::DuplicateAttribute {
                        path: path.clone(),
                        name: attribute.name.clone(),
                    });
                }
            }
            let body = if slot == Slot::Inline {
                Slot::Inline
            } else {
                Slot::Either
            };
            validate_children(&component.react_children, path, body)
        }
        ElementKind::ThematicBreak | ElementKind::Image { .. } => Ok(()),
    }
}

fn validate_list_item(item: &Element, path: &NodePath) -> Result<(), TreeError> {
    let (text, nested) = list_item_parts(item, path)?;
    validate_children(&text.children, &path.child(0), Slot::Inline)?;
    for (offset, list) in nested.iter().enumerate() {
        validate_at(list, &path.child(offset + 1), Slot::Block)?;
    }
    Ok(())
}

fn misplaced(kind: &str, path: &NodePath) -> TreeError {
    TreeError::Misplaced {
        kind: kind.to_string(),
        path: path.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Attribute, Component};
    use mdxdoc_core::AttributeValue;

    fn item(children: Vec<Node>) -> Node {
        Node::element(ElementKind::ListItem, children)
    }

    fn item_text(text: &str) -> Node {
        Node::element(ElementKind::ListItemText, vec![Node::text(text)])
    }

    fn list(items: Vec<Node>) -> Node {
        Node::element(ElementKind::UnorderedList, items)
    }

    #[test]
    fn accepts_nested_lists() {
        let tree = vec![list(vec![item(vec![
            item_text("a"),
            list(vec![item(vec![item_text("b")])]),
        ])])];
        assert_eq!(validate(&tree), Ok(()));
    }

    #[test]
    fn rejects_empty_document() {
        assert_eq!(validate(&[]), Err(TreeError::EmptyDocument));
    }

    #[test]
    fn rejects_list_item_without_text() {
        let tree = vec![list(vec![item(vec![list(vec![])])])];
        let err = validate(&tree).unwrap_err();
        assert!(
            matches!(&err, TreeError::ListItemShape { path, .. } if path.indexes() == [0, 0]),
            "{err:?}"
        );
    }

    #[test]
    fn rejects_paragraph_after_item_text() {
        let tree = vec![list(vec![item(vec![
            item_text("a"),
            Node::paragraph(vec![Node::text("b")]),
        ])])];
        assert!(matches!(
            validate(&tree),
            Err(TreeError::ListItemShape { .. })
        ));
    }

    #[test]
    fn rejects_text_at_root_and_blocks_inline() {
        assert!(matches!(
            validate(&[Node::text("loose")]),
            Err(TreeError::Misplaced { .. })
        ));
        let nested = Node::paragraph(vec![Node::element(ElementKind::BlockQuote, vec![])]);
        assert!(matches!(
            validate(&[nested]),
            Err(TreeError::Misplaced { kind, .. }) if kind == "block_quote"
        ));
    }

    #[test]
    fn rejects_duplicate_attributes() {
        let component = Component {
            id: "c-1".into(),
            name: "Card".into(),
            attributes: vec![
                Attribute::new("title", AttributeValue::string("a")),
                Attribute::new("title", AttributeValue::string("b")),
            ],
            spread: vec![],
            react_children: vec![],
        };
        let tree = vec![Node::element(ElementKind::Component(component), vec![])];
        assert!(matches!(
            validate(&tree),
            Err(TreeError::DuplicateAttribute { name, .. }) if name == "title"
        ));
    }

    #[test]
    fn rejects_void_with_children() {
        let tree = vec![Node::element(
            ElementKind::ThematicBreak,
            vec![Node::text("x")],
        )];
        assert!(matches!(
            validate(&tree),
            Err(TreeError::VoidWithChildren { .. })
        ));
    }
}
