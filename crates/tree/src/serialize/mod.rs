//! Document tree to MDX text.
//!
//! Output is canonical: the same tree always produces the same text, and
//! text produced here deserializes back to the tree it came from.

mod block;
mod component;
mod inline;

use crate::error::{NodePath, SerializeError};
use crate::node::Node;
use crate::validate::{validate, validate_node};
use block::BlockWriter;
use serde::{Deserialize, Serialize};

/// Options for [`serialize`] and [`serialize_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializeOptions {
    /// Join blocks with a single newline instead of a blank line wherever
    /// the parser would still read the same blocks back.
    pub ignore_paragraph_newline: bool,
}

impl SerializeOptions {
    fn writer(&self) -> BlockWriter {
        BlockWriter {
            tight: self.ignore_paragraph_newline,
        }
    }
}

/// Serializes one node and its subtree.
///
/// Inline nodes are written as they would appear inside a paragraph.
pub fn serialize(node: &Node, options: &SerializeOptions) -> Result<String, SerializeError> {
    validate_node(node)?;
    let writer = options.writer();
    let root = NodePath::root();
    let out = match node {
        Node::Element(element) if !node.is_inline() => writer.block(element, &root)?,
        _ => writer.blocks(std::slice::from_ref(node), &root)?,
    };
    Ok(out)
}

/// Serializes a whole document: blocks joined, empty paragraphs dropped,
/// one trailing newline.
///
/// An empty root is rejected like any other structural error; a document
/// holding only empty paragraphs is the empty string.
pub fn serialize_document(
    nodes: &[Node],
    options: &SerializeOptions,
) -> Result<String, SerializeError> {
    validate(nodes)?;

    let body = options.writer().blocks(nodes, &NodePath::root())?;
    if body.is_empty() {
        return Ok(String::new());
    }
    Ok(body + "\n")
}
