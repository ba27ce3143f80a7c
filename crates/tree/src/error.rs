use std::fmt;
use thiserror::Error;

/// Position of a node as child indexes from the root, e.g. `2.0.1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The root sequence itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Self(indexes)
    }

    /// Indexes from the root.
    pub fn indexes(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("root");
        }
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// A document tree that breaks the tree invariants, or JSON that does not
/// describe a tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The root sequence has no nodes.
    #[error("document has no blocks")]
    EmptyDocument,
    /// A list item is not one `list_item_text` followed by lists.
    #[error("malformed list item at {path}: {reason}")]
    ListItemShape {
        /// Where the item is.
        path: NodePath,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A list holds something other than list items.
    #[error("list at {path} holds a non-item child")]
    ListChild {
        /// Where the offending child is.
        path: NodePath,
    },
    /// A code block holds something other than code lines.
    #[error("code block at {path} holds a non-line child")]
    CodeChild {
        /// Where the offending child is.
        path: NodePath,
    },
    /// A node appears where its kind cannot be.
    #[error("{kind} at {path} is misplaced")]
    Misplaced {
        /// Node type tag.
        kind: String,
        /// Where the node is.
        path: NodePath,
    },
    /// A void element carries children.
    #[error("void {kind} at {path} has children")]
    VoidWithChildren {
        /// Node type tag.
        kind: String,
        /// Where the node is.
        path: NodePath,
    },
    /// Two attributes share a name on one component.
    #[error("component at {path} repeats attribute `{name}`")]
    DuplicateAttribute {
        /// Where the component is.
        path: NodePath,
        /// The repeated name.
        name: String,
    },
    /// JSON that cannot be read as a node.
    #[error("invalid node at {path}: {message}")]
    Json {
        /// Where the node is.
        path: NodePath,
        /// What is wrong with it.
        message: String,
    },
}

/// Errors raised while serializing a tree.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The tree violates a structural invariant; the editing surface
    /// produced a corrupt tree.
    #[error("cannot serialize a corrupt tree: {0}")]
    Structure(#[from] TreeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_display_as_dotted_indexes() {
        assert_eq!(NodePath::root().to_string(), "root");
        assert_eq!(NodePath::root().child(2).child(0).to_string(), "2.0");
    }
}
