#![deny(missing_docs)]
//! mdxdoc tree: the editable document tree and its conversion to and from
//! MDX text.
//!
//! ```
//! use mdxdoc_tree::{DeserializeOptions, SequentialIds, SerializeOptions};
//!
//! let source = "# Title\n\nSome **bold** text.\n";
//! let tree = mdxdoc_tree::deserialize(
//!     source,
//!     &DeserializeOptions::default(),
//!     &mut SequentialIds::default(),
//! );
//! let text = mdxdoc_tree::serialize_document(&tree.nodes, &SerializeOptions::default())?;
//! assert_eq!(text, source);
//! # Ok::<(), mdxdoc_tree::SerializeError>(())
//! ```

/// MDX text to tree.
pub mod deserialize;
/// Tree and serialization errors.
pub mod error;
/// Component id generation.
pub mod ids;
/// Tree JSON for the editing surface.
pub mod json;
/// Tree node types.
pub mod node;
/// Installation-specific node type tags.
pub mod node_types;
/// Tree to MDX text.
pub mod serialize;
/// Structural invariants.
pub mod validate;

pub use deserialize::{
    DeserializeOptions, Deserialized, Document, deserialize, deserialize_document,
};
pub use error::{NodePath, SerializeError, TreeError};
pub use ids::{IdGenerator, SequentialIds};
pub use json::{from_json, node_from_json, node_to_json, to_json};
pub use node::{
    Align, Attribute, Component, Element, ElementKind, HeadingLevel, Mark, Marks, Node, Text,
};
pub use node_types::{DEFAULT_NODE_TYPES, NodeType, NodeTypes};
pub use serialize::{SerializeOptions, serialize, serialize_document};
pub use validate::{validate, validate_node};

pub use mdxdoc_core::{
    AttributeValue, Frontmatter, ObjectEntry, ParseDiagnostics, ParseOptions, join_frontmatter,
};
