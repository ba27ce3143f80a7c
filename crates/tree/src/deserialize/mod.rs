//! MDX text to document tree.
//!
//! Parsing goes through markdown-rs with block-level recovery, so a single
//! malformed component degrades to a plain paragraph instead of failing the
//! whole document. The mdast is then mapped onto the closed set of tree
//! kinds; anything without a tree counterpart becomes a paragraph holding
//! its text.

mod context;
mod convert;

use crate::ids::IdGenerator;
use crate::node::Node;
use context::Context;
use mdxdoc_core::{
    Frontmatter, FrontmatterError, ParseDiagnostics, ParseOptions, parse_blocks_recovering,
    split_frontmatter,
};
use serde::{Deserialize, Serialize};

/// Options for [`deserialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeserializeOptions {
    /// markdown-rs constructs to enable.
    pub parse: ParseOptions,
    /// Append an empty paragraph so the cursor can always be placed after
    /// the last block. The serializer drops it again.
    pub trailing_paragraph: bool,
}

impl Default for DeserializeOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::mdx(),
            trailing_paragraph: false,
        }
    }
}

/// A deserialized tree with what went wrong on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Deserialized {
    /// Root block sequence; never empty.
    pub nodes: Vec<Node>,
    /// Recovery errors and warnings. Empty for a clean document.
    pub diagnostics: ParseDiagnostics,
}

/// A whole file: front matter plus the deserialized body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The leading YAML block, parsed and raw.
    pub frontmatter: Frontmatter,
    /// The body tree.
    pub body: Deserialized,
}

/// Deserializes MDX text into a document tree.
///
/// Never fails: blocks that cannot be parsed are kept as plain-text
/// paragraphs and reported in [`Deserialized::diagnostics`]. Component ids
/// are drawn from `ids` in document order.
pub fn deserialize(
    source: &str,
    options: &DeserializeOptions,
    ids: &mut dyn IdGenerator,
) -> Deserialized {
    let recovered = parse_blocks_recovering(source, &options.parse);
    let mut ctx = Context::new(source, ids, recovered.diagnostics);

    let mut nodes = convert::root_blocks(&recovered.blocks, &mut ctx);
    if nodes.is_empty() {
        nodes.push(Node::empty_paragraph());
    } else if options.trailing_paragraph
        && !nodes.last().is_some_and(Node::is_empty_paragraph)
    {
        nodes.push(Node::empty_paragraph());
    }

    Deserialized {
        nodes,
        diagnostics: ctx.finish(),
    }
}

/// Splits front matter off a file and deserializes the body.
///
/// Diagnostic locations are reported against the whole file.
pub fn deserialize_document(
    source: &str,
    options: &DeserializeOptions,
    ids: &mut dyn IdGenerator,
) -> Result<Document, FrontmatterError> {
    let frontmatter = split_frontmatter(source)?;
    let body_source = frontmatter.body(source);
    let mut body = deserialize(body_source, options, ids);

    let lines_before = source[..frontmatter.body_start].matches('\n').count();
    if lines_before > 0 {
        body.diagnostics.offset_lines(lines_before + 1);
    }

    Ok(Document { frontmatter, body })
}
