#![deny(missing_docs)]
//! mdxdoc core: MDX parsing with block recovery, front matter, and the
//! JSX attribute value codec.

/// Typed JSX attribute values and their expression codec.
pub mod attribute;
/// Code fence detection utilities.
pub mod code_fence;
/// Core error and diagnostic types.
pub mod error;
/// YAML front matter splitting.
pub mod frontmatter;
/// Markdown/MDX parsing utilities.
pub mod parse;
/// Blank-line segmentation of top-level blocks.
pub mod segment;

pub use attribute::{
    AttributeSyntax, AttributeValue, ObjectEntry, decode_expression, decode_literal, encode,
    encode_expression,
};
pub use code_fence::{FencePhase, FenceState, LineOutcome, advance_fence_state};
pub use error::{
    MdxDocError, ParseDiagnostics, ParseWarning, RecoverableError, SourceLocation,
};
pub use frontmatter::{Frontmatter, FrontmatterError, join_frontmatter, split_frontmatter};
pub use parse::{
    ParseOptions, RecoveredBlock, RecoveredBlocks, parse_blocks_recovering, parse_mdast,
    parse_mdast_with_options,
};
pub use segment::{Segment, split_segments};
