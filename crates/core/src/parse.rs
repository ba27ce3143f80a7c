//! Markdown/MDX parsing on top of markdown-rs, with block-level recovery.

use crate::segment::{Segment, split_segments};
use crate::{MdxDocError, ParseDiagnostics, RecoverableError, SourceLocation};
use markdown::mdast::{Node, Paragraph, Text};
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Enable MDX JSX constructs (flow and text elements).
    pub mdx: bool,
    /// Enable GitHub Flavored Markdown strikethrough.
    pub gfm: bool,
    /// Enable YAML frontmatter parsing.
    pub frontmatter: bool,
}

impl ParseOptions {
    /// Plain markdown (no JSX).
    pub const fn markdown() -> Self {
        Self {
            mdx: false,
            gfm: true,
            frontmatter: true,
        }
    }

    /// MDX defaults: JSX flow/text elements enabled.
    pub const fn mdx() -> Self {
        Self {
            mdx: true,
            gfm: true,
            frontmatter: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: self.frontmatter,
            // Component bodies are commonly indented; never read them as code.
            code_indented: false,
            html_flow: !self.mdx,
            html_text: !self.mdx,
            ..Default::default()
        };

        // Autolink literals are left off: a bare `www.` in typed text would
        // otherwise come back from a save as a link.
        if self.gfm {
            constructs.gfm_strikethrough = true;
        }

        if self.mdx {
            constructs.mdx_jsx_flow = true;
            constructs.mdx_jsx_text = true;
        }

        markdown::ParseOptions {
            constructs,
            gfm_strikethrough_single_tilde: false,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::mdx()
    }
}

/// Parse markdown into an MDAST tree using core options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, MdxDocError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parse markdown into an MDAST tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, MdxDocError> {
    markdown::to_mdast(input, options).map_err(|err| MdxDocError::Markdown {
        message: err.to_string(),
        location: message_location(&err),
    })
}

/// One root-level block and where its positions are measured from.
///
/// Blocks from a whole-document parse have offset 0 and first line 1;
/// blocks from a recovered segment carry the segment's start.
#[derive(Debug, Clone)]
pub struct RecoveredBlock {
    /// The MDAST node.
    pub node: Node,
    /// Byte offset in the input that the node's position offsets are relative to.
    pub offset: usize,
    /// Input line that the node's line 1 corresponds to.
    pub first_line: usize,
}

/// Top-level blocks recovered from a document, plus what went wrong on the way.
#[derive(Debug, Clone)]
pub struct RecoveredBlocks {
    /// Root-level blocks, in document order.
    pub blocks: Vec<RecoveredBlock>,
    /// Warnings and degraded-block errors.
    pub diagnostics: ParseDiagnostics,
}

/// Parses a document into its root children without ever failing.
///
/// The whole input is tried first. When markdown-rs rejects it, the input is
/// cut into blank-line separated segments. A segment that opens a JSX tag
/// is tried alone, then extended to each later segment mentioning the
/// matching closing tag, until it parses; one that never parses is kept as
/// a paragraph holding its raw text.
pub fn parse_blocks_recovering(input: &str, options: &ParseOptions) -> RecoveredBlocks {
    let markdown_options = options.to_markdown();
    let mut diagnostics = ParseDiagnostics::new();

    match parse_mdast_with_options(input, &markdown_options) {
        Ok(root) => {
            let blocks = root_children(root)
                .into_iter()
                .map(|node| RecoveredBlock {
                    node,
                    offset: 0,
                    first_line: 1,
                })
                .collect();
            return RecoveredBlocks {
                blocks,
                diagnostics,
            };
        }
        Err(err) => log::debug!("whole-document parse failed, recovering per block: {err}"),
    }

    let (segments, segment_diagnostics) = split_segments(input);
    diagnostics.extend(segment_diagnostics);

    let mut blocks = Vec::new();
    let mut index = 0;
    while index < segments.len() {
        let segment = segments[index];

        let mut first_error = None;
        let mut parsed = None;
        for end in closing_candidates(&segments, index, input) {
            let text = &input[segment.start..segments[end].end];
            match parse_mdast_with_options(text, &markdown_options) {
                Ok(root) => {
                    parsed = Some((end, root));
                    break;
                }
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(_) => {}
            }
        }

        match parsed {
            Some((end, root)) => {
                blocks.extend(root_children(root).into_iter().map(|node| RecoveredBlock {
                    node,
                    offset: segment.start,
                    first_line: segment.first_line,
                }));
                index = end + 1;
            }
            None => {
                let raw = segment.text(input);
                let (message, location) = match first_error {
                    Some(MdxDocError::Markdown { message, location }) => {
                        (message, location.offset_lines(segment.first_line))
                    }
                    None => (
                        "block could not be parsed".to_string(),
                        SourceLocation::new(segment.first_line, 1),
                    ),
                };
                log::warn!("keeping unparseable block at {location} as plain text: {message}");
                diagnostics.add_error(RecoverableError::new(message, location));
                blocks.push(RecoveredBlock {
                    node: plain_paragraph(raw),
                    offset: segment.start,
                    first_line: segment.first_line,
                });
                index += 1;
            }
        }
    }

    RecoveredBlocks {
        blocks,
        diagnostics,
    }
}

/// Last-segment indices worth trying for the block starting at `index`:
/// the segment alone, then each later segment that contains the closing
/// tag of the element it opens.
fn closing_candidates(segments: &[Segment], index: usize, input: &str) -> Vec<usize> {
    let mut candidates = vec![index];
    if let Some(name) = segments[index].opened_tag(input) {
        let closing = format!("</{name}");
        candidates.extend(
            (index + 1..segments.len())
                .filter(|&end| segments[end].text(input).contains(&closing)),
        );
    }
    candidates
}

fn root_children(root: Node) -> Vec<Node> {
    match root {
        Node::Root(root) => root.children,
        other => vec![other],
    }
}

fn plain_paragraph(raw: &str) -> Node {
    Node::Paragraph(Paragraph {
        children: vec![Node::Text(Text {
            value: raw.to_string(),
            position: None,
        })],
        position: None,
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(blocks: &[RecoveredBlock]) -> Vec<&'static str> {
        blocks
            .iter()
            .map(|block| match block.node {
                Node::Heading(_) => "heading",
                Node::Paragraph(_) => "paragraph",
                Node::MdxJsxFlowElement(_) => "jsx",
                Node::Code(_) => "code",
                _ => "other",
            })
            .collect()
    }

    #[test]
    fn clean_document_parses_in_one_pass() {
        let result = parse_blocks_recovering("# Hi\n\n<Card />\n", &ParseOptions::mdx());
        assert_eq!(kinds(&result.blocks), vec!["heading", "jsx"]);
        assert_eq!(result.diagnostics.count(), 0);
    }

    #[test]
    fn malformed_jsx_degrades_to_plain_paragraph() {
        let source = "# Title\n\n<Broken attr=>\n\nStill here\n";
        let result = parse_blocks_recovering(source, &ParseOptions::mdx());
        assert_eq!(kinds(&result.blocks), vec!["heading", "paragraph", "paragraph"]);
        assert_eq!(result.diagnostics.errors.len(), 1);
        assert_eq!(result.diagnostics.errors[0].location.line, 3);

        let Node::Paragraph(degraded) = &result.blocks[1].node else {
            panic!("expected paragraph");
        };
        assert_eq!(
            degraded.children,
            vec![Node::Text(Text {
                value: "<Broken attr=>".into(),
                position: None,
            })]
        );
    }

    #[test]
    fn component_spanning_blank_lines_survives_recovery() {
        let source = "<Card>\n\nBody text\n\n</Card>\n\n<Oops\n";
        let result = parse_blocks_recovering(source, &ParseOptions::mdx());
        assert_eq!(kinds(&result.blocks), vec!["jsx", "paragraph"]);
        assert_eq!(result.diagnostics.errors.len(), 1);
    }

    #[test]
    fn recovered_blocks_know_their_origin() {
        let source = "# Title\n\n<Broken attr=>\n\nStill here\n";
        let result = parse_blocks_recovering(source, &ParseOptions::mdx());
        let origins: Vec<_> = result
            .blocks
            .iter()
            .map(|block| (block.offset, block.first_line))
            .collect();
        assert_eq!(origins, vec![(0, 1), (9, 3), (25, 5)]);
        assert_eq!(&source[25..35], "Still here");
    }

    #[test]
    fn only_segments_with_the_closing_tag_extend_an_opener() {
        let source = "<Card>\n\na\n\n<Other>\n\nb </Card>\n\n</Other>\n\n<Lone";
        let (segments, _) = split_segments(source);
        assert_eq!(closing_candidates(&segments, 0, source), vec![0, 3]);
        assert_eq!(closing_candidates(&segments, 2, source), vec![2, 4]);
        assert_eq!(closing_candidates(&segments, 1, source), vec![1]);
        assert_eq!(closing_candidates(&segments, 5, source), vec![5]);
    }

    #[test]
    fn unclosed_opener_is_tried_alone() {
        let source = "<Lone\n\nplain\n\n<Card />\n";
        let result = parse_blocks_recovering(source, &ParseOptions::mdx());
        assert_eq!(kinds(&result.blocks), vec!["paragraph", "paragraph", "jsx"]);
        assert_eq!(result.diagnostics.errors.len(), 1);
    }

    #[test]
    fn markdown_mode_disables_jsx() {
        let root = parse_mdast("<Card />", &ParseOptions::markdown()).unwrap();
        let Node::Root(root) = root else {
            panic!("expected root");
        };
        assert!(!matches!(root.children[0], Node::MdxJsxFlowElement(_)));
    }
}
