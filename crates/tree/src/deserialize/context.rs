//! State threaded through one deserialization.

use crate::ids::IdGenerator;
use crate::node::{Node, Text};
use markdown::unist::Position;
use mdxdoc_core::{ParseDiagnostics, ParseWarning, SourceLocation};

/// Id source, diagnostics and source text for the document being converted.
pub(super) struct Context<'a> {
    source: &'a str,
    ids: &'a mut dyn IdGenerator,
    diagnostics: ParseDiagnostics,
    /// Byte offset and line that positions in the current block count from.
    origin: (usize, usize),
}

impl<'a> Context<'a> {
    pub(super) fn new(
        source: &'a str,
        ids: &'a mut dyn IdGenerator,
        diagnostics: ParseDiagnostics,
    ) -> Self {
        Self {
            source,
            ids,
            diagnostics,
            origin: (0, 1),
        }
    }

    /// Sets where the positions of the next root block are measured from.
    pub(super) fn enter_block(&mut self, offset: usize, first_line: usize) {
        self.origin = (offset, first_line);
    }

    pub(super) fn next_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// The source text a node was parsed from.
    pub(super) fn raw(&self, position: Option<&Position>) -> Option<&'a str> {
        let position = position?;
        let (offset, _) = self.origin;
        self.source
            .get(offset + position.start.offset..offset + position.end.offset)
    }

    /// Records markup that parsed but will not survive as the author wrote it.
    pub(super) fn suspicious(&mut self, position: Option<&Position>, message: impl Into<String>) {
        let (_, first_line) = self.origin;
        let location = position.map_or(SourceLocation::new(first_line, 1), |position| {
            SourceLocation::new(position.start.line, position.start.column)
                .offset_lines(first_line)
        });
        let message = message.into();
        log::debug!("{location}: {message}");
        self.diagnostics
            .add_warning(ParseWarning::SuspiciousMarkup { location, message });
    }

    pub(super) fn finish(self) -> ParseDiagnostics {
        self.diagnostics
    }
}

/// Merges adjacent text leaves with equal marks and drops empty ones, so
/// equal content always has one shape. An empty run becomes a single empty
/// text leaf; inline containers are never childless.
pub(super) fn normalize_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) if text.text.is_empty() => {}
            Node::Text(text) => match out.last_mut() {
                Some(Node::Text(previous)) if previous.marks == text.marks => {
                    previous.text.push_str(&text.text);
                }
                _ => out.push(Node::Text(text)),
            },
            element => out.push(element),
        }
    }
    if out.is_empty() {
        out.push(Node::Text(Text::default()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ElementKind, Mark};

    #[test]
    fn merges_equal_marks_only() {
        let nodes = normalize_inline(vec![
            Node::text("a"),
            Node::text("b"),
            Node::Text(Text::marked("c", [Mark::Bold])),
            Node::Text(Text::marked("", [Mark::Italic])),
            Node::Text(Text::marked("d", [Mark::Bold])),
        ]);
        assert_eq!(
            nodes,
            vec![
                Node::text("ab"),
                Node::Text(Text::marked("cd", [Mark::Bold])),
            ]
        );
    }

    #[test]
    fn elements_split_runs() {
        let image = Node::element(
            ElementKind::Image {
                url: "a.png".into(),
                title: None,
                alt: String::new(),
            },
            vec![],
        );
        let nodes = normalize_inline(vec![Node::text("a"), image.clone(), Node::text("b")]);
        assert_eq!(nodes, vec![Node::text("a"), image, Node::text("b")]);
    }

    #[test]
    fn empty_run_keeps_one_leaf() {
        assert_eq!(normalize_inline(vec![]), vec![Node::text("")]);
    }
}
