//! Top-level block segmentation used when a whole document fails to parse.

use crate::code_fence::{FenceState, advance_fence_state};
use crate::{ParseDiagnostics, ParseWarning, SourceLocation};

/// A run of source lines that forms one or more top-level blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Byte offset of the first line.
    pub start: usize,
    /// Byte offset just past the last non-blank line (newline excluded).
    pub end: usize,
    /// 1-indexed line number of the first line.
    pub first_line: usize,
}

impl Segment {
    /// Slice the segment's text out of the source it was cut from.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Name of the JSX tag the segment opens with, if any; empty for a
    /// fragment. Such a segment may need a later segment to close.
    pub fn opened_tag<'a>(&self, source: &'a str) -> Option<&'a str> {
        let rest = self.text(source).trim_start().strip_prefix('<')?;
        if rest.starts_with('/') {
            return None;
        }
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '.' | ':' | '-' | '_' | '$')))
            .unwrap_or(rest.len());
        Some(&rest[..len])
    }
}

/// Splits `source` at blank lines outside fenced code.
///
/// Indented lines after a blank line continue the current segment, which
/// keeps loose list items and indented component bodies together.
pub fn split_segments(source: &str) -> (Vec<Segment>, ParseDiagnostics) {
    let mut segments = Vec::new();
    let mut diagnostics = ParseDiagnostics::new();
    let mut fence = FenceState::default();
    let mut fence_opened_at = SourceLocation::new(1, 1);
    let mut current: Option<Segment> = None;
    let mut pending_blank = false;
    let mut offset = 0;

    for (index, raw_line) in source.split_inclusive('\n').enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let line_start = offset;
        let line_end = offset + line.len();
        offset += raw_line.len();

        let was_open = fence.is_open();
        let outcome = advance_fence_state(line, fence);
        fence = outcome.next_state;
        if !was_open && fence.is_open() {
            fence_opened_at = SourceLocation::new(line_no, 1);
        }

        if !outcome.in_code && line.trim().is_empty() {
            if current.is_some() {
                pending_blank = true;
            }
            continue;
        }

        let continues = !pending_blank || line.starts_with([' ', '\t']);
        match current.as_mut() {
            Some(segment) if continues => segment.end = line_end,
            _ => {
                if let Some(done) = current.take() {
                    segments.push(done);
                }
                current = Some(Segment {
                    start: line_start,
                    end: line_end,
                    first_line: line_no,
                });
            }
        }
        pending_blank = false;
    }

    if let Some(done) = current {
        segments.push(done);
    }

    if fence.is_open() {
        diagnostics.add_warning(ParseWarning::UnclosedCodeFence {
            location: fence_opened_at,
            marker: fence.marker.unwrap_or('`'),
        });
    }

    (segments, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        let (segments, _) = split_segments(source);
        segments.iter().map(|s| s.text(source)).collect()
    }

    #[test]
    fn splits_on_blank_lines() {
        assert_eq!(
            texts("# Title\n\nParagraph one\nstill one\n\n\nTwo\n"),
            vec!["# Title", "Paragraph one\nstill one", "Two"]
        );
    }

    #[test]
    fn keeps_fenced_code_whole() {
        let source = "```js\nlet a = 1;\n\nlet b = 2;\n```\n\nAfter";
        assert_eq!(
            texts(source),
            vec!["```js\nlet a = 1;\n\nlet b = 2;\n```", "After"]
        );
    }

    #[test]
    fn indented_lines_continue_after_blank() {
        let source = "- item\n\n  more of the item\n\nNext";
        assert_eq!(texts(source), vec!["- item\n\n  more of the item", "Next"]);
    }

    #[test]
    fn records_first_line_numbers() {
        let (segments, _) = split_segments("a\n\nb\n\n\nc");
        let lines: Vec<usize> = segments.iter().map(|s| s.first_line).collect();
        assert_eq!(lines, vec![1, 3, 6]);
    }

    #[test]
    fn warns_on_unclosed_fence() {
        let (segments, diagnostics) = split_segments("text\n\n```\ncode");
        assert_eq!(segments.len(), 2);
        assert_eq!(
            diagnostics.warnings,
            vec![ParseWarning::UnclosedCodeFence {
                location: SourceLocation::new(3, 1),
                marker: '`',
            }]
        );
    }

    #[test]
    fn detects_jsx_openers() {
        let source = "<Card>\n\n</Card>\n\n<ui.Tabs sync>\n\n<>";
        let (segments, _) = split_segments(source);
        let tags: Vec<_> = segments.iter().map(|s| s.opened_tag(source)).collect();
        assert_eq!(tags, vec![Some("Card"), None, Some("ui.Tabs"), Some("")]);
    }
}
