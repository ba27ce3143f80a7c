//! Inline content: text with marks, links, images and text components.

use super::component::{opening_tag, self_closes};
use crate::error::{NodePath, TreeError};
use crate::node::{Element, ElementKind, Mark, Marks, Node, Text};
use crate::node_types::DEFAULT_NODE_TYPES;

/// Serializes inline children. `\n` in text becomes a hard break.
pub(super) fn inline(children: &[Node], path: &NodePath) -> Result<String, TreeError> {
    inline_run(children, path, 0)
}

/// Serializes inline children on one line; breaks become spaces.
pub(super) fn inline_single_line(children: &[Node], path: &NodePath) -> Result<String, TreeError> {
    let mut writer = InlineWriter::new(true);
    writer.nodes(children, path, 0)?;
    Ok(writer.finish())
}

/// Serializes a run of inline nodes taken from a larger sibling list that
/// starts at `first_index`.
pub(super) fn inline_run(
    nodes: &[Node],
    path: &NodePath,
    first_index: usize,
) -> Result<String, TreeError> {
    let mut writer = InlineWriter::new(false);
    writer.nodes(nodes, path, first_index)?;
    Ok(writer.finish())
}

/// Whether a node is written as part of a line of text.
pub(super) fn is_phrasing(node: &Node) -> bool {
    node.is_inline()
}

/// Writes marks as a stack: marks shared by neighbouring leaves stay open,
/// and whitespace at the edge of a leaf is held back until the next leaf
/// decides which side of the markers it belongs on.
struct InlineWriter {
    out: String,
    open: Vec<Mark>,
    pending_space: String,
    pending_break: bool,
    line_start: bool,
    single_line: bool,
    /// Output length right after a text `!`; a following link must not
    /// turn it into an image.
    bang_end: Option<usize>,
    /// The last thing written is a `*`/`~` closer preceded by punctuation,
    /// so a letter directly after it would stop it from closing.
    closer_needs_gap: bool,
}

impl InlineWriter {
    fn new(single_line: bool) -> Self {
        Self {
            out: String::new(),
            open: Vec::new(),
            pending_space: String::new(),
            pending_break: false,
            line_start: true,
            single_line,
            bang_end: None,
            closer_needs_gap: false,
        }
    }

    fn nodes(&mut self, nodes: &[Node], path: &NodePath, first_index: usize) -> Result<(), TreeError> {
        for (offset, node) in nodes.iter().enumerate() {
            let node_path = path.child(first_index + offset);
            match node {
                Node::Text(text) => self.text(text),
                Node::Element(element) => self.element(element, &node_path)?,
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &Text) {
        for (index, line) in text.text.split('\n').enumerate() {
            if index > 0 {
                if self.single_line {
                    self.pending_space.push(' ');
                } else if !self.out.is_empty() {
                    self.pending_break = true;
                }
            }
            self.segment(line, &text.marks);
        }
    }

    fn segment(&mut self, segment: &str, marks: &Marks) {
        if segment.is_empty() {
            return;
        }
        let wanted: Vec<Mark> = marks.iter().filter(|mark| *mark != Mark::Code).collect();
        let code = marks.contains(Mark::Code);

        let core = if code { segment } else { segment.trim() };
        if core.is_empty() {
            self.close_beyond(common_prefix(&self.open, &wanted));
            self.pending_space.push_str(segment);
            return;
        }
        let leading_len = if code {
            0
        } else {
            segment.len() - segment.trim_start().len()
        };
        let (leading, rest) = segment.split_at(leading_len);
        let trailing = &rest[core.len()..];

        let shared = common_prefix(&self.open, &wanted);
        self.close_beyond(shared);
        self.flush_break();
        let space = std::mem::take(&mut self.pending_space);
        let after_closer =
            std::mem::take(&mut self.closer_needs_gap) && space.is_empty() && leading.is_empty();
        // Whitespace opening a line is stripped by the parser.
        if !self.line_start {
            self.out.push_str(&space);
            self.out.push_str(leading);
        }

        let mut content = String::with_capacity(core.len());
        if code {
            push_code_span(&mut content, core);
        } else {
            push_escaped(&mut content, core, self.line_start);
        }

        let opened = &wanted[shared..];
        if let Some(outer) = opened.first() {
            // An opener squeezed between a letter and punctuation cannot open.
            let inner = match opened.get(1) {
                Some(next) => opening(*next).chars().next(),
                None => content.chars().next(),
            };
            if *outer != Mark::Underline
                && inner.is_some_and(is_punctuation)
                && self.out.chars().next_back().is_some_and(char::is_alphanumeric)
            {
                encode_last_char(&mut self.out);
            }
            for mark in opened {
                self.out.push_str(opening(*mark));
                self.open.push(*mark);
            }
        } else if after_closer && content.starts_with(char::is_alphanumeric) {
            content = encode_first_char(&content);
        }

        self.out.push_str(&content);
        self.bang_end = (!code && core.ends_with('!')).then_some(self.out.len());
        self.line_start = false;
        self.pending_space.push_str(trailing);
    }

    fn element(&mut self, element: &Element, path: &NodePath) -> Result<(), TreeError> {
        self.close_beyond(0);
        self.flush_break();
        let space = std::mem::take(&mut self.pending_space);
        if !self.line_start {
            self.out.push_str(&space);
        }
        self.closer_needs_gap = false;

        match &element.kind {
            ElementKind::Link { url, title } => {
                if let Some(end) = self.bang_end
                    && end == self.out.len()
                {
                    self.out.insert(end - 1, '\\');
                }
                let mut label = InlineWriter::new(self.single_line);
                label.line_start = false;
                label.nodes(&element.children, path, 0)?;
                self.out.push('[');
                self.out.push_str(&label.finish());
                self.out.push_str("](");
                push_destination(&mut self.out, url, title.as_deref());
                self.out.push(')');
            }
            ElementKind::Image { url, title, alt } => {
                self.out.push_str("![");
                push_escaped(&mut self.out, alt, false);
                self.out.push_str("](");
                push_destination(&mut self.out, url, title.as_deref());
                self.out.push(')');
            }
            ElementKind::Component(component) => {
                let open = opening_tag(component);
                if self_closes(&component.react_children) {
                    self.out.push_str(&open);
                    self.out.push_str(" />");
                } else {
                    let mut body = InlineWriter::new(self.single_line);
                    body.line_start = false;
                    body.nodes(&component.react_children, path, 0)?;
                    self.out.push_str(&open);
                    self.out.push('>');
                    self.out.push_str(&body.finish());
                    self.out.push_str("</");
                    self.out.push_str(&component.name);
                    self.out.push('>');
                }
            }
            other => {
                return Err(TreeError::Misplaced {
                    kind: DEFAULT_NODE_TYPES.tag_of(other).to_string(),
                    path: path.clone(),
                });
            }
        }

        self.bang_end = None;
        self.line_start = false;
        Ok(())
    }

    fn flush_break(&mut self) {
        if std::mem::take(&mut self.pending_break) {
            self.out.push_str(&std::mem::take(&mut self.pending_space));
            self.out.push_str("\\\n");
            self.line_start = true;
            self.closer_needs_gap = false;
        }
    }

    fn close_beyond(&mut self, keep: usize) {
        while self.open.len() > keep {
            if let Some(mark) = self.open.pop() {
                let after_punctuation = self.out.chars().next_back().is_some_and(is_punctuation);
                self.out.push_str(closing(mark));
                self.closer_needs_gap = mark != Mark::Underline && after_punctuation;
            }
        }
    }

    /// Closes every mark; trailing whitespace and breaks at the end of a
    /// block would not survive a parse, so they are dropped.
    fn finish(mut self) -> String {
        self.close_beyond(0);
        self.out
    }
}

fn common_prefix(open: &[Mark], wanted: &[Mark]) -> usize {
    open.iter()
        .zip(wanted)
        .take_while(|(open, wanted)| open == wanted)
        .count()
}

fn opening(mark: Mark) -> &'static str {
    match mark {
        Mark::Underline => "<u>",
        Mark::Strikethrough => "~~",
        Mark::Bold => "**",
        Mark::Italic => "*",
        Mark::Code => "`",
    }
}

fn closing(mark: Mark) -> &'static str {
    match mark {
        Mark::Underline => "</u>",
        other => opening(other),
    }
}

/// Punctuation as emphasis flanking sees it: anything that is neither a
/// letter, a digit nor whitespace.
fn is_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

/// Replaces the last written character with a character reference, which
/// the flanking rules read as punctuation.
fn encode_last_char(out: &mut String) {
    if let Some(c) = out.pop() {
        out.push_str(&char_reference(c));
    }
}

fn encode_first_char(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) => char_reference(c) + chars.as_str(),
        None => String::new(),
    }
}

fn char_reference(c: char) -> String {
    format!("&#x{:X};", u32::from(c))
}

/// Writes a code span whose fence is longer than any backtick run inside.
fn push_code_span(out: &mut String, code: &str) {
    let fence = "`".repeat(longest_run(code, '`') + 1);
    let pad = code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
    out.push_str(&fence);
    if pad {
        out.push(' ');
    }
    out.push_str(code);
    if pad {
        out.push(' ');
    }
    out.push_str(&fence);
}

/// Length of the longest run of `c` in `text`.
pub(super) fn longest_run(text: &str, c: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == c {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Backslash-escapes characters that would otherwise start markup. At the
/// start of a line, block openers (`#`, `>`, list markers, setext
/// underlines) are escaped too.
pub(super) fn push_escaped(out: &mut String, text: &str, line_start: bool) {
    let block_escape = if line_start {
        block_start_escape(text)
    } else {
        None
    };
    for (index, c) in text.char_indices() {
        if block_escape == Some(index)
            || matches!(
                c,
                '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '{' | '}' | '~' | '&'
            )
        {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Byte index of the character to escape so a line is not read as a block
/// opener.
fn block_start_escape(line: &str) -> Option<usize> {
    let first = line.chars().next()?;
    let spaced_after = |index: usize| line[index..].chars().next().is_none_or(char::is_whitespace);
    match first {
        '>' => Some(0),
        '#' => {
            let run = line.len() - line.trim_start_matches('#').len();
            (run <= 6 && spaced_after(run)).then_some(0)
        }
        '-' | '+' | '=' => {
            let underline = line
                .trim_end()
                .chars()
                .all(|c| c == first || c == ' ' || c == '\t');
            (spaced_after(1) || underline).then_some(0)
        }
        '0'..='9' => {
            let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            let delimiter = line[digits..].chars().next();
            (digits <= 9 && matches!(delimiter, Some('.' | ')')) && spaced_after(digits + 1))
                .then_some(digits)
        }
        _ => None,
    }
}

fn push_destination(out: &mut String, url: &str, title: Option<&str>) {
    if url.is_empty() || url.contains([' ', '\t', '\n', '(', ')', '<', '>']) {
        out.push('<');
        for c in url.chars() {
            if matches!(c, '\\' | '<' | '>') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('>');
    } else {
        out.push_str(&url.replace('\\', "\\\\"));
    }

    if let Some(title) = title {
        out.push_str(" \"");
        for c in title.chars() {
            if matches!(c, '\\' | '"') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(nodes: &[Node]) -> String {
        inline(nodes, &NodePath::root()).unwrap()
    }

    fn marked(text: &str, marks: &[Mark]) -> Node {
        Node::Text(Text::marked(text, marks.iter().copied()))
    }

    #[test]
    fn marks_wrap_in_fixed_order() {
        let out = run(&[marked(
            "all",
            &[Mark::Code, Mark::Italic, Mark::Underline, Mark::Bold, Mark::Strikethrough],
        )]);
        assert_eq!(out, "<u>~~***`all`***~~</u>");
    }

    #[test]
    fn shared_marks_stay_open() {
        let out = run(&[
            marked("bold ", &[Mark::Bold]),
            marked("both", &[Mark::Bold, Mark::Italic]),
            Node::text(" plain"),
        ]);
        assert_eq!(out, "**bold *both*** plain");
    }

    #[test]
    fn whitespace_moves_outside_markers() {
        let out = run(&[
            Node::text("a"),
            marked(" b ", &[Mark::Bold]),
            Node::text("c"),
        ]);
        assert_eq!(out, "a **b** c");
    }

    #[test]
    fn separate_runs_are_not_merged_over_plain_space() {
        let out = run(&[
            marked("a", &[Mark::Bold]),
            Node::text(" "),
            marked("b", &[Mark::Bold]),
        ]);
        assert_eq!(out, "**a** **b**");
    }

    #[test]
    fn specials_are_escaped() {
        assert_eq!(
            run(&[Node::text("a *b* [c] <D/> {e} ~f~ `g` _h_ \\ &amp;")]),
            "a \\*b\\* \\[c\\] \\<D/> \\{e\\} \\~f\\~ \\`g\\` \\_h\\_ \\\\ \\&amp;"
        );
    }

    #[test]
    fn block_openers_are_escaped_at_line_start_only() {
        assert_eq!(run(&[Node::text("# not a heading")]), "\\# not a heading");
        assert_eq!(run(&[Node::text("#tag")]), "#tag");
        assert_eq!(run(&[Node::text("- item")]), "\\- item");
        assert_eq!(run(&[Node::text("-5 degrees")]), "-5 degrees");
        assert_eq!(run(&[Node::text("2024. A year")]), "2024\\. A year");
        assert_eq!(run(&[Node::text("3.14")]), "3.14");
        assert_eq!(run(&[Node::text("> quote")]), "\\> quote");
        assert_eq!(run(&[Node::text("a # b > c")]), "a # b > c");
        assert_eq!(run(&[Node::text("line\n---")]), "line\\\n\\---");
    }

    #[test]
    fn newlines_become_hard_breaks() {
        assert_eq!(
            run(&[marked("one\ntwo", &[Mark::Bold])]),
            "**one\\\ntwo**"
        );
        assert_eq!(run(&[Node::text("end\n")]), "end");
        assert_eq!(
            inline_single_line(&[Node::text("one\ntwo")], &NodePath::root()).unwrap(),
            "one two"
        );
    }

    #[test]
    fn code_spans_outgrow_inner_backticks() {
        assert_eq!(run(&[marked("a`b", &[Mark::Code])]), "``a`b``");
        assert_eq!(run(&[marked("`x", &[Mark::Code])]), "`` `x ``");
        assert_eq!(run(&[marked("*raw*", &[Mark::Code])]), "`*raw*`");
    }

    #[test]
    fn links_and_images() {
        let link = Node::element(
            ElementKind::Link {
                url: "https://x.dev/a b".into(),
                title: Some("say \"hi\"".into()),
            },
            vec![marked("go", &[Mark::Bold])],
        );
        assert_eq!(
            run(&[Node::text("Wow!"), link]),
            "Wow\\![**go**](<https://x.dev/a b> \"say \\\"hi\\\"\")"
        );

        let image = Node::element(
            ElementKind::Image {
                url: "img/cat.png".into(),
                title: None,
                alt: "a [cat]".into(),
            },
            vec![],
        );
        assert_eq!(run(&[image]), "![a \\[cat\\]](img/cat.png)");
    }

    #[test]
    fn marks_close_around_elements() {
        let link = Node::element(
            ElementKind::Link {
                url: "u".into(),
                title: None,
            },
            vec![Node::text("l")],
        );
        assert_eq!(
            run(&[marked("a", &[Mark::Italic]), link, marked("b", &[Mark::Italic])]),
            "*a*[l](u)*b*"
        );
    }

    #[test]
    fn markers_between_letters_and_punctuation_still_flank() {
        assert_eq!(
            run(&[
                Node::text("see"),
                marked("(note)", &[Mark::Bold]),
                Node::text("x"),
            ]),
            "se&#x65;**(note)**&#x78;"
        );
        assert_eq!(
            run(&[marked("a.", &[Mark::Bold]), Node::text("b")]),
            "**a.**&#x62;"
        );
        assert_eq!(
            run(&[marked("end.", &[Mark::Italic]), Node::text(" next")]),
            "*end.* next"
        );
        assert_eq!(
            run(&[Node::text("a"), marked("b", &[Mark::Strikethrough]), Node::text("c")]),
            "a~~b~~c"
        );
    }

    #[test]
    fn leading_whitespace_on_a_line_is_dropped() {
        assert_eq!(run(&[Node::text("  hi")]), "hi");
        assert_eq!(run(&[Node::text("one\n   two")]), "one\\\ntwo");
        assert_eq!(
            run(&[Node::text(" "), marked("b", &[Mark::Bold])]),
            "**b**"
        );
        assert_eq!(run(&[Node::text("a  b")]), "a  b");
    }

    #[test]
    fn block_elements_are_rejected() {
        let err = inline(
            &[Node::element(ElementKind::ThematicBreak, vec![])],
            &NodePath::root(),
        )
        .unwrap_err();
        assert!(matches!(err, TreeError::Misplaced { kind, .. } if kind == "thematic_break"));
    }
}
