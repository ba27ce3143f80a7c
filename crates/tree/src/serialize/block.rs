//! Block layout: paragraphs, headings, quotes, lists, code and components.

use super::component::{opening_tag, self_closes};
use super::inline::{inline, inline_run, inline_single_line, is_phrasing, longest_run};
use crate::error::{NodePath, TreeError};
use crate::node::{Component, Element, ElementKind, HeadingLevel, Node};
use crate::node_types::DEFAULT_NODE_TYPES;
use crate::validate::list_item_parts;

/// Marker style of the last list written, so the next list of the same kind
/// can switch markers and stay a separate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListStyle {
    ordered: bool,
    alternate: bool,
}

impl ListStyle {
    fn after(previous: Option<ListStyle>, kind: &ElementKind) -> Self {
        let ordered = matches!(kind, ElementKind::OrderedList { .. });
        let alternate = previous.is_some_and(|prev| prev.ordered == ordered && !prev.alternate);
        Self { ordered, alternate }
    }

    fn marker(self, index: usize, start: u32) -> String {
        match (self.ordered, self.alternate) {
            (false, false) => "-".to_string(),
            (false, true) => "*".to_string(),
            (true, alternate) => {
                let number = u64::from(start) + index as u64;
                format!("{number}{}", if alternate { ')' } else { '.' })
            }
        }
    }
}

/// What a written block looks like to the parser reading the line after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Paragraph,
    /// ATX heading or fenced code: ends on its own line and may interrupt a
    /// paragraph.
    Interrupting,
    Break,
    Quote,
    List { interrupts: bool },
    Component,
}

impl Shape {
    fn of(element: &Element, written: &str) -> Self {
        match &element.kind {
            ElementKind::Heading(_) | ElementKind::CodeBlock { .. } => Shape::Interrupting,
            ElementKind::ThematicBreak => Shape::Break,
            ElementKind::BlockQuote => Shape::Quote,
            ElementKind::OrderedList { .. } | ElementKind::UnorderedList => Shape::List {
                interrupts: interrupts_paragraph(element, written),
            },
            ElementKind::Component(_) => Shape::Component,
            _ => Shape::Paragraph,
        }
    }

    /// Whether `next` keeps its own shape when written on the very next
    /// line. Open containers take lazy continuation lines, so only a block
    /// that interrupts paragraphs may follow one directly; `---` under
    /// paragraph text is a setext underline.
    fn tight_before(self, next: Shape) -> bool {
        match self {
            Shape::Interrupting | Shape::Break => true,
            Shape::Paragraph => matches!(
                next,
                Shape::Interrupting | Shape::Quote | Shape::List { interrupts: true }
            ),
            Shape::Quote | Shape::List { .. } | Shape::Component => false,
        }
    }
}

/// Whether a written list may start on the line right under paragraph
/// text: its first item needs content, and an ordered list must start at 1.
fn interrupts_paragraph(list: &Element, written: &str) -> bool {
    let first_item_has_text = written
        .split('\n')
        .next()
        .is_some_and(|line| line.contains(' '));
    let starts_at_one = !matches!(list.kind, ElementKind::OrderedList { start } if start != 1);
    first_item_has_text && starts_at_one
}

/// Writes block sequences. Blocks are separated by a blank line; a `tight`
/// writer uses a single newline wherever that keeps both blocks intact.
pub(super) struct BlockWriter {
    pub(super) tight: bool,
}

impl BlockWriter {
    /// Serializes a block sequence. Empty paragraphs are dropped and runs
    /// of inline nodes are written as one paragraph.
    pub(super) fn blocks(&self, nodes: &[Node], path: &NodePath) -> Result<String, TreeError> {
        let mut parts: Vec<(Shape, String)> = Vec::with_capacity(nodes.len());
        let mut previous_list: Option<ListStyle> = None;

        let mut index = 0;
        while index < nodes.len() {
            let element = match &nodes[index] {
                Node::Element(element) if !is_phrasing(&nodes[index]) => element,
                _ => {
                    let run = nodes[index..].iter().take_while(|n| is_phrasing(n)).count();
                    let text = inline_run(&nodes[index..index + run], path, index)?;
                    if !text.trim().is_empty() {
                        parts.push((Shape::Paragraph, text));
                        previous_list = None;
                    }
                    index += run;
                    continue;
                }
            };
            if nodes[index].is_empty_paragraph() {
                index += 1;
                continue;
            }

            let child_path = path.child(index);
            let written = if element.kind.is_list() {
                let style = ListStyle::after(previous_list, &element.kind);
                previous_list = Some(style);
                self.list(element, &child_path, style)?
            } else {
                previous_list = None;
                self.block(element, &child_path)?
            };
            parts.push((Shape::of(element, &written), written));
            index += 1;
        }

        let mut out = String::new();
        let mut previous: Option<Shape> = None;
        for (shape, text) in parts {
            if let Some(previous) = previous {
                let tight = self.tight && previous.tight_before(shape);
                out.push_str(if tight { "\n" } else { "\n\n" });
            }
            out.push_str(&text);
            previous = Some(shape);
        }
        Ok(out)
    }

    /// Serializes one block element.
    pub(super) fn block(&self, element: &Element, path: &NodePath) -> Result<String, TreeError> {
        match &element.kind {
            ElementKind::Paragraph => inline(&element.children, path),
            ElementKind::Heading(level) => heading(*level, &element.children, path),
            ElementKind::BlockQuote => Ok(quote(&self.blocks(&element.children, path)?)),
            ElementKind::OrderedList { .. } | ElementKind::UnorderedList => {
                self.list(element, path, ListStyle::after(None, &element.kind))
            }
            ElementKind::CodeBlock { lang, meta } => {
                code_block(lang.as_deref(), meta.as_deref(), &element.children, path)
            }
            ElementKind::ThematicBreak => Ok("---".to_string()),
            ElementKind::Component(component) => self.component(component, path),
            ElementKind::Link { .. }
            | ElementKind::Image { .. }
            | ElementKind::ListItem
            | ElementKind::ListItemText
            | ElementKind::CodeLine => {
                Err(TreeError::Misplaced {
                    kind: DEFAULT_NODE_TYPES.tag_of(&element.kind).to_string(),
                    path: path.clone(),
                })
            }
        }
    }

    fn list(&self, list: &Element, path: &NodePath, style: ListStyle) -> Result<String, TreeError> {
        let start = match list.kind {
            ElementKind::OrderedList { start } => start,
            _ => 1,
        };

        let mut items = Vec::with_capacity(list.children.len());
        for (index, child) in list.children.iter().enumerate() {
            let item_path = path.child(index);
            let item = match child {
                Node::Element(item) if item.kind == ElementKind::ListItem => item,
                _ => return Err(TreeError::ListChild { path: item_path }),
            };
            items.push(self.list_item(item, &item_path, &style.marker(index, start))?);
        }
        Ok(items.join("\n"))
    }

    /// Item text on the marker line, nested lists below it, everything
    /// after the first line indented past the marker.
    fn list_item(&self, item: &Element, path: &NodePath, marker: &str) -> Result<String, TreeError> {
        let (text, nested) = list_item_parts(item, path)?;
        let mut body = inline(&text.children, &path.child(0))?;

        let mut previous = None;
        for (offset, child) in nested.iter().enumerate() {
            let list_path = path.child(offset + 1);
            let Node::Element(list) = child else {
                return Err(TreeError::ListItemShape {
                    path: path.clone(),
                    reason: "only lists may follow the text",
                });
            };
            let style = ListStyle::after(previous, &list.kind);
            let written = self.list(list, &list_path, style)?;
            if !body.is_empty() && !interrupts_paragraph(list, &written) {
                body.push('\n');
            }
            body.push('\n');
            body.push_str(&written);
            previous = Some(style);
        }

        let indent = " ".repeat(marker.len() + 1);
        let mut out = String::with_capacity(body.len() + marker.len() + 1);
        for (index, line) in body.split('\n').enumerate() {
            if index == 0 {
                out.push_str(marker);
                if !line.is_empty() {
                    out.push(' ');
                }
            } else {
                out.push('\n');
                if !line.is_empty() {
                    out.push_str(&indent);
                }
            }
            out.push_str(line);
        }
        Ok(out)
    }

    fn component(&self, component: &Component, path: &NodePath) -> Result<String, TreeError> {
        let open = opening_tag(component);
        if self_closes(&component.react_children) {
            return Ok(format!("{open} />"));
        }
        let body = self.blocks(&component.react_children, path)?;
        if body.is_empty() {
            return Ok(format!("{open} />"));
        }
        Ok(format!("{open}>\n\n{body}\n\n</{}>", component.name))
    }
}

fn heading(level: HeadingLevel, children: &[Node], path: &NodePath) -> Result<String, TreeError> {
    let hashes = "#".repeat(usize::from(level.get()));
    let mut text = inline_single_line(children, path)?;
    if text.is_empty() {
        return Ok(hashes);
    }

    // A trailing run of `#` after a space would be read as a closing sequence.
    let kept = text.trim_end_matches('#').len();
    if kept < text.len() && text[..kept].ends_with([' ', '\t']) {
        text.insert(kept, '\\');
    }
    Ok(format!("{hashes} {text}"))
}

fn quote(inner: &str) -> String {
    if inner.is_empty() {
        return ">".to_string();
    }
    inner
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn code_block(
    lang: Option<&str>,
    meta: Option<&str>,
    children: &[Node],
    path: &NodePath,
) -> Result<String, TreeError> {
    let mut lines = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        match child {
            Node::Element(line) if line.kind == ElementKind::CodeLine => {
                lines.push(child.plain_text());
            }
            _ => return Err(TreeError::CodeChild {
                path: path.child(index),
            }),
        }
    }

    let info = match (lang, meta) {
        (Some(lang), Some(meta)) => format!("{lang} {meta}"),
        (Some(lang), None) => lang.to_string(),
        (None, Some(meta)) => format!(" {meta}"),
        (None, None) => String::new(),
    };
    let content = lines.join("\n");
    let fence_char = if info.contains('`') { '~' } else { '`' };
    let fence = fence_char
        .to_string()
        .repeat(longest_run(&content, fence_char).max(2) + 1);

    if lines.is_empty() {
        Ok(format!("{fence}{info}\n{fence}"))
    } else {
        Ok(format!("{fence}{info}\n{content}\n{fence}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Text;

    fn writer() -> BlockWriter {
        BlockWriter { tight: false }
    }

    fn item(text: &str, nested: Vec<Node>) -> Node {
        let mut children = vec![Node::element(
            ElementKind::ListItemText,
            vec![Node::text(text)],
        )];
        children.extend(nested);
        Node::element(ElementKind::ListItem, children)
    }

    fn unordered(items: Vec<Node>) -> Node {
        Node::element(ElementKind::UnorderedList, items)
    }

    fn ordered(start: u32, items: Vec<Node>) -> Node {
        Node::element(ElementKind::OrderedList { start }, items)
    }

    #[test]
    fn nested_lists_indent_past_the_marker() {
        let tree = vec![ordered(
            9,
            vec![
                item("nine", vec![unordered(vec![item("inner", vec![])])]),
                item("ten", vec![ordered(1, vec![item("deep", vec![])])]),
            ],
        )];
        insta::assert_snapshot!(writer().blocks(&tree, &NodePath::root()).unwrap(), @r"
9. nine
   - inner
10. ten
    1. deep
");
    }

    #[test]
    fn adjacent_lists_alternate_markers() {
        let tree = vec![
            unordered(vec![item("a", vec![])]),
            Node::empty_paragraph(),
            unordered(vec![item("b", vec![])]),
            unordered(vec![item("c", vec![])]),
            ordered(1, vec![item("d", vec![])]),
            ordered(1, vec![item("e", vec![])]),
        ];
        assert_eq!(
            writer().blocks(&tree, &NodePath::root()).unwrap(),
            "- a\n\n* b\n\n- c\n\n1. d\n\n1) e"
        );
    }

    #[test]
    fn empty_item_text_keeps_nested_list() {
        let tree = vec![unordered(vec![item("", vec![unordered(vec![item(
            "x",
            vec![],
        )])])])];
        assert_eq!(
            writer().blocks(&tree, &NodePath::root()).unwrap(),
            "-\n  - x"
        );
    }

    #[test]
    fn nested_lists_that_cannot_interrupt_get_a_blank_line() {
        let tree = vec![unordered(vec![
            item("a", vec![ordered(3, vec![item("b", vec![])])]),
            item("c", vec![unordered(vec![item("", vec![]), item("x", vec![])])]),
            item("d", vec![ordered(1, vec![item("e", vec![])])]),
        ])];
        insta::assert_snapshot!(writer().blocks(&tree, &NodePath::root()).unwrap(), @r"
- a

  3. b
- c

  -
  - x
- d
  1. e
");
    }

    #[test]
    fn tight_writer_keeps_blank_lines_that_carry_structure() {
        let paragraph = |text: &str| Node::paragraph(vec![Node::text(text)]);
        let tree = vec![
            paragraph("Para"),
            Node::element(ElementKind::ThematicBreak, vec![]),
            paragraph("Next"),
            paragraph("More"),
            Node::element(ElementKind::Heading(HeadingLevel::clamped(2)), vec![Node::text("H")]),
            paragraph("Lead"),
            unordered(vec![item("one", vec![])]),
            paragraph("Count"),
            ordered(2, vec![item("two", vec![])]),
        ];
        insta::assert_snapshot!(BlockWriter { tight: true }.blocks(&tree, &NodePath::root()).unwrap(), @r"
Para

---
Next

More
## H
Lead
- one

Count

2. two
");
    }

    #[test]
    fn quotes_prefix_every_line() {
        let tree = vec![Node::element(
            ElementKind::BlockQuote,
            vec![
                Node::paragraph(vec![Node::text("one")]),
                Node::paragraph(vec![Node::text("two")]),
            ],
        )];
        assert_eq!(
            writer().blocks(&tree, &NodePath::root()).unwrap(),
            "> one\n>\n> two"
        );
    }

    #[test]
    fn code_fence_outgrows_content() {
        let lines = ["```", "inner"]
            .iter()
            .map(|line| Node::element(ElementKind::CodeLine, vec![Node::text(*line)]))
            .collect();
        let tree = vec![Node::element(
            ElementKind::CodeBlock {
                lang: Some("md".into()),
                meta: Some("title=x".into()),
            },
            lines,
        )];
        assert_eq!(
            writer().blocks(&tree, &NodePath::root()).unwrap(),
            "````md title=x\n```\ninner\n````"
        );
    }

    #[test]
    fn headings_escape_closing_sequences() {
        let tree = vec![
            Node::element(
                ElementKind::Heading(HeadingLevel::clamped(2)),
                vec![Node::text("C #")],
            ),
            Node::element(ElementKind::Heading(HeadingLevel::clamped(3)), vec![Node::text("")]),
        ];
        assert_eq!(
            writer().blocks(&tree, &NodePath::root()).unwrap(),
            "## C \\#\n\n###"
        );
    }

    #[test]
    fn component_bodies_group_loose_inline_nodes() {
        let component = Component {
            id: "c-1".into(),
            name: "Note".into(),
            attributes: vec![],
            spread: vec![],
            react_children: vec![
                Node::text("Loose "),
                Node::Text(Text::marked("text", [crate::node::Mark::Bold])),
            ],
        };
        let tree = vec![Node::element(ElementKind::Component(component), vec![])];
        assert_eq!(
            writer().blocks(&tree, &NodePath::root()).unwrap(),
            "<Note>\n\nLoose **text**\n\n</Note>"
        );
    }

    #[test]
    fn list_item_without_text_is_an_error() {
        let tree = vec![unordered(vec![Node::element(
            ElementKind::ListItem,
            vec![Node::paragraph(vec![Node::text("x")])],
        )])];
        let err = writer().blocks(&tree, &NodePath::root()).unwrap_err();
        assert!(matches!(err, TreeError::ListItemShape { .. }), "{err}");
    }
}
