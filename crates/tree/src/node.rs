//! The editable document tree.

use mdxdoc_core::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A block, inline container, or void element.
    Element(Element),
    /// A run of text; always a leaf.
    Text(Text),
}

/// A formatting mark on a text leaf.
///
/// Declaration order is the nesting order used when writing markers,
/// outermost first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    /// `<u>…</u>`
    Underline,
    /// `~~…~~`
    Strikethrough,
    /// `**…**`
    Bold,
    /// `*…*`
    Italic,
    /// `` `…` ``
    Code,
}

impl Mark {
    /// Every mark, in nesting order.
    pub const ALL: [Mark; 5] = [
        Mark::Underline,
        Mark::Strikethrough,
        Mark::Bold,
        Mark::Italic,
        Mark::Code,
    ];

    /// The mark's name in JSON.
    pub fn name(self) -> &'static str {
        match self {
            Mark::Underline => "underline",
            Mark::Strikethrough => "strikethrough",
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Code => "code",
        }
    }
}

/// The set of marks on a text leaf. Duplicates cannot be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marks(BTreeSet<Mark>);

impl Marks {
    /// No marks.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this set with `mark` added.
    pub fn with(&self, mark: Mark) -> Self {
        let mut marks = self.clone();
        marks.0.insert(mark);
        marks
    }

    /// Adds a mark; returns false when it was already present.
    pub fn insert(&mut self, mark: Mark) -> bool {
        self.0.insert(mark)
    }

    /// Whether the set holds `mark`.
    pub fn contains(&self, mark: Mark) -> bool {
        self.0.contains(&mark)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Marks in nesting order.
    pub fn iter(&self) -> impl Iterator<Item = Mark> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Mark> for Marks {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        Marks(iter.into_iter().collect())
    }
}

/// A text leaf.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    /// Literal content; `\n` is a line break.
    pub text: String,
    /// Formatting applied to the whole run.
    pub marks: Marks,
}

impl Text {
    /// Unformatted text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::new(),
        }
    }

    /// Text carrying `marks`.
    pub fn marked(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        Self {
            text: text.into(),
            marks: marks.into_iter().collect(),
        }
    }
}

/// Text alignment set by the editor. Markdown has no syntax for it, so it is
/// not written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
    /// Justified.
    Justify,
}

/// A heading depth between 1 and 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Returns `None` outside `1..=6`.
    pub fn new(level: u8) -> Option<Self> {
        (1..=6).contains(&level).then_some(Self(level))
    }

    /// Clamps any depth into range.
    pub fn clamped(level: u8) -> Self {
        Self(level.clamp(1, 6))
    }

    /// The depth as a number.
    pub fn get(self) -> u8 {
        self.0
    }
}

/// A named attribute on a custom component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, unique within its component.
    pub name: String,
    /// Decoded value.
    pub value: AttributeValue,
}

impl Attribute {
    /// Creates an attribute.
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A custom component invocation (`<Name …>…</Name>`).
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Correlates the node with its open editing panel.
    pub id: String,
    /// JSX element name, e.g. `Callout` or `ui.Tabs`.
    pub name: String,
    /// Named attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Spread attribute expressions (`{...props}`), without braces.
    pub spread: Vec<String>,
    /// Body content, as its own document tree.
    pub react_children: Vec<Node>,
}

impl Component {
    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }
}

/// What an element is, with the data specific to that kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Paragraph of inline content.
    Paragraph,
    /// `#`-style heading.
    Heading(HeadingLevel),
    /// `>` quoted blocks.
    BlockQuote,
    /// Numbered list starting at `start`.
    OrderedList {
        /// Number of the first item.
        start: u32,
    },
    /// Bulleted list.
    UnorderedList,
    /// A list entry: one `ListItemText`, then nested lists.
    ListItem,
    /// The inline content of a list item.
    ListItemText,
    /// Fenced code; children are `CodeLine`s.
    CodeBlock {
        /// Language tag after the opening fence.
        lang: Option<String>,
        /// Anything after the language tag.
        meta: Option<String>,
    },
    /// One line of a code block.
    CodeLine,
    /// Horizontal rule.
    ThematicBreak,
    /// Hyperlink around inline children.
    Link {
        /// Destination.
        url: String,
        /// Optional title.
        title: Option<String>,
    },
    /// Image reference (void).
    Image {
        /// File reference.
        url: String,
        /// Optional title.
        title: Option<String>,
        /// Alt text, shown as the caption.
        alt: String,
    },
    /// Custom component (void; its body lives in `react_children`).
    Component(Component),
}

impl ElementKind {
    /// Whether the element sits in the flow of inline content.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            ElementKind::Link { .. } | ElementKind::Image { .. }
        )
    }

    /// Whether the element is a void node (no editable children).
    pub fn is_void(&self) -> bool {
        matches!(
            self,
            ElementKind::Image { .. } | ElementKind::Component(_) | ElementKind::ThematicBreak
        )
    }

    /// Whether the element is either kind of list.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            ElementKind::OrderedList { .. } | ElementKind::UnorderedList
        )
    }
}

/// An element node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Kind and kind-specific data.
    pub kind: ElementKind,
    /// Child nodes; empty for void elements.
    pub children: Vec<Node>,
    /// Optional text alignment.
    pub align: Option<Align>,
}

impl Element {
    /// Creates an element without alignment.
    pub fn new(kind: ElementKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            align: None,
        }
    }
}

impl Node {
    /// Wraps an element.
    pub fn element(kind: ElementKind, children: Vec<Node>) -> Self {
        Node::Element(Element::new(kind, children))
    }

    /// Unformatted text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::plain(text))
    }

    /// A paragraph holding a single empty text leaf.
    pub fn empty_paragraph() -> Self {
        Node::element(ElementKind::Paragraph, vec![Node::text("")])
    }

    /// Paragraph with the given inline children.
    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::element(ElementKind::Paragraph, children)
    }

    /// The element, when this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// The element kind, when this is an element.
    pub fn kind(&self) -> Option<&ElementKind> {
        self.as_element().map(|element| &element.kind)
    }

    /// Whether this node is inline content (text, link or image).
    pub fn is_inline(&self) -> bool {
        match self {
            Node::Text(_) => true,
            Node::Element(element) => element.kind.is_inline(),
        }
    }

    /// Whether this is a paragraph with no visible text.
    pub fn is_empty_paragraph(&self) -> bool {
        match self {
            Node::Element(Element {
                kind: ElementKind::Paragraph,
                children,
                ..
            }) => children
                .iter()
                .all(|child| matches!(child, Node::Text(text) if text.text.trim().is_empty())),
            _ => false,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut buffer = String::new();
        collect_text(self, &mut buffer);
        buffer
    }
}

fn collect_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(text) => buffer.push_str(&text.text),
        Node::Element(element) => match &element.kind {
            ElementKind::Image { alt, .. } => buffer.push_str(alt),
            ElementKind::Component(component) => {
                for child in &component.react_children {
                    collect_text(child, buffer);
                }
            }
            _ => {
                for child in &element.children {
                    collect_text(child, buffer);
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_are_a_set_in_nesting_order() {
        let mut marks = Marks::new();
        assert!(marks.insert(Mark::Italic));
        assert!(marks.insert(Mark::Bold));
        assert!(!marks.insert(Mark::Italic));
        assert_eq!(marks.iter().collect::<Vec<_>>(), vec![Mark::Bold, Mark::Italic]);
    }

    #[test]
    fn marks_serialize_as_names() {
        let marks: Marks = [Mark::Code, Mark::Underline].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&marks).unwrap(),
            r#"["underline","code"]"#
        );
    }

    #[test]
    fn heading_level_bounds() {
        assert!(HeadingLevel::new(0).is_none());
        assert_eq!(HeadingLevel::new(6).map(HeadingLevel::get), Some(6));
        assert_eq!(HeadingLevel::clamped(9).get(), 6);
    }

    #[test]
    fn empty_paragraph_detection() {
        assert!(Node::empty_paragraph().is_empty_paragraph());
        assert!(Node::paragraph(vec![Node::text("  ")]).is_empty_paragraph());
        assert!(!Node::paragraph(vec![Node::text("x")]).is_empty_paragraph());
    }

    #[test]
    fn plain_text_walks_components_and_images() {
        let node = Node::paragraph(vec![
            Node::text("a "),
            Node::element(
                ElementKind::Image {
                    url: "x.png".into(),
                    title: None,
                    alt: "pic".into(),
                },
                vec![],
            ),
        ]);
        assert_eq!(node.plain_text(), "a pic");
    }
}
