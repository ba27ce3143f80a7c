//! Node `type` tags used by an installation.
//!
//! The tree itself is a closed enum; tags only matter where trees cross
//! into the editing surface as JSON. Installations may rename any tag,
//! e.g. `heading-1` to `h1`, and leave the rest at their defaults.

use crate::node::{ElementKind, HeadingLevel};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Default tags, shared by callers that do not configure their own.
pub static DEFAULT_NODE_TYPES: Lazy<NodeTypes> = Lazy::new(NodeTypes::default);

/// The kind of an element without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Paragraph.
    Paragraph,
    /// Heading at a depth.
    Heading(HeadingLevel),
    /// Block quote.
    BlockQuote,
    /// Ordered list.
    OrderedList,
    /// Unordered list.
    UnorderedList,
    /// List item.
    ListItem,
    /// List item text.
    ListItemText,
    /// Code block.
    CodeBlock,
    /// Code line.
    CodeLine,
    /// Thematic break.
    ThematicBreak,
    /// Link.
    Link,
    /// Image.
    Image,
    /// Custom component.
    CustomComponent,
}

impl NodeType {
    /// The type of an element kind.
    pub fn of(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Paragraph => NodeType::Paragraph,
            ElementKind::Heading(level) => NodeType::Heading(*level),
            ElementKind::BlockQuote => NodeType::BlockQuote,
            ElementKind::OrderedList { .. } => NodeType::OrderedList,
            ElementKind::UnorderedList => NodeType::UnorderedList,
            ElementKind::ListItem => NodeType::ListItem,
            ElementKind::ListItemText => NodeType::ListItemText,
            ElementKind::CodeBlock { .. } => NodeType::CodeBlock,
            ElementKind::CodeLine => NodeType::CodeLine,
            ElementKind::ThematicBreak => NodeType::ThematicBreak,
            ElementKind::Link { .. } => NodeType::Link,
            ElementKind::Image { .. } => NodeType::Image,
            ElementKind::Component(_) => NodeType::CustomComponent,
        }
    }

    fn all() -> impl Iterator<Item = NodeType> {
        let headings = (1..=6).map(|level| NodeType::Heading(HeadingLevel::clamped(level)));
        [NodeType::Paragraph]
            .into_iter()
            .chain(headings)
            .chain([
                NodeType::BlockQuote,
                NodeType::OrderedList,
                NodeType::UnorderedList,
                NodeType::ListItem,
                NodeType::ListItemText,
                NodeType::CodeBlock,
                NodeType::CodeLine,
                NodeType::ThematicBreak,
                NodeType::Link,
                NodeType::Image,
                NodeType::CustomComponent,
            ])
    }
}

/// Tag table, deserializable from a partial configuration.
///
/// Field names are the construct names; values are the tags written out.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeTypes {
    pub paragraph: String,
    #[serde(rename = "heading-1")]
    pub heading_1: String,
    #[serde(rename = "heading-2")]
    pub heading_2: String,
    #[serde(rename = "heading-3")]
    pub heading_3: String,
    #[serde(rename = "heading-4")]
    pub heading_4: String,
    #[serde(rename = "heading-5")]
    pub heading_5: String,
    #[serde(rename = "heading-6")]
    pub heading_6: String,
    pub block_quote: String,
    pub ordered_list: String,
    pub unordered_list: String,
    pub list_item: String,
    pub list_item_text: String,
    pub code_block: String,
    pub code_line: String,
    pub thematic_break: String,
    pub link: String,
    pub image: String,
    pub custom_component: String,
}

impl Default for NodeTypes {
    fn default() -> Self {
        Self {
            paragraph: "paragraph".into(),
            heading_1: "heading-1".into(),
            heading_2: "heading-2".into(),
            heading_3: "heading-3".into(),
            heading_4: "heading-4".into(),
            heading_5: "heading-5".into(),
            heading_6: "heading-6".into(),
            block_quote: "block_quote".into(),
            ordered_list: "ordered_list".into(),
            unordered_list: "unordered_list".into(),
            list_item: "list_item".into(),
            list_item_text: "list_item_text".into(),
            code_block: "code_block".into(),
            code_line: "code_line".into(),
            thematic_break: "thematic_break".into(),
            link: "link".into(),
            image: "image".into(),
            custom_component: "custom_component".into(),
        }
    }
}

impl NodeTypes {
    /// The tag written for a node type.
    pub fn tag(&self, node_type: NodeType) -> &str {
        match node_type {
            NodeType::Paragraph => &self.paragraph,
            NodeType::Heading(level) => match level.get() {
                1 => &self.heading_1,
                2 => &self.heading_2,
                3 => &self.heading_3,
                4 => &self.heading_4,
                5 => &self.heading_5,
                _ => &self.heading_6,
            },
            NodeType::BlockQuote => &self.block_quote,
            NodeType::OrderedList => &self.ordered_list,
            NodeType::UnorderedList => &self.unordered_list,
            NodeType::ListItem => &self.list_item,
            NodeType::ListItemText => &self.list_item_text,
            NodeType::CodeBlock => &self.code_block,
            NodeType::CodeLine => &self.code_line,
            NodeType::ThematicBreak => &self.thematic_break,
            NodeType::Link => &self.link,
            NodeType::Image => &self.image,
            NodeType::CustomComponent => &self.custom_component,
        }
    }

    /// The tag for an element kind.
    pub fn tag_of(&self, kind: &ElementKind) -> &str {
        self.tag(NodeType::of(kind))
    }

    /// Reverse lookup; `None` for tags this installation does not use.
    pub fn resolve(&self, tag: &str) -> Option<NodeType> {
        NodeType::all().find(|node_type| self.tag(*node_type) == tag)
    }

    /// Reverse lookup that falls back to a paragraph for unknown tags.
    pub fn resolve_or_paragraph(&self, tag: &str) -> NodeType {
        self.resolve(tag).unwrap_or_else(|| {
            log::debug!("unknown node type `{tag}`, treating it as a paragraph");
            NodeType::Paragraph
        })
    }
}
