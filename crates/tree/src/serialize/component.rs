//! JSX tags for custom components.

use crate::node::{Component, Node};
use mdxdoc_core::encode;

/// `<Name a="x" b={1} {...rest}`, without the closing `>` or `/>`.
pub(super) fn opening_tag(component: &Component) -> String {
    let mut tag = format!("<{}", component.name);
    for attribute in &component.attributes {
        tag.push(' ');
        tag.push_str(&attribute.name);
        tag.push('=');
        tag.push_str(&encode(&attribute.value).to_string());
    }
    for spread in &component.spread {
        tag.push_str(" {");
        tag.push_str(spread);
        tag.push('}');
    }
    tag
}

/// Whether a component with these children is written as `<Name />`.
pub(super) fn self_closes(children: &[Node]) -> bool {
    children.iter().all(|child| match child {
        Node::Text(text) => text.text.trim().is_empty(),
        Node::Element(_) => child.is_empty_paragraph(),
    })
}
