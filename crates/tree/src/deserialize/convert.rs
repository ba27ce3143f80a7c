//! Mapping from mdast nodes to tree nodes.

use super::context::{Context, normalize_inline};
use crate::node::{Attribute, Component, ElementKind, HeadingLevel, Mark, Marks, Node, Text};
use markdown::mdast::{self, AttributeContent};
use markdown::unist::Position;
use mdxdoc_core::{AttributeValue, RecoveredBlock, decode_expression, decode_literal};

/// Converts the root blocks of a document, each measured from its own origin.
pub(super) fn root_blocks(recovered: &[RecoveredBlock], ctx: &mut Context) -> Vec<Node> {
    let mut out = Vec::with_capacity(recovered.len());
    for root in recovered {
        ctx.enter_block(root.offset, root.first_line);
        block(&root.node, ctx, &mut out);
    }
    out
}

/// Converts a sequence of flow nodes.
fn blocks(nodes: &[mdast::Node], ctx: &mut Context) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        block(node, ctx, &mut out);
    }
    out
}

fn block(node: &mdast::Node, ctx: &mut Context, out: &mut Vec<Node>) {
    match node {
        mdast::Node::Root(root) => out.extend(blocks(&root.children, ctx)),
        mdast::Node::Paragraph(paragraph) => {
            out.push(Node::paragraph(inlines(&paragraph.children, ctx)));
        }
        mdast::Node::Heading(heading) => out.push(Node::element(
            ElementKind::Heading(HeadingLevel::clamped(heading.depth)),
            inlines(&heading.children, ctx),
        )),
        mdast::Node::Blockquote(quote) => out.push(Node::element(
            ElementKind::BlockQuote,
            blocks(&quote.children, ctx),
        )),
        mdast::Node::List(list) => out.push(convert_list(list, ctx)),
        mdast::Node::Code(code) => out.push(convert_code(code)),
        mdast::Node::ThematicBreak(_) => {
            out.push(Node::element(ElementKind::ThematicBreak, Vec::new()));
        }
        mdast::Node::MdxJsxFlowElement(element) => match element.name.as_deref() {
            None => out.extend(blocks(&element.children, ctx)),
            Some(name) => {
                let component = convert_component(
                    name,
                    &element.attributes,
                    element.position.as_ref(),
                    ctx,
                );
                let react_children = blocks(&element.children, ctx);
                out.push(component_node(component, react_children));
            }
        },
        mdast::Node::Yaml(yaml) => ctx.suspicious(
            yaml.position.as_ref(),
            "front matter is not part of the tree; split it off before deserializing",
        ),
        mdast::Node::Toml(toml) => ctx.suspicious(
            toml.position.as_ref(),
            "TOML front matter is not supported and was dropped",
        ),
        mdast::Node::Definition(definition) => {
            let label = definition
                .label
                .as_deref()
                .unwrap_or(definition.identifier.as_str());
            log::debug!("keeping link definition `{label}` as text");
            out.push(Node::paragraph(vec![Node::text(format!(
                "[{label}]: {}",
                definition.url
            ))]));
        }
        mdast::Node::Html(html) => out.push(Node::paragraph(vec![Node::text(&html.value)])),
        other => {
            log::debug!("no tree kind for {other:?}, keeping its text as a paragraph");
            out.push(Node::paragraph(normalize_inline(vec![Node::text(
                other.to_string(),
            )])));
        }
    }
}

fn convert_list(list: &mdast::List, ctx: &mut Context) -> Node {
    let kind = if list.ordered {
        ElementKind::OrderedList {
            start: list.start.unwrap_or(1),
        }
    } else {
        ElementKind::UnorderedList
    };

    let items = list
        .children
        .iter()
        .map(|child| match child {
            mdast::Node::ListItem(item) => convert_list_item(item, ctx),
            other => convert_list_item_children(std::slice::from_ref(other), ctx),
        })
        .collect();
    Node::element(kind, items)
}

fn convert_list_item(item: &mdast::ListItem, ctx: &mut Context) -> Node {
    convert_list_item_children(&item.children, ctx)
}

/// The first paragraph becomes the item text and lists nest. Later
/// paragraphs join the text after a line break; any other block is kept as
/// its source text, one line per source line.
fn convert_list_item_children(children: &[mdast::Node], ctx: &mut Context) -> Node {
    let mut text: Option<Vec<Node>> = None;
    let mut nested = Vec::new();

    for child in children {
        match child {
            mdast::Node::List(list) => nested.push(convert_list(list, ctx)),
            mdast::Node::Paragraph(paragraph) if text.is_none() && nested.is_empty() => {
                text = Some(inlines(&paragraph.children, ctx));
            }
            other => {
                let line = match other {
                    mdast::Node::Paragraph(paragraph) => inlines(&paragraph.children, ctx),
                    _ => {
                        ctx.suspicious(
                            other.position(),
                            "block inside a list item is kept as plain text",
                        );
                        let source = item_block_source(other, ctx);
                        if source.is_empty() {
                            continue;
                        }
                        vec![Node::text(source)]
                    }
                };
                let runs = text.get_or_insert_with(Vec::new);
                if !runs.is_empty() {
                    runs.push(Node::text("\n"));
                }
                runs.extend(line);
            }
        }
    }

    let text = normalize_inline(text.unwrap_or_default());
    let mut item_children = Vec::with_capacity(nested.len() + 1);
    item_children.push(Node::element(ElementKind::ListItemText, text));
    item_children.extend(nested);
    Node::element(ElementKind::ListItem, item_children)
}

/// Trimmed non-blank source lines of a block; its text content when the
/// source is unavailable.
fn item_block_source(node: &mdast::Node, ctx: &Context) -> String {
    let raw = match ctx.raw(node.position()) {
        Some(raw) => raw.to_string(),
        None => match node {
            mdast::Node::Code(code) => code.value.clone(),
            other => other.to_string(),
        },
    };
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One code line per line of the value. An empty value from a fence that
/// spans a content line is one empty line, not none.
fn convert_code(code: &mdast::Code) -> Node {
    let spans_a_line = code
        .position
        .as_ref()
        .is_some_and(|position| position.end.line > position.start.line + 1);
    let lines = if code.value.is_empty() && !spans_a_line {
        Vec::new()
    } else {
        code.value
            .split('\n')
            .map(|line| Node::element(ElementKind::CodeLine, vec![Node::text(line)]))
            .collect()
    };
    Node::element(
        ElementKind::CodeBlock {
            lang: code.lang.clone(),
            meta: code.meta.clone(),
        },
        lines,
    )
}

/// Converts phrasing content, normalized.
fn inlines(nodes: &[mdast::Node], ctx: &mut Context) -> Vec<Node> {
    normalize_inline(marked_inlines(nodes, &Marks::new(), ctx))
}

fn marked_inlines(nodes: &[mdast::Node], marks: &Marks, ctx: &mut Context) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        inline(node, marks, ctx, &mut out);
    }
    out
}

fn inline(node: &mdast::Node, marks: &Marks, ctx: &mut Context, out: &mut Vec<Node>) {
    let push_text = |out: &mut Vec<Node>, value: &str, marks: Marks| {
        out.push(Node::Text(Text {
            text: value.to_string(),
            marks,
        }));
    };

    match node {
        mdast::Node::Text(text) => push_text(out, &text.value, marks.clone()),
        mdast::Node::Break(_) => push_text(out, "\n", marks.clone()),
        mdast::Node::InlineCode(code) => push_text(out, &code.value, marks.with(Mark::Code)),
        mdast::Node::Strong(strong) => {
            out.extend(marked_inlines(&strong.children, &marks.with(Mark::Bold), ctx));
        }
        mdast::Node::Emphasis(emphasis) => {
            out.extend(marked_inlines(
                &emphasis.children,
                &marks.with(Mark::Italic),
                ctx,
            ));
        }
        mdast::Node::Delete(delete) => {
            out.extend(marked_inlines(
                &delete.children,
                &marks.with(Mark::Strikethrough),
                ctx,
            ));
        }
        mdast::Node::Link(link) => {
            let children = normalize_inline(marked_inlines(&link.children, marks, ctx));
            out.push(Node::element(
                ElementKind::Link {
                    url: link.url.clone(),
                    title: link.title.clone(),
                },
                children,
            ));
        }
        mdast::Node::Image(image) => out.push(Node::element(
            ElementKind::Image {
                url: image.url.clone(),
                title: image.title.clone(),
                alt: image.alt.clone(),
            },
            Vec::new(),
        )),
        mdast::Node::MdxJsxTextElement(element) => match element.name.as_deref() {
            None => out.extend(marked_inlines(&element.children, marks, ctx)),
            Some("u") => {
                if !element.attributes.is_empty() {
                    ctx.suspicious(
                        element.position.as_ref(),
                        "attributes on <u> are not kept",
                    );
                }
                out.extend(marked_inlines(
                    &element.children,
                    &marks.with(Mark::Underline),
                    ctx,
                ));
            }
            Some(name) => {
                let component = convert_component(
                    name,
                    &element.attributes,
                    element.position.as_ref(),
                    ctx,
                );
                let react_children = if element.children.is_empty() {
                    Vec::new()
                } else {
                    inlines(&element.children, ctx)
                };
                out.push(component_node(component, react_children));
            }
        },
        mdast::Node::Html(html) => push_text(out, &html.value, marks.clone()),
        other => {
            log::debug!("no inline tree kind for {other:?}, keeping its text");
            push_text(out, &other.to_string(), marks.clone());
        }
    }
}

fn component_node(mut component: Component, react_children: Vec<Node>) -> Node {
    component.react_children = react_children;
    Node::element(ElementKind::Component(component), Vec::new())
}

/// Decodes a JSX tag's attributes. A repeated name keeps the last value, as
/// JSX itself does.
fn convert_component(
    name: &str,
    attributes: &[AttributeContent],
    position: Option<&Position>,
    ctx: &mut Context,
) -> Component {
    let mut named: Vec<Attribute> = Vec::with_capacity(attributes.len());
    let mut spread = Vec::new();

    for attribute in attributes {
        match attribute {
            AttributeContent::Property(property) => {
                let value = match &property.value {
                    Some(mdast::AttributeValue::Literal(literal)) => decode_literal(literal),
                    Some(mdast::AttributeValue::Expression(expression)) => {
                        decode_expression(&expression.value)
                    }
                    None => AttributeValue::Boolean(true),
                };
                match named.iter_mut().find(|existing| existing.name == property.name) {
                    Some(existing) => {
                        ctx.suspicious(
                            position,
                            format!("<{name}> repeats `{}`; the last value wins", property.name),
                        );
                        existing.value = value;
                    }
                    None => named.push(Attribute::new(property.name.clone(), value)),
                }
            }
            AttributeContent::Expression(expression) => spread.push(expression.value.clone()),
        }
    }

    Component {
        id: ctx.next_id(),
        name: name.to_string(),
        attributes: named,
        spread,
        react_children: Vec::new(),
    }
}
