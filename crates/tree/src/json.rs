//! The tree as JSON, in the shape the editing surface works with.
//!
//! Elements are `{type, children, align?, ...}` with `type` taken from a
//! [`NodeTypes`] table; text is `{text, marks?}`. Void elements carry a
//! single empty text child so editors that require non-empty children can
//! hold them; it is dropped again on the way back.

use crate::error::{NodePath, TreeError};
use crate::node::{
    Align, Attribute, Component, Element, ElementKind, Mark, Marks, Node, Text,
};
use crate::node_types::{NodeType, NodeTypes};
use serde_json::{Map, Value};

/// Converts a root sequence to a JSON array.
pub fn to_json(nodes: &[Node], types: &NodeTypes) -> Result<Value, TreeError> {
    nodes_to_json(nodes, &NodePath::root(), types)
}

/// Reads a root sequence from a JSON array.
///
/// Unknown `type` tags become paragraphs holding the text of their subtree.
pub fn from_json(value: &Value, types: &NodeTypes) -> Result<Vec<Node>, TreeError> {
    let root = NodePath::root();
    let items = value
        .as_array()
        .ok_or_else(|| invalid(&root, "expected an array of nodes"))?;
    nodes_from_json(items, &root, types)
}

/// Converts one node.
pub fn node_to_json(node: &Node, types: &NodeTypes) -> Result<Value, TreeError> {
    to_value(node, &NodePath::root(), types)
}

/// Reads one node.
pub fn node_from_json(value: &Value, types: &NodeTypes) -> Result<Node, TreeError> {
    from_value(value, &NodePath::root(), types)
}

fn nodes_to_json(nodes: &[Node], path: &NodePath, types: &NodeTypes) -> Result<Value, TreeError> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| to_value(node, &path.child(index), types))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn to_value(node: &Node, path: &NodePath, types: &NodeTypes) -> Result<Value, TreeError> {
    match node {
        Node::Text(text) => Ok(text_to_json(text)),
        Node::Element(element) => element_to_json(element, path, types),
    }
}

fn text_to_json(text: &Text) -> Value {
    let mut map = Map::new();
    map.insert("text".into(), Value::String(text.text.clone()));
    if !text.marks.is_empty() {
        let marks = text.marks.iter().map(|mark| Value::from(mark.name())).collect();
        map.insert("marks".into(), Value::Array(marks));
    }
    Value::Object(map)
}

fn element_to_json(element: &Element, path: &NodePath, types: &NodeTypes) -> Result<Value, TreeError> {
    let mut map = Map::new();
    map.insert("type".into(), Value::from(types.tag_of(&element.kind)));

    match &element.kind {
        ElementKind::OrderedList { start } if *start != 1 => {
            map.insert("start".into(), Value::from(*start));
        }
        ElementKind::CodeBlock { lang, meta } => {
            insert_opt(&mut map, "lang", lang.as_deref());
            insert_opt(&mut map, "meta", meta.as_deref());
        }
        ElementKind::Link { url, title } => {
            map.insert("url".into(), Value::from(url.as_str()));
            insert_opt(&mut map, "title", title.as_deref());
        }
        ElementKind::Image { url, title, alt } => {
            map.insert("url".into(), Value::from(url.as_str()));
            insert_opt(&mut map, "title", title.as_deref());
            map.insert("alt".into(), Value::from(alt.as_str()));
        }
        ElementKind::Component(component) => {
            map.insert("id".into(), Value::from(component.id.as_str()));
            map.insert("name".into(), Value::from(component.name.as_str()));
            let attributes = serde_json::to_value(&component.attributes)
                .map_err(|err| invalid(path, err.to_string()))?;
            map.insert("attributes".into(), attributes);
            if !component.spread.is_empty() {
                map.insert("spread".into(), Value::from(component.spread.clone()));
            }
            map.insert(
                "reactChildren".into(),
                nodes_to_json(&component.react_children, path, types)?,
            );
        }
        _ => {}
    }

    let children = if element.kind.is_void() {
        Value::Array(vec![text_to_json(&Text::default())])
    } else {
        nodes_to_json(&element.children, path, types)?
    };
    map.insert("children".into(), children);

    if let Some(align) = element.align {
        let align = serde_json::to_value(align).map_err(|err| invalid(path, err.to_string()))?;
        map.insert("align".into(), align);
    }
    Ok(Value::Object(map))
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.into(), Value::from(value));
    }
}

fn nodes_from_json(items: &[Value], path: &NodePath, types: &NodeTypes) -> Result<Vec<Node>, TreeError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| from_value(item, &path.child(index), types))
        .collect()
}

fn from_value(value: &Value, path: &NodePath, types: &NodeTypes) -> Result<Node, TreeError> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid(path, "expected an object"))?;
    if map.contains_key("type") {
        element_from_json(map, path, types)
    } else if let Some(text) = map.get("text") {
        let text = text
            .as_str()
            .ok_or_else(|| invalid(path, "`text` must be a string"))?;
        Ok(Node::Text(Text {
            text: text.to_string(),
            marks: marks_from_json(map, path)?,
        }))
    } else {
        Err(invalid(path, "node has neither `type` nor `text`"))
    }
}

/// Reads `marks: [...]`, plus boolean flags such as `bold: true`.
fn marks_from_json(map: &Map<String, Value>, path: &NodePath) -> Result<Marks, TreeError> {
    let mut marks = match map.get("marks") {
        None | Some(Value::Null) => Marks::new(),
        Some(value) => serde_json::from_value::<Marks>(value.clone())
            .map_err(|err| invalid(path, format!("bad marks: {err}")))?,
    };
    for mark in Mark::ALL {
        if map.get(mark.name()).and_then(Value::as_bool) == Some(true) {
            marks.insert(mark);
        }
    }
    Ok(marks)
}

fn element_from_json(
    map: &Map<String, Value>,
    path: &NodePath,
    types: &NodeTypes,
) -> Result<Node, TreeError> {
    let tag = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(path, "`type` must be a string"))?;
    let children = match map.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => nodes_from_json(items, path, types)?,
        Some(_) => return Err(invalid(path, "`children` must be an array")),
    };

    let Some(node_type) = types.resolve(tag) else {
        log::debug!("unknown node type `{tag}` at {path}, keeping its text as a paragraph");
        let text: String = children.iter().map(Node::plain_text).collect();
        return Ok(Node::paragraph(vec![Node::text(text)]));
    };

    let kind = match node_type {
        NodeType::Paragraph => ElementKind::Paragraph,
        NodeType::Heading(level) => ElementKind::Heading(level),
        NodeType::BlockQuote => ElementKind::BlockQuote,
        NodeType::OrderedList => ElementKind::OrderedList {
            start: match map.get("start") {
                None | Some(Value::Null) => 1,
                Some(start) => start
                    .as_u64()
                    .and_then(|start| u32::try_from(start).ok())
                    .ok_or_else(|| invalid(path, "`start` must be a small non-negative integer"))?,
            },
        },
        NodeType::UnorderedList => ElementKind::UnorderedList,
        NodeType::ListItem => ElementKind::ListItem,
        NodeType::ListItemText => ElementKind::ListItemText,
        NodeType::CodeBlock => ElementKind::CodeBlock {
            lang: opt_string(map, "lang", path)?,
            meta: opt_string(map, "meta", path)?,
        },
        NodeType::CodeLine => ElementKind::CodeLine,
        NodeType::ThematicBreak => ElementKind::ThematicBreak,
        NodeType::Link => ElementKind::Link {
            url: opt_string(map, "url", path)?.unwrap_or_default(),
            title: opt_string(map, "title", path)?,
        },
        NodeType::Image => ElementKind::Image {
            url: opt_string(map, "url", path)?.unwrap_or_default(),
            title: opt_string(map, "title", path)?,
            alt: opt_string(map, "alt", path)?.unwrap_or_default(),
        },
        NodeType::CustomComponent => ElementKind::Component(component_from_json(map, path, types)?),
    };

    let align = match map.get("align") {
        None | Some(Value::Null) => None,
        Some(align) => Some(
            serde_json::from_value::<Align>(align.clone())
                .map_err(|err| invalid(path, format!("bad align: {err}")))?,
        ),
    };

    let children = if kind.is_void() { Vec::new() } else { children };
    Ok(Node::Element(Element {
        kind,
        children,
        align,
    }))
}

fn component_from_json(
    map: &Map<String, Value>,
    path: &NodePath,
    types: &NodeTypes,
) -> Result<Component, TreeError> {
    let name = opt_string(map, "name", path)?
        .filter(|name| !name.is_empty())
        .ok_or_else(|| invalid(path, "component needs a `name`"))?;
    let attributes = match map.get("attributes") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value::<Vec<Attribute>>(value.clone())
            .map_err(|err| invalid(path, format!("bad attributes: {err}")))?,
    };
    let spread = match map.get("spread") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value::<Vec<String>>(value.clone())
            .map_err(|err| invalid(path, format!("bad spread: {err}")))?,
    };
    let react_children = match map.get("reactChildren") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => nodes_from_json(items, path, types)?,
        Some(_) => return Err(invalid(path, "`reactChildren` must be an array")),
    };

    Ok(Component {
        id: opt_string(map, "id", path)?.unwrap_or_default(),
        name,
        attributes,
        spread,
        react_children,
    })
}

fn opt_string(map: &Map<String, Value>, key: &str, path: &NodePath) -> Result<Option<String>, TreeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(invalid(path, format!("`{key}` must be a string"))),
    }
}

fn invalid(path: &NodePath, message: impl Into<String>) -> TreeError {
    TreeError::Json {
        path: path.clone(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::HeadingLevel;
    use crate::node_types::DEFAULT_NODE_TYPES;
    use mdxdoc_core::AttributeValue;
    use serde_json::json;

    fn sample() -> Vec<Node> {
        let card = Component {
            id: "c-1".into(),
            name: "Card".into(),
            attributes: vec![
                Attribute::new("title", AttributeValue::string("Hi")),
                Attribute::new("n", AttributeValue::integer(2)),
            ],
            spread: vec![],
            react_children: vec![Node::paragraph(vec![Node::text("Body")])],
        };
        vec![
            Node::Element(Element {
                kind: ElementKind::Heading(HeadingLevel::clamped(2)),
                children: vec![Node::Text(Text::marked("Hi", [Mark::Bold]))],
                align: Some(Align::Center),
            }),
            Node::element(ElementKind::Component(card), vec![]),
        ]
    }

    #[test]
    fn writes_the_editor_shape() {
        let value = to_json(&sample(), &DEFAULT_NODE_TYPES).unwrap();
        insta::assert_snapshot!(serde_json::to_string(&value).unwrap(), @r#"[{"align":"center","children":[{"marks":["bold"],"text":"Hi"}],"type":"heading-2"},{"attributes":[{"name":"title","value":{"type":"string","value":"Hi"}},{"name":"n","value":{"type":"numeric-literal","value":2}}],"children":[{"text":""}],"id":"c-1","name":"Card","reactChildren":[{"children":[{"text":"Body"}],"type":"paragraph"}],"type":"custom_component"}]"#);
    }

    #[test]
    fn reads_back_what_it_writes() {
        let nodes = sample();
        let value = to_json(&nodes, &DEFAULT_NODE_TYPES).unwrap();
        assert_eq!(from_json(&value, &DEFAULT_NODE_TYPES).unwrap(), nodes);
    }

    #[test]
    fn custom_tags_are_used_both_ways() {
        let types: NodeTypes = serde_json::from_value(json!({ "heading-2": "h2" })).unwrap();
        let value = to_json(&sample(), &types).unwrap();
        assert_eq!(value[0]["type"], "h2");
        assert_eq!(from_json(&value, &types).unwrap(), sample());
    }

    #[test]
    fn unknown_tags_become_paragraphs() {
        let value = json!([{ "type": "table", "children": [
            { "type": "row", "children": [{ "text": "a" }, { "text": "b" }] }
        ] }]);
        assert_eq!(
            from_json(&value, &DEFAULT_NODE_TYPES).unwrap(),
            vec![Node::paragraph(vec![Node::text("ab")])]
        );
    }

    #[test]
    fn boolean_mark_flags_are_accepted() {
        let value = json!({ "text": "x", "bold": true, "italic": false });
        assert_eq!(
            node_from_json(&value, &DEFAULT_NODE_TYPES).unwrap(),
            Node::Text(Text::marked("x", [Mark::Bold]))
        );
    }

    #[test]
    fn malformed_nodes_report_their_path() {
        let value = json!([
            { "type": "paragraph", "children": [{ "text": "ok" }] },
            { "type": "paragraph", "children": [{ "text": 3 }] }
        ]);
        let err = from_json(&value, &DEFAULT_NODE_TYPES).unwrap_err();
        assert!(
            matches!(&err, TreeError::Json { path, .. } if path.indexes() == [1, 0]),
            "{err}"
        );
    }
}
