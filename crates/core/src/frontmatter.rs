//! Splitting a leading YAML block off an MDX document.
//!
//! The editing form owns the metadata; the tree only ever sees the body.
//! The raw block is kept so a save can put it back byte for byte.

use serde_json::Value as JsonValue;
use thiserror::Error;

/// A document cut into its front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    /// Raw YAML between the fences, without the fences themselves.
    pub raw: Option<String>,
    /// Parsed front matter (an empty object when there is none).
    pub value: JsonValue,
    /// Byte offset inside the original document where the body begins.
    pub body_start: usize,
}

impl Frontmatter {
    fn absent() -> Self {
        Self {
            raw: None,
            value: JsonValue::Object(Default::default()),
            body_start: 0,
        }
    }

    /// The body of `source`, which must be the string this was split from.
    pub fn body<'a>(&self, source: &'a str) -> &'a str {
        &source[self.body_start..]
    }
}

/// Errors emitted while splitting front matter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Opening `---` with no closing fence.
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Splits a leading `---` fenced YAML block off `input`.
///
/// Leading blank lines and a byte order mark are skipped; anything else
/// before the fence means the document has no front matter.
pub fn split_frontmatter(input: &str) -> Result<Frontmatter, FrontmatterError> {
    let mut offset = input.strip_prefix('\u{feff}').map_or(0, |_| '\u{feff}'.len_utf8());
    let mut lines = input[offset..].split_inclusive('\n');

    let opened = loop {
        match lines.next() {
            Some(line) if line.trim().is_empty() => offset += line.len(),
            Some(line) if is_fence(line) => {
                offset += line.len();
                break true;
            }
            _ => break false,
        }
    };
    if !opened {
        return Ok(Frontmatter::absent());
    }

    let yaml_start = offset;
    for line in lines {
        if is_fence(line) {
            let raw = input[yaml_start..offset].trim_end_matches(['\r', '\n']);
            return Ok(Frontmatter {
                raw: Some(raw.to_string()),
                value: parse_yaml(raw)?,
                body_start: offset + line.len(),
            });
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// Puts a raw front matter block back in front of a serialized body.
pub fn join_frontmatter(raw: Option<&str>, body: &str) -> String {
    match raw {
        Some(raw) if raw.is_empty() => format!("---\n---\n\n{body}"),
        Some(raw) => format!("---\n{raw}\n---\n\n{body}"),
        None => body.to_string(),
    }
}

fn parse_yaml(block: &str) -> Result<JsonValue, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    match serde_json::to_value(yaml).map_err(|err| FrontmatterError::Parse(err.to_string()))? {
        JsonValue::Null => Ok(JsonValue::Object(Default::default())),
        value @ JsonValue::Object(_) => Ok(value),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_without_frontmatter_is_all_body() {
        let split = split_frontmatter("# Title\nBody").unwrap();
        assert_eq!(split.raw, None);
        assert_eq!(split.body_start, 0);
        assert_eq!(split.value, JsonValue::Object(Default::default()));
    }

    #[test]
    fn splits_yaml_from_body() {
        let input = "---\ntitle: Example\ntags:\n  - rust\n---\n# Content";
        let split = split_frontmatter(input).unwrap();
        assert_eq!(split.body(input), "# Content");
        assert_eq!(split.raw.as_deref(), Some("title: Example\ntags:\n  - rust"));
        assert_eq!(split.value["title"], "Example");
        assert_eq!(split.value["tags"][0], "rust");
    }

    #[test]
    fn skips_bom_and_blank_lines() {
        let input = "\u{feff}\n  \n---\nfoo: bar\n---\nBody";
        let split = split_frontmatter(input).unwrap();
        assert_eq!(split.value["foo"], "bar");
        assert_eq!(split.body(input), "Body");
    }

    #[test]
    fn empty_block_is_an_empty_object() {
        let input = "---\n---\nBody";
        let split = split_frontmatter(input).unwrap();
        assert_eq!(split.raw.as_deref(), Some(""));
        assert_eq!(split.value, JsonValue::Object(Default::default()));
        assert_eq!(split.body(input), "Body");
    }

    #[test]
    fn rejects_unterminated_and_non_mapping_blocks() {
        assert!(matches!(
            split_frontmatter("---\ntitle: x"),
            Err(FrontmatterError::Unterminated)
        ));
        assert!(matches!(
            split_frontmatter("---\n- a\n- b\n---\n"),
            Err(FrontmatterError::InvalidRootType)
        ));
        assert!(matches!(
            split_frontmatter("---\nbad: [open\n---\n"),
            Err(FrontmatterError::Parse(_))
        ));
    }

    #[test]
    fn join_restores_the_block() {
        assert_eq!(
            join_frontmatter(Some("title: x"), "# Body\n"),
            "---\ntitle: x\n---\n\n# Body\n"
        );
        assert_eq!(join_frontmatter(None, "# Body\n"), "# Body\n");
    }
}
