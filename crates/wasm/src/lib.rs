use mdxdoc_core::{ParseDiagnostics, ParseWarning, decode_expression, decode_literal, encode};
use mdxdoc_tree::{
    AttributeValue, DeserializeOptions, Deserialized, IdGenerator, NodeTypes, SequentialIds,
    SerializeOptions,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

// ============================================================================
// Editor Config
// ============================================================================

/// Configuration accepted by the WASM conversion functions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WasmEditorConfig {
    /// Tags written into `type` for each node kind.
    #[serde(alias = "nodeTypes")]
    pub node_types: NodeTypes,
    /// Deserializer options.
    #[serde(flatten)]
    pub deserialize: DeserializeOptions,
    /// Serializer options.
    #[serde(flatten)]
    pub serialize: SerializeOptions,
    /// Prefix for generated component ids when no generator is passed.
    #[serde(alias = "idPrefix")]
    pub id_prefix: Option<String>,
}

fn parse_config(config: JsValue) -> Result<WasmEditorConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(WasmEditorConfig::default());
    }
    serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))
}

/// Ids drawn from a JavaScript callback.
///
/// A failing or non-string callback falls back to sequential ids for the
/// rest of the call and the first failure is reported afterwards.
struct JsIds {
    generate: js_sys::Function,
    fallback: SequentialIds,
    failure: Option<String>,
}

impl IdGenerator for JsIds {
    fn next_id(&mut self) -> String {
        if self.failure.is_none() {
            match self.generate.call0(&JsValue::NULL) {
                Ok(value) => match value.as_string() {
                    Some(id) => return id,
                    None => self.failure = Some("id generator must return a string".into()),
                },
                Err(err) => {
                    self.failure = Some(format!("id generator threw: {:?}", err));
                }
            }
        }
        self.fallback.next_id()
    }
}

fn run_with_ids(
    cfg: &WasmEditorConfig,
    generate_id: Option<js_sys::Function>,
    run: impl FnOnce(&mut dyn IdGenerator) -> Result<JsValue, JsError>,
) -> Result<JsValue, JsError> {
    let fallback = match &cfg.id_prefix {
        Some(prefix) => SequentialIds::new(prefix.clone()),
        None => SequentialIds::default(),
    };
    match generate_id {
        Some(generate) => {
            let mut ids = JsIds {
                generate,
                fallback,
                failure: None,
            };
            let result = run(&mut ids)?;
            match ids.failure {
                Some(message) => Err(JsError::new(&message)),
                None => Ok(result),
            }
        }
        None => {
            let mut ids = fallback;
            run(&mut ids)
        }
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

// ============================================================================
// Result Types
// ============================================================================

/// One recovery error or warning, flattened for JavaScript.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEntry {
    /// `"error"` or `"warning"`.
    pub severity: &'static str,
    /// Human-readable message.
    pub message: String,
    /// 1-indexed line.
    pub line: usize,
    /// 1-indexed column.
    pub column: usize,
}

fn diagnostic_entries(diagnostics: &ParseDiagnostics) -> Vec<DiagnosticEntry> {
    let errors = diagnostics.errors.iter().map(|error| DiagnosticEntry {
        severity: "error",
        message: error.message.clone(),
        line: error.location.line,
        column: error.location.column,
    });
    let warnings = diagnostics.warnings.iter().map(|warning| DiagnosticEntry {
        severity: "warning",
        message: match warning {
            ParseWarning::UnclosedCodeFence { marker, .. } => {
                format!("code fence ({}) is never closed", marker)
            }
            ParseWarning::SuspiciousMarkup { message, .. } => message.clone(),
        },
        line: warning.location().line,
        column: warning.location().column,
    });
    errors.chain(warnings).collect()
}

/// Result of deserializing MDX text.
#[derive(Debug, Clone, Serialize)]
pub struct DeserializeResult {
    /// The tree as editor JSON.
    pub nodes: serde_json::Value,
    /// Recovery errors and warnings.
    pub diagnostics: Vec<DiagnosticEntry>,
}

/// Result of deserializing a whole file.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    /// Parsed front matter (an empty object when absent).
    pub frontmatter: serde_json::Value,
    /// Raw front matter YAML, if present.
    pub raw_frontmatter: Option<String>,
    /// The body tree as editor JSON.
    pub nodes: serde_json::Value,
    /// Recovery errors and warnings, with lines counted from the top of the file.
    pub diagnostics: Vec<DiagnosticEntry>,
}

fn tree_json(body: &Deserialized, types: &NodeTypes) -> Result<serde_json::Value, JsError> {
    mdxdoc_tree::to_json(&body.nodes, types)
        .map_err(|e| JsError::new(&format!("Tree error: {}", e)))
}

// ============================================================================
// Conversion API
// ============================================================================

/// Deserializes MDX body text into editor JSON.
///
/// # Arguments
///
/// * `source` - MDX text without front matter
/// * `config` - Optional `WasmEditorConfig` (JsValue)
/// * `generate_id` - Optional callback returning a fresh component id
///
/// # Returns
///
/// `{ nodes, diagnostics }`. Malformed blocks never fail the call; they come
/// back as plain paragraphs with an entry in `diagnostics`.
#[wasm_bindgen]
pub fn deserialize(
    source: &str,
    config: JsValue,
    generate_id: Option<js_sys::Function>,
) -> Result<JsValue, JsError> {
    let cfg = parse_config(config)?;
    run_with_ids(&cfg, generate_id, |ids| {
        let body = mdxdoc_tree::deserialize(source, &cfg.deserialize, ids);
        to_js(&DeserializeResult {
            nodes: tree_json(&body, &cfg.node_types)?,
            diagnostics: diagnostic_entries(&body.diagnostics),
        })
    })
}

/// Deserializes a whole file, splitting off its front matter first.
#[wasm_bindgen(js_name = deserializeDocument)]
pub fn deserialize_document(
    source: &str,
    config: JsValue,
    generate_id: Option<js_sys::Function>,
) -> Result<JsValue, JsError> {
    let cfg = parse_config(config)?;
    run_with_ids(&cfg, generate_id, |ids| {
        let document = mdxdoc_tree::deserialize_document(source, &cfg.deserialize, ids)
            .map_err(|e| JsError::new(&format!("Frontmatter error: {}", e)))?;
        to_js(&DocumentResult {
            nodes: tree_json(&document.body, &cfg.node_types)?,
            diagnostics: diagnostic_entries(&document.body.diagnostics),
            frontmatter: document.frontmatter.value,
            raw_frontmatter: document.frontmatter.raw,
        })
    })
}

/// Serializes editor JSON back to MDX text.
///
/// Fails when the tree breaks a structural rule, naming the offending path.
#[wasm_bindgen]
pub fn serialize(tree: JsValue, config: JsValue) -> Result<String, JsError> {
    let cfg = parse_config(config)?;
    let json: serde_json::Value = serde_wasm_bindgen::from_value(tree)
        .map_err(|e| JsError::new(&format!("Invalid tree: {}", e)))?;
    let nodes = mdxdoc_tree::from_json(&json, &cfg.node_types)
        .map_err(|e| JsError::new(&format!("Tree error: {}", e)))?;
    mdxdoc_tree::serialize_document(&nodes, &cfg.serialize)
        .map_err(|e| JsError::new(&format!("Serialize error: {}", e)))
}

/// Re-attaches raw front matter to a serialized body.
#[wasm_bindgen(js_name = joinFrontmatter)]
pub fn join_frontmatter(raw: Option<String>, body: &str) -> String {
    mdxdoc_tree::join_frontmatter(raw.as_deref(), body)
}

// ============================================================================
// Attribute Codec API
// ============================================================================

/// Decodes a JSX attribute value into its typed form.
///
/// `literal` selects quoted-string decoding; otherwise `source` is the text
/// between the braces.
#[wasm_bindgen(js_name = decodeAttribute)]
pub fn decode_attribute(source: &str, literal: bool) -> Result<JsValue, JsError> {
    let value = if literal {
        decode_literal(source)
    } else {
        decode_expression(source)
    };
    to_js(&value)
}

/// Encodes a typed attribute value as it appears after `name=`.
#[wasm_bindgen(js_name = encodeAttribute)]
pub fn encode_attribute(value: JsValue) -> Result<String, JsError> {
    let value: AttributeValue = serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("Invalid attribute value: {}", e)))?;
    Ok(encode(&value).to_string())
}
