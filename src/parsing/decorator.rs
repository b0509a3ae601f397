//! Decorator metadata extraction.
//!
//! A query file interleaves SPARQL text with decorator lines prefixed by
//! `#+`. The marker-stripped lines form a restricted key/value document
//! (scalars, inline `[a, b]` lists, indented `- item` entries, one level of
//! nesting) with a JSON fallback for files that embed their metadata as a
//! JSON object. A malformed document degrades to empty metadata with a
//! warning; the bare query text is always returned.

use log::warn;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Marker prefix identifying a decorator line.
pub const DECORATOR_MARKER: &str = "#+";

/// HTTP method a query operation is exposed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Head,
    Put,
    Delete,
    Options,
    Connect,
}

impl HttpMethod {
    /// Parses a method name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "head" => Some(HttpMethod::Head),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "connect" => Some(HttpMethod::Connect),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Head => "head",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Connect => "connect",
        }
    }
}

/// One entry under the `enumerate` decorator key.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumerateEntry {
    /// Values must be fetched with a sub-query against the endpoint.
    Dynamic(String),
    /// Values were listed directly in the decorator.
    Fixed { name: String, values: Vec<String> },
}

impl EnumerateEntry {
    pub fn name(&self) -> &str {
        match self {
            EnumerateEntry::Dynamic(name) => name,
            EnumerateEntry::Fixed { name, .. } => name,
        }
    }
}

/// Typed view of the decorator block of a query file.
///
/// Absent keys stay `None`/empty; the `method()` and `endpoint_in_url()`
/// accessors supply the documented defaults lazily.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoratorMetadata {
    pub endpoint: Option<String>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub method: Option<HttpMethod>,
    pub pagination: Option<u32>,
    pub enumerate: Vec<EnumerateEntry>,
    pub defaults: Vec<(String, String)>,
    pub mime: Option<String>,
    pub endpoint_in_url: Option<bool>,
    /// HTTP verb used towards the SPARQL endpoint itself (`endpoint-method`).
    pub endpoint_method: Option<HttpMethod>,
    /// Bare query text; synthesized by the extractor when not declared.
    pub query: Option<String>,
    /// Unrecognized keys, kept verbatim.
    pub extra: Map<String, Value>,
}

impl DecoratorMetadata {
    /// Method the operation is exposed under; GET when unspecified.
    pub fn method(&self) -> HttpMethod {
        self.method.unwrap_or(HttpMethod::Get)
    }

    /// Whether the generated operation carries an `endpoint` override
    /// parameter; true when unspecified.
    pub fn endpoint_in_url(&self) -> bool {
        self.endpoint_in_url.unwrap_or(true)
    }

    /// Verb used when dispatching to the endpoint; POST when unspecified.
    pub fn endpoint_method(&self) -> HttpMethod {
        self.endpoint_method.unwrap_or(HttpMethod::Post)
    }

    /// True when `enumerate` names the given variable, in either form.
    pub fn is_enumerated(&self, name: &str) -> bool {
        self.enumerate.iter().any(|e| e.name() == name)
    }

    /// Fixed value list for the variable, when the decorator carries one.
    pub fn fixed_enumeration(&self, name: &str) -> Option<&[String]> {
        self.enumerate.iter().find_map(|e| match e {
            EnumerateEntry::Fixed { name: n, values } if n == name => Some(values.as_slice()),
            _ => None,
        })
    }

    /// Default value for the variable from the `defaults` mapping.
    pub fn default_for(&self, name: &str) -> Option<&str> {
        self.defaults
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Builds metadata from a parsed key/value document. Unrecognized keys
    /// are preserved in `extra`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::Decorator("decorator document is not a mapping".to_string()))?;

        let mut meta = DecoratorMetadata::default();
        for (key, val) in map {
            match key.as_str() {
                "endpoint" => meta.endpoint = val.as_str().map(str::to_string),
                "tags" => meta.tags = string_list(val),
                "summary" => meta.summary = Some(scalar_to_string(val)),
                "description" => meta.description = Some(scalar_to_string(val)),
                "method" => meta.method = val.as_str().and_then(HttpMethod::parse),
                "pagination" => {
                    meta.pagination = val.as_u64().filter(|n| *n > 0).map(|n| n as u32);
                    if meta.pagination.is_none() {
                        warn!("ignoring non-positive pagination value: {}", val);
                    }
                }
                "enumerate" => meta.enumerate = enumerate_entries(val),
                "defaults" => meta.defaults = key_value_pairs(val),
                "mime" => meta.mime = val.as_str().map(str::to_string),
                "endpoint_in_url" => meta.endpoint_in_url = as_bool(val),
                "endpoint-method" => {
                    meta.endpoint_method = val.as_str().and_then(HttpMethod::parse);
                }
                "query" => meta.query = val.as_str().map(str::to_string),
                _ => {
                    meta.extra.insert(key.clone(), val.clone());
                }
            }
        }
        Ok(meta)
    }

    /// Re-serializes the recognized keys into the document value shape
    /// accepted by [`DecoratorMetadata::from_value`].
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(endpoint) = &self.endpoint {
            map.insert("endpoint".to_string(), Value::String(endpoint.clone()));
        }
        if !self.tags.is_empty() {
            map.insert(
                "tags".to_string(),
                Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(summary) = &self.summary {
            map.insert("summary".to_string(), Value::String(summary.clone()));
        }
        if let Some(description) = &self.description {
            map.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(method) = self.method {
            map.insert("method".to_string(), Value::String(method.as_str().to_string()));
        }
        if let Some(pagination) = self.pagination {
            map.insert("pagination".to_string(), Value::from(pagination));
        }
        if !self.enumerate.is_empty() {
            let entries = self
                .enumerate
                .iter()
                .map(|e| match e {
                    EnumerateEntry::Dynamic(name) => Value::String(name.clone()),
                    EnumerateEntry::Fixed { name, values } => {
                        let mut entry = Map::new();
                        entry.insert(
                            name.clone(),
                            Value::Array(values.iter().cloned().map(Value::String).collect()),
                        );
                        Value::Object(entry)
                    }
                })
                .collect();
            map.insert("enumerate".to_string(), Value::Array(entries));
        }
        if !self.defaults.is_empty() {
            let entries = self
                .defaults
                .iter()
                .map(|(name, value)| {
                    let mut entry = Map::new();
                    entry.insert(name.clone(), Value::String(value.clone()));
                    Value::Object(entry)
                })
                .collect();
            map.insert("defaults".to_string(), Value::Array(entries));
        }
        if let Some(mime) = &self.mime {
            map.insert("mime".to_string(), Value::String(mime.clone()));
        }
        if let Some(flag) = self.endpoint_in_url {
            map.insert("endpoint_in_url".to_string(), Value::Bool(flag));
        }
        if let Some(method) = self.endpoint_method {
            map.insert(
                "endpoint-method".to_string(),
                Value::String(method.as_str().to_string()),
            );
        }
        if let Some(query) = &self.query {
            map.insert("query".to_string(), Value::String(query.clone()));
        }
        for (key, val) in &self.extra {
            map.insert(key.clone(), val.clone());
        }
        Value::Object(map)
    }
}

/// Result of splitting a raw query file into decorators and bare query text.
#[derive(Debug, Clone)]
pub struct ExtractedQuery {
    pub metadata: DecoratorMetadata,
    pub query: String,
}

/// Splits the raw query text into decorator metadata and bare query text.
///
/// Decorator parse failures never propagate: they degrade to empty metadata
/// with a logged warning.
pub fn extract(raw: &str) -> ExtractedQuery {
    let mut decorator_lines: Vec<&str> = Vec::new();
    let mut query_lines: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix(DECORATOR_MARKER) {
            decorator_lines.push(rest);
        } else {
            query_lines.push(line);
        }
    }

    let document = decorator_lines.join("\n");
    let query = query_lines.join("\n");

    let mut metadata = if document.trim().is_empty() {
        DecoratorMetadata::default()
    } else {
        match parse_document(&document) {
            Ok(value) => DecoratorMetadata::from_value(&value).unwrap_or_else(|e| {
                warn!("query decorators could not be interpreted: {}", e);
                DecoratorMetadata::default()
            }),
            Err(e) => {
                warn!("query decorators could not be parsed; check the syntax: {}", e);
                DecoratorMetadata::default()
            }
        }
    };

    if metadata.query.is_none() {
        metadata.query = Some(query.clone());
    }

    ExtractedQuery { metadata, query }
}

/// Parses the decorator document: restricted key/value syntax first, whole
/// block as JSON second.
pub fn parse_document(document: &str) -> Result<Value> {
    match parse_restricted(document) {
        Ok(value) => Ok(value),
        Err(restricted_err) => serde_json::from_str::<Value>(document)
            .ok()
            .filter(Value::is_object)
            .ok_or(restricted_err),
    }
}

/// Parses the restricted key/value syntax into a JSON value tree.
fn parse_restricted(document: &str) -> Result<Value> {
    // (indent, content) for non-blank lines; indentation is relative to the
    // least-indented line so a uniform leading space after the marker is fine.
    let lines: Vec<(usize, &str)> = document
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| (l.len() - l.trim_start().len(), l.trim()))
        .collect();
    let base = lines.iter().map(|(i, _)| *i).min().unwrap_or(0);

    let mut root = Map::new();
    let mut current_key: Option<String> = None;

    for (indent, content) in lines {
        if content == "-" || content.starts_with("- ") {
            let key = current_key
                .clone()
                .ok_or_else(|| Error::Decorator("list item without a key".to_string()))?;
            let item = parse_list_item(content.trim_start_matches('-').trim_start())?;
            match root.get_mut(&key) {
                Some(Value::Array(items)) => items.push(item),
                _ => {
                    root.insert(key, Value::Array(vec![item]));
                }
            }
        } else if indent > base {
            let key = current_key
                .clone()
                .ok_or_else(|| Error::Decorator("nested entry without a key".to_string()))?;
            let (k, v) = split_mapping(content)
                .ok_or_else(|| Error::Decorator(format!("expected key: value, got '{}'", content)))?;
            let entry = root.entry(key).or_insert(Value::Null);
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(nested) = entry {
                nested.insert(k, parse_scalar_or_flow(v));
            }
        } else {
            let (k, v) = split_mapping(content)
                .ok_or_else(|| Error::Decorator(format!("expected key: value, got '{}'", content)))?;
            current_key = Some(k.clone());
            let value = if v.is_empty() { Value::Null } else { parse_scalar_or_flow(v) };
            root.insert(k, value);
        }
    }

    Ok(Value::Object(root))
}

/// Splits `key: value` at the first colon that terminates a key, i.e. one
/// followed by whitespace or end of line. IRIs in scalar position therefore
/// never split.
fn split_mapping(line: &str) -> Option<(String, &str)> {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b':' && (i + 1 == bytes.len() || bytes[i + 1].is_ascii_whitespace()) {
            let key = line[..i].trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return None;
            }
            return Some((key.to_string(), line[i + 1..].trim()));
        }
    }
    None
}

fn parse_list_item(item: &str) -> Result<Value> {
    if let Some((key, rest)) = split_mapping(item) {
        let mut map = Map::new();
        map.insert(key, parse_scalar_or_flow(rest));
        Ok(Value::Object(map))
    } else if item.is_empty() {
        Err(Error::Decorator("empty list item".to_string()))
    } else {
        Ok(parse_scalar(item))
    }
}

fn parse_scalar_or_flow(text: &str) -> Value {
    let trimmed = text.trim();
    if let Some(inner) = trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_scalar)
            .collect();
        Value::Array(items)
    } else {
        parse_scalar(trimmed)
    }
}

fn parse_scalar(text: &str) -> Value {
    let unquoted = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')));
    if let Some(inner) = unquoted {
        return Value::String(inner.to_string());
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = text.parse::<i64>() {
                Value::from(n)
            } else {
                Value::String(text.to_string())
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(scalar_to_string).collect(),
        Value::Null => Vec::new(),
        other => vec![scalar_to_string(other)],
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn enumerate_entries(value: &Value) -> Vec<EnumerateEntry> {
    match value {
        Value::String(name) => vec![EnumerateEntry::Dynamic(name.clone())],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(EnumerateEntry::Dynamic(name.clone())),
                Value::Object(map) => map.iter().next().map(|(name, values)| EnumerateEntry::Fixed {
                    name: name.clone(),
                    values: string_list(values),
                }),
                _ => None,
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(name, values)| EnumerateEntry::Fixed {
                name: name.clone(),
                values: string_list(values),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn key_value_pairs(value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|map| map.iter().map(|(k, v)| (k.clone(), scalar_to_string(v))))
            .collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), scalar_to_string(v))).collect(),
        _ => Vec::new(),
    }
}

/// Convenience map view of defaults, used by tests and the spec builder.
pub fn defaults_map(metadata: &DecoratorMetadata) -> HashMap<String, String> {
    metadata.defaults.iter().cloned().collect()
}
