//! Parameter derivation from the placeholder naming convention.
//!
//! Placeholders follow the grammar
//! `?("_" | "__")<name>["_" <suffix> ["_" <userdefined>]]`:
//!
//! - `?_name` required parameter, `?__name` optional
//! - `?_name_number` / `?_name_literal` / `?_name_string` explicit type
//! - `?_name_iri` substituted as an IRI
//! - `?_name_integer` (or any XSD local name) typed literal
//! - `?_name_en` (any two-letter suffix) language-tagged literal
//! - `?_name_prefix_datatype` user-defined prefixed datatype
//!
//! The fallback order above is observable behavior; reordering it changes
//! which suffixes act as language tags versus datatypes.

use regex::Regex;
use std::collections::HashMap;

use crate::client::SparqlClient;
use crate::config::XSD_DATATYPES;
use crate::endpoint::Credentials;
use crate::error::Result;
use crate::parsing::DecoratorMetadata;
use crate::templating::enumeration;

/// Scalar type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Number,
    Literal,
    String,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Number => "number",
            ParamType::Literal => "literal",
            ParamType::String => "string",
        }
    }
}

/// Typed description of one placeholder variable.
///
/// At most one of `format`, `lang`, `datatype` is ever set. `enum_values`
/// stays `None` unless the decorator's `enumerate` names the variable, so
/// consumers can tell "no constraint" from "empty constraint".
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    /// The full placeholder token as it appears in the query, e.g. `?_type_iri`.
    pub placeholder: String,
    pub required: bool,
    pub param_type: ParamType,
    /// Only ever `"iri"`.
    pub format: Option<String>,
    /// Prefixed-name datatype, e.g. `xsd:integer`.
    pub datatype: Option<String>,
    /// Two-letter language tag.
    pub lang: Option<String>,
    pub enum_values: Option<Vec<String>>,
    pub default: Option<String>,
}

/// Compiled matchers for the placeholder grammar.
pub struct PlaceholderMatcher {
    variable: Regex,
    aggregate: Regex,
}

impl PlaceholderMatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            variable: Regex::new(
                r"\?(?P<required>_{1,2})(?P<name>[a-zA-Z0-9]+)(?:_(?P<suffix>[a-zA-Z0-9]+))?(?:_(?P<userdefined>[a-zA-Z0-9]+))?",
            )?,
            // Synthetic variables produced by aggregate projections.
            aggregate: Regex::new(r"\?__agg_\d+")?,
        })
    }

    /// Scans the query text and classifies every placeholder. Aggregate
    /// variables are skipped entirely. A placeholder appearing several
    /// times yields a single descriptor.
    pub fn scan(&self, query: &str) -> Vec<ParameterDescriptor> {
        let mut descriptors: Vec<ParameterDescriptor> = Vec::new();
        for captures in self.variable.captures_iter(query) {
            let token = captures.get(0).map(|m| m.as_str()).unwrap_or_default();
            if self.aggregate.is_match(token) {
                continue;
            }
            let descriptor = classify(
                token,
                &captures["required"],
                &captures["name"],
                captures.name("suffix").map(|m| m.as_str()),
                captures.name("userdefined").map(|m| m.as_str()),
            );
            if let Some(existing) = descriptors.iter_mut().find(|d| d.name == descriptor.name) {
                *existing = descriptor;
            } else {
                descriptors.push(descriptor);
            }
        }
        descriptors
    }
}

/// Applies the tie-break rules, first match wins:
/// exact type name, `iri`, XSD local name, two-letter language tag,
/// prefixed user-defined datatype, plain string.
fn classify(
    token: &str,
    required: &str,
    name: &str,
    suffix: Option<&str>,
    userdefined: Option<&str>,
) -> ParameterDescriptor {
    let mut descriptor = ParameterDescriptor {
        name: name.to_string(),
        placeholder: token.to_string(),
        required: required.len() == 1,
        param_type: ParamType::String,
        format: None,
        datatype: None,
        lang: None,
        enum_values: None,
        default: None,
    };

    match suffix {
        Some("number") => descriptor.param_type = ParamType::Number,
        Some("literal") => descriptor.param_type = ParamType::Literal,
        Some("string") => descriptor.param_type = ParamType::String,
        Some("iri") => descriptor.format = Some("iri".to_string()),
        Some(s) if XSD_DATATYPES.contains(&s) => {
            descriptor.datatype = Some(format!("xsd:{}", s));
        }
        Some(s) if s.len() == 2 => descriptor.lang = Some(s.to_string()),
        Some(s) => {
            if let Some(userdefined) = userdefined {
                descriptor.datatype = Some(format!("{}:{}", s, userdefined));
            }
        }
        None => {}
    }

    descriptor
}

/// Derives one descriptor per recognized placeholder, wiring in fixed or
/// dynamically fetched enumerations and decorator defaults.
pub async fn resolve_parameters(
    query: &str,
    endpoint: &str,
    metadata: &DecoratorMetadata,
    client: &SparqlClient,
    auth: Option<&Credentials>,
) -> Result<HashMap<String, ParameterDescriptor>> {
    let matcher = PlaceholderMatcher::new()?;
    let mut parameters = HashMap::new();
    for mut descriptor in matcher.scan(query) {
        if metadata.is_enumerated(&descriptor.name) {
            let values =
                enumeration::resolve(query, &descriptor.name, endpoint, metadata, client, auth)
                    .await?;
            descriptor.enum_values = Some(values);
        }
        descriptor.default = metadata.default_for(&descriptor.name).map(str::to_string);
        parameters.insert(descriptor.name.clone(), descriptor);
    }
    Ok(parameters)
}
