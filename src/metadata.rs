//! Query metadata assembly.
//!
//! Ties the pipeline together for one query file: decorator extraction,
//! classification, parameter derivation, and the parameter objects handed
//! to the API spec builder.

use log::warn;
use serde::Serialize;
use std::collections::HashMap;

use crate::client::SparqlClient;
use crate::endpoint::Credentials;
use crate::error::Result;
use crate::parsing::{analyzer, decorator, DecoratorMetadata, QueryType};
use crate::templating::parameters::{self, ParamType, ParameterDescriptor};

/// Everything the engine derives from one raw query file.
///
/// Derived fresh per request; nothing here is mutated after construction.
/// Rewriting produces a new string.
#[derive(Debug, Clone)]
pub struct QueryMetadata {
    pub decorators: DecoratorMetadata,
    pub query_type: QueryType,
    /// Projected variables (SELECT/CONSTRUCT only).
    pub variables: Vec<String>,
    pub parameters: HashMap<String, ParameterDescriptor>,
    /// Bare query text, decorator lines removed.
    pub query: String,
    /// The raw file contents, decorators included.
    pub original_query: String,
}

/// Derives [`QueryMetadata`] from the raw query text. The endpoint and
/// client are needed because enumerated parameters may require a sub-query.
pub async fn get_query_metadata(
    raw_query: &str,
    endpoint: &str,
    client: &SparqlClient,
    auth: Option<&Credentials>,
) -> Result<QueryMetadata> {
    let extracted = decorator::extract(raw_query);

    let mut query = extracted.query;
    query = enable_custom_function_prefix(query, "bif");
    query = enable_custom_function_prefix(query, "sql");

    let analyzed = analyzer::analyze(&query);
    let parameters = match analyzed.query_type {
        QueryType::Select | QueryType::Construct => {
            parameters::resolve_parameters(&query, endpoint, &extracted.metadata, client, auth)
                .await?
        }
        QueryType::InsertData => insert_data_parameters(),
        QueryType::Unknown => {
            warn!("could not classify this query; assuming a plain, non-parametric SELECT");
            HashMap::new()
        }
        other => {
            warn!("query type {:?} takes no parameters", other);
            HashMap::new()
        }
    };

    Ok(QueryMetadata {
        decorators: extracted.metadata,
        query_type: analyzed.query_type,
        variables: analyzed.variables,
        parameters,
        query,
        original_query: raw_query.to_string(),
    })
}

/// Prepends a `PREFIX p: <:p>` header when the query uses a vendor function
/// namespace (`bif:`, `sql:`) without declaring it.
fn enable_custom_function_prefix(query: String, prefix: &str) -> String {
    let used = query.contains(&format!(" {}:", prefix)) || query.contains(&format!("({}:", prefix));
    let declared = query.contains(&format!("PREFIX {}:", prefix));
    if used && !declared {
        format!("PREFIX {p}: <:{p}>\n{q}", p = prefix, q = query)
    } else {
        query
    }
}

/// The fixed descriptors of an INSERT DATA operation: target graph and
/// payload. Strict parsing never sees these as placeholders.
fn insert_data_parameters() -> HashMap<String, ParameterDescriptor> {
    let mut parameters = HashMap::new();
    parameters.insert(
        "g".to_string(),
        ParameterDescriptor {
            name: "g".to_string(),
            placeholder: "?_g_iri".to_string(),
            required: true,
            param_type: ParamType::String,
            format: Some("iri".to_string()),
            datatype: None,
            lang: None,
            enum_values: None,
            default: None,
        },
    );
    parameters.insert(
        "data".to_string(),
        ParameterDescriptor {
            name: "data".to_string(),
            placeholder: "?_data".to_string(),
            required: true,
            param_type: ParamType::Literal,
            format: None,
            datatype: None,
            lang: None,
            enum_values: None,
            default: None,
        },
    );
    parameters
}

/// Parameter object in the shape the spec builder consumes for an OpenAPI
/// `parameters` array.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpecParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub required: bool,
    #[serde(rename = "in")]
    pub location: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl SpecParameter {
    /// Builds the spec-builder view of one descriptor.
    pub fn from_descriptor(descriptor: &ParameterDescriptor) -> Self {
        let type_name = descriptor.param_type.as_str();
        let description = if let Some(lang) = &descriptor.lang {
            format!(
                "A value of type {}@{} that will substitute {} in the original query",
                type_name, lang, descriptor.placeholder
            )
        } else if let Some(format) = &descriptor.format {
            format!(
                "A value of type {} ({}) that will substitute {} in the original query",
                type_name, format, descriptor.placeholder
            )
        } else {
            format!(
                "A value of type {} that will substitute {} in the original query",
                type_name, descriptor.placeholder
            )
        };

        SpecParameter {
            name: descriptor.name.clone(),
            param_type: type_name.to_string(),
            required: descriptor.required,
            location: "query".to_string(),
            description,
            format: descriptor.format.clone(),
            enum_values: descriptor.enum_values.clone(),
            default: descriptor.default.clone(),
        }
    }

    /// The `page` parameter added to paginated operations.
    pub fn pagination(results_per_page: u32) -> Self {
        SpecParameter {
            name: "page".to_string(),
            param_type: "int".to_string(),
            required: false,
            location: "query".to_string(),
            description: format!(
                "The page number for this paginated query ({} results per page)",
                results_per_page
            ),
            format: None,
            enum_values: None,
            default: None,
        }
    }

    /// The `endpoint` override parameter, defaulting to the resolved one.
    pub fn endpoint(default_endpoint: &str) -> Self {
        SpecParameter {
            name: "endpoint".to_string(),
            param_type: "string".to_string(),
            required: false,
            location: "query".to_string(),
            description: "Alternative endpoint for SPARQL query".to_string(),
            format: None,
            enum_values: None,
            default: Some(default_endpoint.to_string()),
        }
    }
}

impl QueryMetadata {
    /// The full `parameters` array for this operation: pagination and
    /// endpoint-override entries first, then one entry per descriptor,
    /// sorted by name for a stable spec.
    pub fn spec_parameters(&self, resolved_endpoint: &str) -> Vec<SpecParameter> {
        let mut spec = Vec::new();
        if let Some(results_per_page) = self.decorators.pagination {
            spec.push(SpecParameter::pagination(results_per_page));
        }
        if self.decorators.endpoint_in_url() {
            spec.push(SpecParameter::endpoint(resolved_endpoint));
        }
        let mut descriptors: Vec<&ParameterDescriptor> = self.parameters.values().collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        spec.extend(descriptors.into_iter().map(SpecParameter::from_descriptor));
        spec
    }
}
