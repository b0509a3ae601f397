//! Static defaults and per-instance configuration.
//!
//! Everything that the original deployment read from ambient globals is
//! carried here as an explicit [`Config`] value handed to each component.

use crate::endpoint::Credentials;

/// Default SPARQL endpoint, if none is specified elsewhere.
pub const DEFAULT_ENDPOINT: &str = "http://dbpedia.org/sparql";

/// Sentinel meaning "no credential configured".
pub const NO_CREDENTIAL: &str = "none";

/// PREFIX line injected when a rewritten query gains an xsd-typed literal.
pub const XSD_PREFIX: &str = "PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>";

/// XSD datatype local names recognized as placeholder suffixes.
pub const XSD_DATATYPES: &[&str] = &[
    "decimal",
    "float",
    "double",
    "integer",
    "positiveInteger",
    "negativeInteger",
    "nonPositiveInteger",
    "nonNegativeInteger",
    "long",
    "int",
    "short",
    "byte",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "dateTime",
    "date",
    "gYearMonth",
    "gYear",
    "duration",
    "gMonthDay",
    "gDay",
    "gMonth",
    "string",
    "normalizedString",
    "token",
    "language",
    "NMTOKEN",
    "NMTOKENS",
    "Name",
    "NCName",
    "ID",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "QName",
    "boolean",
    "hexBinary",
    "base64Binary",
    "anyURI",
    "notation",
];

/// Accept header sent when requesting SPARQL JSON results.
pub const ACCEPT_JSON: &str = "application/json";

/// Maps a content shorthand (`csv`, `json`, `html`, `ttl`) to an Accept header.
pub fn mime_accept(content: &str) -> Option<&'static str> {
    match content {
        "csv" => Some("text/csv; q=1.0, */*; q=0.1"),
        "json" => Some("application/json; q=1.0, application/sparql-results+json; q=0.8, */*; q=0.1"),
        "html" => Some("text/html; q=1.0, */*; q=0.1"),
        "ttl" => Some("text/turtle"),
        _ => None,
    }
}

/// Per-instance configuration passed into the pipeline components.
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint used when neither request, decorator nor endpoint.txt name one.
    pub default_endpoint: String,
    /// User for the configured endpoint; the literal `none` disables it.
    pub endpoint_user: String,
    /// Password for the configured endpoint; the literal `none` disables it.
    pub endpoint_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_endpoint: DEFAULT_ENDPOINT.to_string(),
            endpoint_user: NO_CREDENTIAL.to_string(),
            endpoint_password: NO_CREDENTIAL.to_string(),
        }
    }
}

impl Config {
    /// Credentials for the configured endpoint, collapsing the `none`/`none`
    /// sentinel pair to "no credentials".
    pub fn credentials(&self) -> Option<Credentials> {
        if self.endpoint_user == NO_CREDENTIAL && self.endpoint_password == NO_CREDENTIAL {
            None
        } else {
            Some(Credentials {
                user: self.endpoint_user.clone(),
                password: self.endpoint_password.clone(),
            })
        }
    }
}
