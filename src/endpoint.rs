//! SPARQL endpoint resolution.
//!
//! The target endpoint for a query is guessed from, in this order:
//! an explicit request override, an `#+ endpoint:` decorator, the first
//! non-blank line of the repo's `endpoint.txt`, and finally the configured
//! default. A fetch failure on `endpoint.txt` falls through silently.

use log::{debug, info};

use crate::config::Config;
use crate::loader::FileLoader;
use crate::parsing::decorator;

/// User/password pair for an endpoint that requires basic auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Endpoint URI plus the credentials that apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub uri: String,
    pub credentials: Option<Credentials>,
}

/// Resolves the endpoint for a raw query. Only file- or default-resolved
/// endpoints carry the configured credentials; an override or decorator
/// endpoint is always credential-free.
pub fn resolve_endpoint(
    override_endpoint: Option<&str>,
    raw_query: &str,
    loader: &dyn FileLoader,
    config: &Config,
) -> ResolvedEndpoint {
    if let Some(endpoint) = override_endpoint {
        debug!("endpoint provided in request: {}", endpoint);
        return ResolvedEndpoint { uri: endpoint.to_string(), credentials: None };
    }

    let extracted = decorator::extract(raw_query);
    if let Some(endpoint) = extracted.metadata.endpoint {
        debug!("decorator guessed endpoint: {}", endpoint);
        return ResolvedEndpoint { uri: endpoint, credentials: None };
    }

    match loader.endpoint_text() {
        Ok(content) => {
            if let Some(line) = content.lines().map(str::trim).find(|l| !l.is_empty()) {
                debug!("file guessed endpoint: {}", line);
                return ResolvedEndpoint {
                    uri: line.to_string(),
                    credentials: config.credentials(),
                };
            }
        }
        Err(e) => {
            // Not an error: most repos simply carry no endpoint.txt.
            debug!("no endpoint.txt available: {}", e);
        }
    }

    info!("no endpoint specified, using default ({})", config.default_endpoint);
    ResolvedEndpoint { uri: config.default_endpoint.clone(), credentials: config.credentials() }
}
