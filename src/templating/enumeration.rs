//! Enumeration of constrained parameter values.
//!
//! A variable listed under the `enumerate` decorator either carries a fixed
//! value list right in the decorator or gets its legal values from the
//! endpoint: the triple pattern binding the variable is isolated from the
//! WHERE clause and wrapped in a `SELECT DISTINCT` sub-query. A pattern that
//! never references the variable yields an empty list, not an error.

use log::debug;
use regex::{NoExpand, Regex};

use crate::client::SparqlClient;
use crate::endpoint::Credentials;
use crate::error::Result;
use crate::parsing::DecoratorMetadata;
use crate::templating::rewrite::contains_token;

/// Resolves the value list for an enumerated variable: fixed lists verbatim,
/// dynamic lists via sub-query (sorted ascending by string comparison).
pub async fn resolve(
    query: &str,
    name: &str,
    endpoint: &str,
    metadata: &DecoratorMetadata,
    client: &SparqlClient,
    auth: Option<&Credentials>,
) -> Result<Vec<String>> {
    if let Some(values) = metadata.fixed_enumeration(name) {
        return Ok(values.to_vec());
    }
    resolve_dynamic(query, name, endpoint, client, auth).await
}

/// Fetches the value list with a `SELECT DISTINCT` sub-query. No matching
/// triple pattern means an empty list; a network failure propagates.
pub async fn resolve_dynamic(
    query: &str,
    name: &str,
    endpoint: &str,
    client: &SparqlClient,
    auth: Option<&Credentials>,
) -> Result<Vec<String>> {
    let Some(subquery) = build_subquery(query, name) else {
        debug!("no triple pattern references variable {}", name);
        return Ok(Vec::new());
    };
    debug!("enumeration sub-query for {}: {}", name, subquery);

    let document = client.select_json(endpoint, &subquery, auth).await?;
    let mut values: Vec<String> = document["results"]["bindings"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.as_object())
                .filter_map(|row| row.values().next())
                .filter_map(|cell| cell["value"].as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    values.sort();
    Ok(values)
}

/// Builds the enumeration sub-query for `name`, or `None` when the WHERE
/// clause holds no triple pattern referencing it.
///
/// The smallest span across an optional `FROM <graph>` clause and the
/// `WHERE { … }` block is matched non-greedily; any prefix header before the
/// original SELECT is preserved.
pub fn build_subquery(query: &str, name: &str) -> Option<String> {
    let span = Regex::new(r"(?s).*?(?:FROM\s*(?P<gnames><.*>+))?\s*(?:WHERE\s*)?\{(?P<tpattern>.*)\}")
        .unwrap();
    let captures = span.captures(query)?;
    let tpattern = captures.name("tpattern")?.as_str();
    let gnames = captures.name("gnames").map(|m| m.as_str());

    let referenced = contains_token(tpattern, &format!("?_{}", name))
        || contains_token(tpattern, &format!("?__{}", name))
        || contains_token(tpattern, &format!("?{}", name));
    if !referenced {
        return None;
    }

    let select = match gnames {
        Some(graphs) => {
            format!("SELECT DISTINCT ?{} FROM {} WHERE {{ {} }}", name, graphs, tpattern)
        }
        None => format!("SELECT DISTINCT ?{} WHERE {{ {} }}", name, tpattern),
    };

    // Swap the SELECT..WHERE body while keeping any PREFIX header.
    let body = Regex::new(r"(?s)SELECT.*\{.*\}.*").unwrap();
    Some(body.replace(query, NoExpand(&select)).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subquery_keeps_prefix_header() {
        let query = "PREFIX dbo: <http://dbpedia.org/ontology/>\nSELECT ?band WHERE { ?band dbo:genre ?_genre_iri }";
        let subquery = build_subquery(query, "genre").unwrap();
        assert!(subquery.starts_with("PREFIX dbo:"));
        assert!(subquery.contains("SELECT DISTINCT ?genre WHERE {"));
        assert!(subquery.contains("?_genre_iri"));
    }

    #[test]
    fn test_subquery_carries_graph_names() {
        let query = "SELECT ?s FROM <http://example.org/g> WHERE { ?s a ?_kind }";
        let subquery = build_subquery(query, "kind").unwrap();
        assert!(subquery.contains("FROM <http://example.org/g>"));
    }

    #[test]
    fn test_unreferenced_variable_yields_none() {
        let query = "SELECT ?s WHERE { ?s ?p ?o }";
        assert!(build_subquery(query, "code").is_none());
    }
}
