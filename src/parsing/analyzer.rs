//! SPARQL query classification.
//!
//! The grammar itself is delegated to `spargebra`, used strictly as a black
//! box: the engine only needs the query type and, for SELECT/CONSTRUCT, the
//! projected variables. A query neither parser accepts is `Unknown`, which
//! is a valid terminal state; downstream treats it as a plain,
//! non-parametric SELECT.

use log::{debug, warn};
use regex::Regex;
use spargebra::algebra::GraphPattern;
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
use spargebra::{GraphUpdateOperation, Query, Update};

/// Query type as reported by the parser collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Construct,
    Ask,
    Describe,
    InsertData,
    Modify,
    Unknown,
}

impl QueryType {
    /// Whether the type takes placeholder parameters at all.
    pub fn is_parametric(&self) -> bool {
        matches!(self, QueryType::Select | QueryType::Construct | QueryType::InsertData)
    }
}

/// Outcome of analyzing a query: its type plus projected variables
/// (SELECT/CONSTRUCT only, empty otherwise).
#[derive(Debug, Clone)]
pub struct AnalyzedQuery {
    pub query_type: QueryType,
    pub variables: Vec<String>,
}

/// Classifies the query text and collects projected variables.
pub fn analyze(query: &str) -> AnalyzedQuery {
    match Query::parse(query, None) {
        Ok(Query::Select { pattern, .. }) => AnalyzedQuery {
            query_type: QueryType::Select,
            variables: projection(&pattern),
        },
        Ok(Query::Construct { template, .. }) => AnalyzedQuery {
            query_type: QueryType::Construct,
            variables: template_variables(&template),
        },
        Ok(Query::Ask { .. }) => AnalyzedQuery { query_type: QueryType::Ask, variables: Vec::new() },
        Ok(Query::Describe { .. }) => {
            AnalyzedQuery { query_type: QueryType::Describe, variables: Vec::new() }
        }
        Err(query_err) => {
            debug!("not a SELECT/CONSTRUCT/ASK/DESCRIBE query: {}", query_err);
            analyze_update(query)
        }
    }
}

fn analyze_update(query: &str) -> AnalyzedQuery {
    match Update::parse(query, None) {
        Ok(update) => {
            let query_type = match update.operations.first() {
                Some(GraphUpdateOperation::InsertData { .. }) => QueryType::InsertData,
                Some(_) => QueryType::Modify,
                None => QueryType::Unknown,
            };
            AnalyzedQuery { query_type, variables: Vec::new() }
        }
        Err(update_err) => {
            // Strict update parsing rejects placeholder variables in the
            // graph slot of INSERT DATA, so probe the text before giving up.
            let insert_probe = Regex::new(r"(?i)\bINSERT\s+DATA\b").unwrap();
            if insert_probe.is_match(query) {
                return AnalyzedQuery { query_type: QueryType::InsertData, variables: Vec::new() };
            }
            warn!("could not classify query, treating it as unknown: {}", update_err);
            AnalyzedQuery { query_type: QueryType::Unknown, variables: Vec::new() }
        }
    }
}

/// Walks the algebra down to the projection node.
fn projection(pattern: &GraphPattern) -> Vec<String> {
    match pattern {
        GraphPattern::Project { variables, .. } => {
            variables.iter().map(|v| v.as_str().to_string()).collect()
        }
        GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::OrderBy { inner, .. } => projection(inner),
        _ => Vec::new(),
    }
}

/// Variables appearing in a CONSTRUCT template, in first-seen order.
fn template_variables(template: &[TriplePattern]) -> Vec<String> {
    let mut seen = Vec::new();
    let mut push = |name: &str| {
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    };
    for triple in template {
        if let TermPattern::Variable(v) = &triple.subject {
            push(v.as_str());
        }
        if let NamedNodePattern::Variable(v) = &triple.predicate {
            push(v.as_str());
        }
        if let TermPattern::Variable(v) = &triple.object {
            push(v.as_str());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_projection() {
        let analyzed = analyze("SELECT ?s ?o WHERE { ?s ?p ?o }");
        assert_eq!(analyzed.query_type, QueryType::Select);
        assert_eq!(analyzed.variables, vec!["s", "o"]);
    }

    #[test]
    fn test_distinct_projection() {
        let analyzed = analyze("SELECT DISTINCT ?s WHERE { ?s ?p ?o } LIMIT 5");
        assert_eq!(analyzed.query_type, QueryType::Select);
        assert_eq!(analyzed.variables, vec!["s"]);
    }

    #[test]
    fn test_unknown_is_terminal_not_fatal() {
        let analyzed = analyze("THIS IS NOT SPARQL AT ALL");
        assert_eq!(analyzed.query_type, QueryType::Unknown);
        assert!(analyzed.variables.is_empty());
    }

    #[test]
    fn test_insert_data_probe() {
        let analyzed = analyze("INSERT DATA { GRAPH ?_g_iri { <s> <p> <o> } }");
        assert_eq!(analyzed.query_type, QueryType::InsertData);
    }
}
