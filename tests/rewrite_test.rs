//! Query Rewriting Integration Tests
//!
//! Tests for placeholder substitution: formatting per parameter kind,
//! required-parameter validation, and token-boundary safety.

use querify::error::Error;
use querify::templating::{rewrite_query, ParamType, ParameterDescriptor};
use std::collections::HashMap;

fn descriptor(name: &str, placeholder: &str) -> ParameterDescriptor {
    ParameterDescriptor {
        name: name.to_string(),
        placeholder: placeholder.to_string(),
        required: true,
        param_type: ParamType::String,
        format: None,
        datatype: None,
        lang: None,
        enum_values: None,
        default: None,
    }
}

fn args(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_iri_substitution() {
    let query = "SELECT ?band WHERE { ?band <http://dbpedia.org/ontology/genre> ?_genre_iri }";
    let mut parameters = HashMap::new();
    parameters.insert(
        "genre".to_string(),
        ParameterDescriptor { format: Some("iri".to_string()), ..descriptor("genre", "?_genre_iri") },
    );

    let rewritten =
        rewrite_query(query, &parameters, &args(&[("genre", "http://example.org/Foo")])).unwrap();
    assert!(rewritten.contains("<http://example.org/Foo>"));
    assert!(!rewritten.contains("?_genre_iri"));
}

#[test]
fn test_plain_string_becomes_quoted_literal() {
    let query = "SELECT ?s WHERE { ?s <http://example.org/code> ?_code }";
    let mut parameters = HashMap::new();
    parameters.insert("code".to_string(), descriptor("code", "?_code"));

    let rewritten = rewrite_query(query, &parameters, &args(&[("code", "nl")])).unwrap();
    assert!(rewritten.contains("\"nl\""));
}

#[test]
fn test_number_goes_in_verbatim() {
    let query = "SELECT ?s WHERE { ?s <http://example.org/year> ?_year_number }";
    let mut parameters = HashMap::new();
    parameters.insert(
        "year".to_string(),
        ParameterDescriptor {
            param_type: ParamType::Number,
            ..descriptor("year", "?_year_number")
        },
    );

    let rewritten = rewrite_query(query, &parameters, &args(&[("year", "1969")])).unwrap();
    assert!(rewritten.contains("?s <http://example.org/year> 1969"));
}

#[test]
fn test_language_tagged_literal() {
    let query = "SELECT ?s WHERE { ?s <http://www.w3.org/2000/01/rdf-schema#label> ?_label_en }";
    let mut parameters = HashMap::new();
    parameters.insert(
        "label".to_string(),
        ParameterDescriptor { lang: Some("en".to_string()), ..descriptor("label", "?_label_en") },
    );

    let rewritten = rewrite_query(query, &parameters, &args(&[("label", "Amsterdam")])).unwrap();
    assert!(rewritten.contains("\"Amsterdam\"@en"));
}

#[test]
fn test_xsd_datatype_pulls_in_prefix() {
    let query = "SELECT ?s WHERE { ?s <http://example.org/born> ?_born_date }";
    let mut parameters = HashMap::new();
    parameters.insert(
        "born".to_string(),
        ParameterDescriptor {
            datatype: Some("xsd:date".to_string()),
            ..descriptor("born", "?_born_date")
        },
    );

    let rewritten = rewrite_query(query, &parameters, &args(&[("born", "1969-07-20")])).unwrap();
    assert!(rewritten.contains("\"1969-07-20\"^^xsd:date"));
    assert!(rewritten.starts_with("PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>"));
}

#[test]
fn test_xsd_prefix_not_duplicated() {
    let query = "PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>\nSELECT ?s WHERE { ?s <http://example.org/n> ?_n_integer }";
    let mut parameters = HashMap::new();
    parameters.insert(
        "n".to_string(),
        ParameterDescriptor {
            datatype: Some("xsd:integer".to_string()),
            ..descriptor("n", "?_n_integer")
        },
    );

    let rewritten = rewrite_query(query, &parameters, &args(&[("n", "4")])).unwrap();
    assert_eq!(rewritten.matches("PREFIX xsd:").count(), 1);
}

#[test]
fn test_missing_required_parameter_fails_without_substitution() {
    let query = "SELECT ?s WHERE { ?s ?p ?_a . ?s ?q ?_b }";
    let mut parameters = HashMap::new();
    parameters.insert("a".to_string(), descriptor("a", "?_a"));
    parameters.insert("b".to_string(), descriptor("b", "?_b"));

    let err = rewrite_query(query, &parameters, &args(&[("a", "x")])).unwrap_err();
    match err {
        Error::Validation(msg) => assert!(msg.contains("b"), "message names the gap: {}", msg),
        other => panic!("expected a validation error, got {}", other),
    }
}

#[test]
fn test_optional_parameter_may_be_absent() {
    let query = "SELECT ?s WHERE { ?s ?p ?__label }";
    let mut parameters = HashMap::new();
    parameters.insert(
        "label".to_string(),
        ParameterDescriptor { required: false, ..descriptor("label", "?__label") },
    );

    let rewritten = rewrite_query(query, &parameters, &HashMap::new()).unwrap();
    assert!(rewritten.contains("?__label"));
}

#[test]
fn test_boundary_safe_replacement() {
    let query = "SELECT ?s WHERE { ?s ?p ?_x . ?s ?q ?_x2 }";
    let mut parameters = HashMap::new();
    parameters.insert("x".to_string(), descriptor("x", "?_x"));
    parameters.insert(
        "x2".to_string(),
        ParameterDescriptor { required: false, ..descriptor("x2", "?_x2") },
    );

    let rewritten = rewrite_query(query, &parameters, &args(&[("x", "one")])).unwrap();
    assert!(rewritten.contains("\"one\""));
    assert!(rewritten.contains("?_x2"), "the longer placeholder must survive: {}", rewritten);
}

#[test]
fn test_unknown_and_empty_args_are_ignored() {
    let query = "SELECT ?s WHERE { ?s ?p ?__label }";
    let mut parameters = HashMap::new();
    parameters.insert(
        "label".to_string(),
        ParameterDescriptor { required: false, ..descriptor("label", "?__label") },
    );

    let rewritten =
        rewrite_query(query, &parameters, &args(&[("nosuch", "v"), ("label", "")])).unwrap();
    assert_eq!(rewritten, query);
}
