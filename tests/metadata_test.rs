//! Metadata Assembly Integration Tests
//!
//! Tests for the full derivation pipeline over the repository fixtures:
//! decorators, classification, parameter descriptors, and the parameter
//! objects handed to a spec builder.

use querify::client::SparqlClient;
use querify::loader::{FileLoader, LocalLoader};
use querify::metadata::get_query_metadata;
use querify::parsing::QueryType;
use std::path::PathBuf;

fn repo() -> LocalLoader {
    LocalLoader::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/repo"))
}

#[tokio::test]
async fn test_full_pipeline_over_a_decorated_query() {
    let raw = repo().raw_query("test-rq").unwrap();
    let client = SparqlClient::new().unwrap();
    let metadata = get_query_metadata(&raw, "http://unreachable.invalid/sparql", &client, None)
        .await
        .unwrap();

    assert_eq!(metadata.query_type, QueryType::Select);
    assert_eq!(metadata.variables, vec!["band", "name"]);
    assert!(!metadata.query.contains("#+"));
    assert!(metadata.original_query.contains("#+ endpoint:"));

    let genre = &metadata.parameters["genre"];
    assert!(genre.required);
    assert_eq!(genre.format.as_deref(), Some("iri"));
    assert_eq!(genre.default.as_deref(), Some("http://dbpedia.org/resource/Rock_music"));
}

#[tokio::test]
async fn test_insert_data_gets_the_fixed_descriptors() {
    let raw = "INSERT DATA { GRAPH ?_g_iri { <s> <p> <o> } }";
    let client = SparqlClient::new().unwrap();
    let metadata = get_query_metadata(raw, "http://unreachable.invalid/sparql", &client, None)
        .await
        .unwrap();

    assert_eq!(metadata.query_type, QueryType::InsertData);
    assert_eq!(metadata.parameters.len(), 2);
    assert_eq!(metadata.parameters["g"].placeholder, "?_g_iri");
    assert_eq!(metadata.parameters["g"].format.as_deref(), Some("iri"));
    assert!(metadata.parameters["data"].required);
}

#[tokio::test]
async fn test_unclassified_query_yields_no_parameters() {
    let client = SparqlClient::new().unwrap();
    let metadata =
        get_query_metadata("not sparql", "http://unreachable.invalid/sparql", &client, None)
            .await
            .unwrap();
    assert_eq!(metadata.query_type, QueryType::Unknown);
    assert!(metadata.parameters.is_empty());
}

#[tokio::test]
async fn test_vendor_function_prefix_is_injected() {
    let raw = "SELECT ?o WHERE { ?s ?p ?o . FILTER (bif:contains(?o, \"rock\")) }";
    let client = SparqlClient::new().unwrap();
    let metadata = get_query_metadata(raw, "http://unreachable.invalid/sparql", &client, None)
        .await
        .unwrap();
    assert!(metadata.query.starts_with("PREFIX bif: <:bif>"));
}

#[tokio::test]
async fn test_spec_parameters_for_a_paginated_query() {
    let raw = repo().raw_query("test-sparql").unwrap();
    let client = SparqlClient::new().unwrap();
    let metadata = get_query_metadata(&raw, "http://unreachable.invalid/sparql", &client, None)
        .await
        .unwrap();

    let spec = metadata.spec_parameters("http://resolved.example.org/sparql");
    let names: Vec<&str> = spec.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["page", "endpoint", "lang"]);

    let page = &spec[0];
    assert_eq!(page.param_type, "int");
    assert!(!page.required);

    let endpoint = &spec[1];
    assert_eq!(endpoint.default.as_deref(), Some("http://resolved.example.org/sparql"));

    let lang = &spec[2];
    assert_eq!(lang.location, "query");
    assert!(!lang.required);
    assert!(lang.description.contains("?__lang"));
}

#[tokio::test]
async fn test_spec_parameter_serialization_shape() {
    let raw = repo().raw_query("test-rq").unwrap();
    let client = SparqlClient::new().unwrap();
    let metadata = get_query_metadata(&raw, "http://unreachable.invalid/sparql", &client, None)
        .await
        .unwrap();

    let spec = metadata.spec_parameters("http://resolved.example.org/sparql");
    let genre = spec.iter().find(|p| p.name == "genre").unwrap();
    let json = serde_json::to_value(genre).unwrap();
    assert_eq!(json["type"], "string");
    assert_eq!(json["in"], "query");
    assert_eq!(json["format"], "iri");
    assert!(json.get("enum").is_none());
    assert!(json["description"]
        .as_str()
        .unwrap()
        .contains("will substitute ?_genre_iri in the original query"));
}
