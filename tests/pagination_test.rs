//! Pagination Integration Tests
//!
//! Tests for LIMIT/OFFSET rewriting and the RFC 5988 Link header builder.

use querify::templating::{build_pagination_header, count_query_results, paginate_query};

#[test]
fn test_page_two_offsets_past_page_one() {
    let paginated = paginate_query("SELECT ?s WHERE { ?s ?p ?o }", 10, Some(2));
    assert!(paginated.ends_with("LIMIT 10 OFFSET 10"));
}

#[test]
fn test_default_page_is_the_first() {
    let paginated = paginate_query("SELECT ?s WHERE { ?s ?p ?o }", 5, None);
    assert!(paginated.ends_with("LIMIT 5 OFFSET 0"));
}

#[test]
fn test_existing_limit_and_offset_are_stripped() {
    let paginated = paginate_query("SELECT ?s WHERE { ?s ?p ?o } LIMIT 500 OFFSET 20", 10, Some(3));
    assert_eq!(paginated.matches("LIMIT").count(), 1);
    assert_eq!(paginated.matches("OFFSET").count(), 1);
    assert!(paginated.ends_with("LIMIT 10 OFFSET 20"));
}

#[test]
fn test_repagination_never_stacks_clauses() {
    let once = paginate_query("SELECT ?s WHERE { ?s ?p ?o }", 10, Some(2));
    let twice = paginate_query(&once, 10, Some(3));
    assert_eq!(twice.matches("LIMIT").count(), 1);
    assert!(twice.ends_with("LIMIT 10 OFFSET 20"));
}

#[test]
fn test_link_header_middle_page_has_all_relations() {
    let header = build_pagination_header(1000, 100, Some(5), "http://host/api/q?code=nl&page=5");
    assert!(header.contains("page=6>; rel=next"));
    assert!(header.contains("page=4>; rel=prev"));
    assert!(header.contains("page=1>; rel=first"));
    assert!(header.contains("page=10>; rel=last"));
    // Other request arguments survive the rewrite.
    assert!(header.contains("code=nl"));
}

#[test]
fn test_link_header_first_request_has_next_and_last() {
    let header = build_pagination_header(1000, 100, None, "http://host/api/q");
    assert!(header.contains("rel=next"));
    assert!(header.contains("rel=last"));
    assert!(!header.contains("rel=prev"));
}

#[test]
fn test_link_header_final_page_has_prev_and_first() {
    let header = build_pagination_header(1000, 100, Some(10), "http://host/api/q?page=10");
    assert!(header.contains("page=9>; rel=prev"));
    assert!(header.contains("page=1>; rel=first"));
    assert!(!header.contains("rel=next"));
}

#[test]
fn test_partial_final_page_stays_reachable() {
    // 1001 results at 100 per page leave one row on page 11.
    let header = build_pagination_header(1001, 100, Some(2), "http://host/api/q");
    assert!(header.contains("page=11>; rel=last"));
}

#[test]
fn test_count_is_the_documented_placeholder() {
    assert_eq!(count_query_results("SELECT ?s WHERE { ?s ?p ?o }", "http://host/sparql"), 1000);
}
