//! Rewriting and pagination benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use querify::parsing::decorator::extract;
use querify::templating::{paginate_query, rewrite_query, PlaceholderMatcher};
use std::collections::HashMap;

const DECORATED: &str = "\
#+ summary: Bands in a genre
#+ pagination: 100
PREFIX dbo: <http://dbpedia.org/ontology/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT ?band ?name WHERE {
  ?band dbo:genre ?_genre_iri .
  ?band rdfs:label ?name .
  ?band dbo:activeYearsStartYear ?_start_integer .
  FILTER (lang(?name) = ?__lang)
}
";

fn bench_extract(c: &mut Criterion) {
    c.bench_function("decorator_extract", |b| b.iter(|| extract(black_box(DECORATED))));
}

fn bench_scan(c: &mut Criterion) {
    let extracted = extract(DECORATED);
    let matcher = PlaceholderMatcher::new().unwrap();
    c.bench_function("placeholder_scan", |b| b.iter(|| matcher.scan(black_box(&extracted.query))));
}

fn bench_rewrite(c: &mut Criterion) {
    let extracted = extract(DECORATED);
    let matcher = PlaceholderMatcher::new().unwrap();
    let parameters: HashMap<_, _> = matcher
        .scan(&extracted.query)
        .into_iter()
        .map(|d| (d.name.clone(), d))
        .collect();
    let mut args = HashMap::new();
    args.insert("genre".to_string(), "http://dbpedia.org/resource/Rock_music".to_string());
    args.insert("start".to_string(), "1969".to_string());
    args.insert("lang".to_string(), "en".to_string());

    c.bench_function("query_rewrite", |b| {
        b.iter(|| rewrite_query(black_box(&extracted.query), &parameters, &args).unwrap())
    });
}

fn bench_paginate(c: &mut Criterion) {
    let extracted = extract(DECORATED);
    c.bench_function("query_paginate", |b| {
        b.iter(|| paginate_query(black_box(&extracted.query), 100, Some(7)))
    });
}

criterion_group!(benches, bench_extract, bench_scan, bench_rewrite, bench_paginate);
criterion_main!(benches);
