//! Query-file parsing: decorator extraction and SPARQL classification.

pub mod analyzer;
pub mod decorator;

pub use analyzer::{analyze, AnalyzedQuery, QueryType};
pub use decorator::{extract, DecoratorMetadata, EnumerateEntry, ExtractedQuery, HttpMethod};
