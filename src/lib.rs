//! # querify
//!
//! querify is a SPARQL query templating engine: it turns a directory of
//! decorated query files into a parameterized HTTP API. Each query file
//! interleaves SPARQL text with `#+` decorator lines carrying metadata
//! (endpoint, summary, pagination, enumerations, defaults), and the query
//! body names its parameters through placeholder variables such as
//! `?_name` and `?__name_iri`. The engine derives parameter descriptors,
//! rewrites the query with caller-supplied values, paginates it, and
//! dispatches it to the resolved SPARQL endpoint.
//!
//! ## Example
//!
//! ```rust
//! use querify::parsing::decorator;
//!
//! let extracted = decorator::extract(
//!     "#+ summary: List all bands\nSELECT ?band WHERE { ?band a ?_kind_iri }",
//! );
//! assert_eq!(extracted.metadata.summary.as_deref(), Some("List all bands"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

/// HTTP client towards SPARQL endpoints
pub mod client;

/// Static defaults and per-instance configuration
pub mod config;

/// Endpoint resolution chain
pub mod endpoint;

/// Error types and result definitions
pub mod error;

/// HTTP API server
pub mod http;

/// Query-file loaders
pub mod loader;

/// Per-query metadata assembly
pub mod metadata;

/// Decorator extraction and query classification
pub mod parsing;

/// Parameter derivation, rewriting and pagination
pub mod templating;

// Re-export commonly used types
pub use error::{Error, Result};
pub use metadata::{get_query_metadata, QueryMetadata};
