//! Query templating: parameter derivation, enumeration, substitution and
//! pagination.

pub mod enumeration;
pub mod pagination;
pub mod parameters;
pub mod rewrite;

pub use pagination::{build_pagination_header, count_query_results, paginate_query};
pub use parameters::{resolve_parameters, ParamType, ParameterDescriptor, PlaceholderMatcher};
pub use rewrite::rewrite_query;
