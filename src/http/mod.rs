//! HTTP API module.
//!
//! Thin front end over the templating core: one route per repository query,
//! plus listing and parameter-object endpoints.

pub mod server;

pub use server::{
    create_server, start_server, ApiError, AppState, ErrorResponse, ListQueriesResponse,
    QuerySpecResponse,
};
