//! HTTP API server.
//!
//! Exposes each query file in the repository as one operation: listing,
//! execution (GET or POST, per the `method` decorator) and the parameter
//! objects an API spec builder consumes.

use crate::{
    client::SparqlClient,
    config::{mime_accept, Config, ACCEPT_JSON},
    endpoint::resolve_endpoint,
    error::Error,
    loader::FileLoader,
    metadata::{get_query_metadata, QueryMetadata, SpecParameter},
    parsing::QueryType,
    templating::{
        build_pagination_header, count_query_results, paginate_query, rewrite::replace_token,
        rewrite_query,
    },
};
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{info, warn};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

/// Request arguments that steer execution rather than substitute into the
/// query text.
const RESERVED_ARGS: &[&str] = &["endpoint", "page", "content"];

const SERVER_NAME: &str = concat!("querify/", env!("CARGO_PKG_VERSION"));

/// Response for listing queries
#[derive(Debug, Serialize)]
pub struct ListQueriesResponse {
    pub queries: Vec<String>,
    pub total: usize,
}

/// Response for the per-query parameter objects
#[derive(Debug, Serialize)]
pub struct QuerySpecResponse {
    pub name: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub endpoint: String,
    pub parameters: Vec<SpecParameter>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub loader: Arc<dyn FileLoader>,
    pub client: SparqlClient,
}

/// Custom error type for API errors
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed(String),
    UpstreamError(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::MethodNotAllowed(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg),
            ApiError::UpstreamError(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Http(msg) => ApiError::UpstreamError(msg),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

/// Create the HTTP server with all routes
pub fn create_server(config: Config, loader: Arc<dyn FileLoader>, client: SparqlClient) -> Router {
    let state = Arc::new(AppState { config, loader, client });

    // Configure CORS
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(list_queries))
        .route("/:name", get(execute_query).post(execute_query))
        .route("/:name/spec", get(query_spec))
        .layer(cors)
        .with_state(state)
}

/// GET / - List all queries in the repository
async fn list_queries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListQueriesResponse>, ApiError> {
    let queries = state.loader.query_names()?;
    let total = queries.len();

    Ok(Json(ListQueriesResponse { queries, total }))
}

/// GET /:name/spec - Parameter objects for one query operation
async fn query_spec(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<QuerySpecResponse>, ApiError> {
    let raw_query = state.loader.raw_query(&name)?;
    let resolved = resolve_endpoint(None, &raw_query, state.loader.as_ref(), &state.config);
    let metadata = get_query_metadata(
        &raw_query,
        &resolved.uri,
        &state.client,
        resolved.credentials.as_ref(),
    )
    .await?;

    Ok(Json(QuerySpecResponse {
        name,
        method: metadata.decorators.method().as_str().to_string(),
        summary: metadata.decorators.summary.clone(),
        description: metadata.decorators.description.clone(),
        tags: metadata.decorators.tags.clone(),
        endpoint: resolved.uri.clone(),
        parameters: metadata.spec_parameters(&resolved.uri),
    }))
}

/// GET|POST /:name - Execute one query operation
async fn execute_query(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    OriginalUri(uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let raw_query = state.loader.raw_query(&name)?;

    let override_endpoint = params.get("endpoint").map(String::as_str);
    let resolved =
        resolve_endpoint(override_endpoint, &raw_query, state.loader.as_ref(), &state.config);
    let metadata = get_query_metadata(
        &raw_query,
        &resolved.uri,
        &state.client,
        resolved.credentials.as_ref(),
    )
    .await?;

    let declared = metadata.decorators.method().as_str();
    if !method.as_str().eq_ignore_ascii_case(declared) && metadata.query_type != QueryType::InsertData
    {
        return Err(ApiError::MethodNotAllowed(format!(
            "query '{}' is exposed as {}",
            name,
            declared.to_uppercase()
        )));
    }

    let args: HashMap<String, String> = params
        .iter()
        .filter(|(k, _)| !RESERVED_ARGS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    if metadata.query_type == QueryType::InsertData {
        return execute_insert(&state, &name, &metadata, &resolved.uri, &method, &args).await;
    }

    let rewritten = match metadata.query_type {
        QueryType::Select | QueryType::Construct => {
            rewrite_query(&metadata.query, &metadata.parameters, &args)?
        }
        QueryType::Unknown => {
            warn!("dispatching unclassified query '{}' verbatim", name);
            metadata.query.clone()
        }
        QueryType::Modify => {
            return Err(ApiError::BadRequest(format!(
                "query '{}' is an update operation, which cannot be exposed here",
                name
            )))
        }
        _ => metadata.query.clone(),
    };

    let page = params.get("page").and_then(|p| p.parse::<u32>().ok());
    let final_query = match metadata.decorators.pagination {
        Some(per_page) => paginate_query(&rewritten, per_page, page),
        None => rewritten,
    };
    info!("sending query '{}' to {}", name, resolved.uri);

    let accept = negotiated_accept(&params, &headers);
    let result = state
        .client
        .execute(
            &resolved.uri,
            &final_query,
            accept,
            metadata.decorators.endpoint_method(),
            resolved.credentials.as_ref(),
        )
        .await?;

    let mut response_headers = HeaderMap::new();
    insert_header(&mut response_headers, header::CONTENT_TYPE, &result.content_type)?;
    insert_header(&mut response_headers, header::SERVER, SERVER_NAME)?;
    if let Some(per_page) = metadata.decorators.pagination {
        let count = count_query_results(&final_query, &resolved.uri);
        let link = build_pagination_header(count, per_page, page, &uri.to_string());
        insert_header(&mut response_headers, header::LINK, &link)?;
    }

    Ok((StatusCode::OK, response_headers, result.body).into_response())
}

/// Dispatches an INSERT DATA operation: the target graph replaces the
/// `?_g_iri` placeholder and the payload replaces the placeholder triple.
async fn execute_insert(
    state: &AppState,
    name: &str,
    metadata: &QueryMetadata,
    endpoint: &str,
    method: &Method,
    args: &HashMap<String, String>,
) -> Result<Response, ApiError> {
    if *method != Method::POST {
        return Err(ApiError::MethodNotAllowed(format!(
            "query '{}' inserts data and must be invoked via POST",
            name
        )));
    }

    let mut missing: Vec<&str> = ["g", "data"]
        .iter()
        .filter(|k| !args.contains_key(**k))
        .copied()
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(ApiError::BadRequest(format!(
            "provided parameters do not cover the required parameters: missing {}",
            missing.join(", ")
        )));
    }

    let update = replace_token(&metadata.query, "?_g_iri", &format!("<{}>", args["g"]))
        .replace("<s> <p> <o>", &args["data"]);
    info!("sending update '{}' to {}", name, endpoint);

    let result = state.client.update(endpoint, &update, ACCEPT_JSON, None).await?;

    let mut response_headers = HeaderMap::new();
    insert_header(&mut response_headers, header::CONTENT_TYPE, &result.content_type)?;
    insert_header(&mut response_headers, header::SERVER, SERVER_NAME)?;
    Ok((StatusCode::OK, response_headers, result.body).into_response())
}

/// Accept header for the endpoint: an explicit `content` shorthand wins,
/// then the caller's own Accept header, then JSON.
fn negotiated_accept<'a>(params: &'a HashMap<String, String>, headers: &'a HeaderMap) -> &'a str {
    if let Some(accept) = params.get("content").and_then(|c| mime_accept(c)) {
        return accept;
    }
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && *v != "*/*")
        .unwrap_or(ACCEPT_JSON)
}

fn insert_header(
    headers: &mut HeaderMap,
    name: header::HeaderName,
    value: &str,
) -> Result<(), ApiError> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| ApiError::InternalError(format!("invalid {} header: {}", name, e)))?;
    headers.insert(name, value);
    Ok(())
}

/// Start the HTTP server on the specified address
pub async fn start_server(
    addr: &str,
    config: Config,
    loader: Arc<dyn FileLoader>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = SparqlClient::new()?;
    let app = create_server(config, loader, client);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("querify API server listening on http://{}", addr);
    println!();
    println!("Available endpoints:");
    println!("  GET      /             - List all queries in the repository");
    println!("  GET|POST /:name        - Execute a query");
    println!("  GET      /:name/spec   - Parameter objects for a query");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
