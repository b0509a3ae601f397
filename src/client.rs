//! HTTP client for SPARQL endpoints.
//!
//! All network-bound steps of the pipeline go through [`SparqlClient`]:
//! enumeration sub-queries, the final rewritten query, and sparql-update
//! dispatch for INSERT operations. Calls are sequential and carry no retry
//! policy; failures surface as [`Error::Http`] with the underlying message.

use log::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

use crate::config::ACCEPT_JSON;
use crate::endpoint::Credentials;
use crate::error::{Error, Result};
use crate::parsing::HttpMethod;

/// Response body plus the content type the endpoint answered with.
#[derive(Debug, Clone)]
pub struct SparqlResponse {
    pub body: String,
    pub content_type: String,
}

/// Client for dispatching queries to SPARQL endpoints.
pub struct SparqlClient {
    http: Client,
}

impl SparqlClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { http })
    }

    /// Runs a SELECT and decodes the `application/json` result document.
    pub async fn select_json(
        &self,
        endpoint: &str,
        query: &str,
        auth: Option<&Credentials>,
    ) -> Result<Value> {
        debug!("sending JSON query to {}", endpoint);
        let request = self
            .http
            .get(endpoint)
            .query(&[("query", query)])
            .header("Accept", ACCEPT_JSON);
        let response = with_auth(request, auth).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Http(format!("query failed with status {}: {}", status, body)));
        }
        Ok(response.json::<Value>().await?)
    }

    /// Dispatches a query, via GET with a `query` form parameter or POST
    /// with an `application/sparql-query` body.
    pub async fn execute(
        &self,
        endpoint: &str,
        query: &str,
        accept: &str,
        method: HttpMethod,
        auth: Option<&Credentials>,
    ) -> Result<SparqlResponse> {
        debug!("sending query to endpoint {} via {:?}", endpoint, method);
        let request = match method {
            HttpMethod::Get => self.http.get(endpoint).query(&[("query", query)]),
            _ => self
                .http
                .post(endpoint)
                .header("Content-Type", "application/sparql-query")
                .body(query.to_string()),
        };
        let response = with_auth(request.header("Accept", accept.to_string()), auth)
            .send()
            .await?;
        into_sparql_response(response).await
    }

    /// POSTs a SPARQL update (`application/sparql-update`).
    pub async fn update(
        &self,
        endpoint: &str,
        update: &str,
        accept: &str,
        auth: Option<&Credentials>,
    ) -> Result<SparqlResponse> {
        debug!("sending update to endpoint {}", endpoint);
        let request = self
            .http
            .post(endpoint)
            .header("Content-Type", "application/sparql-update")
            .header("Accept", accept.to_string())
            .body(update.to_string());
        let response = with_auth(request, auth).send().await?;
        into_sparql_response(response).await
    }
}

fn with_auth(request: RequestBuilder, auth: Option<&Credentials>) -> RequestBuilder {
    if let Some(creds) = auth {
        request.basic_auth(&creds.user, Some(&creds.password))
    } else {
        request
    }
}

async fn into_sparql_response(response: reqwest::Response) -> Result<SparqlResponse> {
    let status = response.status();
    let content_type = response
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(ACCEPT_JSON)
        .to_string();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(Error::Http(format!("endpoint answered {}: {}", status, body)));
    }
    Ok(SparqlResponse { body, content_type })
}
