//! Pagination rewriting and RFC 5988 Link headers.
//!
//! Paginating a query strips any existing LIMIT/OFFSET clause and appends a
//! page-bounded one; re-paginating an already paginated string therefore
//! never stacks clauses.

use log::debug;
use regex::Regex;

/// Stand-in total used for page-link arithmetic. Counting the real total
/// would take a second full query per request, which is far too expensive
/// just to number the result pages.
pub const PLACEHOLDER_RESULT_COUNT: u64 = 1000;

/// Total number of results the query would produce. See
/// [`PLACEHOLDER_RESULT_COUNT`]; the count query is deliberately not sent.
pub fn count_query_results(_query: &str, _endpoint: &str) -> u64 {
    PLACEHOLDER_RESULT_COUNT
}

/// Rewrites the query to return one page of at most `results_per_page`
/// rows. Pages are 1-based; `None` means the first page.
pub fn paginate_query(query: &str, results_per_page: u32, page: Option<u32>) -> String {
    let page = u64::from(page.unwrap_or(1).max(1));
    debug!("paginating query for page {}, {} results per page", page, results_per_page);

    let limit_offset = Regex::new(r"(LIMIT|OFFSET)\s+\d+").unwrap();
    let stripped = limit_offset.replace_all(query, "");

    format!(
        "{} LIMIT {} OFFSET {}",
        stripped.trim_end(),
        results_per_page,
        (page - 1) * u64::from(results_per_page)
    )
}

/// Builds the `Link:` header value for a paginated response
/// (`rel=next|prev|first|last`).
///
/// The last page uses ceiling division so the final partial page stays
/// reachable.
pub fn build_pagination_header(
    result_count: u64,
    results_per_page: u32,
    page: Option<u32>,
    url: &str,
) -> String {
    let per_page = u64::from(results_per_page.max(1));
    let last_page = ((result_count + per_page - 1) / per_page).max(1);

    let first_url = with_page(url, 1);
    let last_url = with_page(url, last_page);

    match page {
        None => {
            let next_url = with_page(url, 1);
            format!("<{}>; rel=next, <{}>; rel=last", next_url, last_url)
        }
        Some(page) if u64::from(page) >= last_page => {
            let prev_url = with_page(url, u64::from(page) - 1);
            format!("<{}>; rel=prev, <{}>; rel=first", prev_url, first_url)
        }
        Some(page) => {
            let next_url = with_page(url, u64::from(page) + 1);
            let prev_url = with_page(url, u64::from(page) - 1);
            format!(
                "<{}>; rel=next, <{}>; rel=prev, <{}>; rel=first, <{}>; rel=last",
                next_url, prev_url, first_url, last_url
            )
        }
    }
}

/// Returns `url` with its `page` query argument set to `page`, keeping every
/// other argument in place.
fn with_page(url: &str, page: u64) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, query),
        None => (url, ""),
    };

    let mut pairs: Vec<(String, String)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect();

    match pairs.iter_mut().find(|(k, _)| k == "page") {
        Some(pair) => pair.1 = page.to_string(),
        None => pairs.push(("page".to_string(), page.to_string())),
    }

    let query = pairs
        .iter()
        .map(|(k, v)| if v.is_empty() { k.clone() } else { format!("{}={}", k, v) })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", base, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_page_replaces_existing_argument() {
        assert_eq!(
            with_page("http://host/api/q?code=nl&page=3", 4),
            "http://host/api/q?code=nl&page=4"
        );
        assert_eq!(with_page("http://host/api/q", 1), "http://host/api/q?page=1");
    }

    #[test]
    fn test_last_page_is_ceiling() {
        // 101 results at 10 per page reach page 11.
        let header = build_pagination_header(101, 10, Some(2), "http://host/q");
        assert!(header.contains("page=11>; rel=last"));
    }
}
