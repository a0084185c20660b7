//! Page-index pagination over the retrying transport.
//!
//! Pages are requested from index 0 upward until the source returns an empty
//! list. A failed page ends the listing and whatever was collected so far is
//! returned; the caller never sees an error. Pages are not a consistent
//! snapshot if the source changes mid-listing.

use std::future::Future;

use ferry_core::RawRecord;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::http::RetryingTransport;

/// Outcome of fetching one page.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Items(Vec<Value>),
    Failed(String),
}

/// Collect pages until an empty one (or a failure) is returned.
pub async fn collect_pages<F, Fut>(label: &str, mut fetch_page: F) -> Vec<Value>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Page>,
{
    let mut all = Vec::new();
    let mut page = 0;
    loop {
        match fetch_page(page).await {
            Page::Items(items) if items.is_empty() => break,
            Page::Items(items) => {
                all.extend(items);
                page += 1;
            }
            Page::Failed(reason) => {
                tracing::error!(
                    listing = label,
                    page,
                    collected = all.len(),
                    %reason,
                    "error fetching page; returning partial results"
                );
                break;
            }
        }
    }
    all
}

/// Append `page`/`per_page` query parameters to a listing URL.
#[must_use]
pub fn page_url(base: &str, page: u32, per_page: u32) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}page={page}&per_page={per_page}")
}

/// Fetches every page of a JSON-array listing endpoint.
pub struct PagedFetcher<'a> {
    transport: &'a RetryingTransport,
    headers: &'a HeaderMap,
    page_size: u32,
}

impl<'a> PagedFetcher<'a> {
    #[must_use]
    pub const fn new(transport: &'a RetryingTransport, headers: &'a HeaderMap, page_size: u32) -> Self {
        Self {
            transport,
            headers,
            page_size,
        }
    }

    /// All object records of the listing at `url`. Non-object items are dropped.
    pub async fn fetch_all(&self, url: &str) -> Vec<RawRecord> {
        collect_pages(url, |page| self.fetch_page(url, page))
            .await
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()
    }

    async fn fetch_page(&self, url: &str, page: u32) -> Page {
        let paged = page_url(url, page, self.page_size);
        let Some(resp) = self
            .transport
            .call(Method::GET, &paged, self.headers, None)
            .await
        else {
            return Page::Failed("request failed after retries".to_string());
        };

        if !resp.status().is_success() {
            return Page::Failed(format!("status code {}", resp.status().as_u16()));
        }

        match resp.json::<Vec<Value>>().await {
            Ok(items) => Page::Items(items),
            Err(e) => Page::Failed(format!("undecodable page body: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_url_appends_query() {
        assert_eq!(
            page_url("https://t.auth0.com/api/v2/users", 2, 20),
            "https://t.auth0.com/api/v2/users?page=2&per_page=20"
        );
        assert_eq!(
            page_url("https://t.auth0.com/api/v2/users?fields=email", 0, 5),
            "https://t.auth0.com/api/v2/users?fields=email&page=0&per_page=5"
        );
    }

    #[tokio::test]
    async fn collects_until_empty_page() {
        let mut requested = Vec::new();
        let items = collect_pages("users", |page| {
            requested.push(page);
            let result = match page {
                0 => Page::Items(vec![json!({"id": 1}), json!({"id": 2})]),
                1 => Page::Items(vec![json!({"id": 3})]),
                _ => Page::Items(Vec::new()),
            };
            async move { result }
        })
        .await;

        assert_eq!(items.len(), 3);
        assert_eq!(requested, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn failure_returns_partial_results() {
        let mut requested = Vec::new();
        let items = collect_pages("roles", |page| {
            requested.push(page);
            let result = if page == 0 {
                Page::Items(vec![json!({"id": "rol_1"})])
            } else {
                Page::Failed("status code 500".into())
            };
            async move { result }
        })
        .await;

        assert_eq!(items, vec![json!({"id": "rol_1"})]);
        assert_eq!(requested, vec![0, 1]);
    }

    #[tokio::test]
    async fn first_page_empty_yields_nothing() {
        let items = collect_pages("organizations", |_| async { Page::Items(Vec::new()) }).await;
        assert!(items.is_empty());
    }
}
