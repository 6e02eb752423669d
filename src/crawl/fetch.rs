// src/crawl/fetch.rs
// =============================================================================
// HTTP plumbing shared by the crawl engine and the document pass.
//
// Three kinds of request, each with its own timeout:
// - GET for link extraction (10s by default)
// - GET for full page content (15s by default)
// - HEAD for the Last-Modified header (5s by default)
//
// One reqwest Client is built per service and reused for every request
// (connection pooling); timeouts are applied per request.
// =============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::LAST_MODIFIED;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::CrawlConfig;
use crate::error::CrawlError;

/// A successfully fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    /// Parsed from the response's Last-Modified header, if present
    pub last_modified: Option<NaiveDate>,
}

// Creates the HTTP client used for the whole service
//
// The user agent identifies the crawler to site owners; redirects are
// followed but capped so a redirect loop can't stall a crawl.
pub fn build_client(config: &CrawlConfig) -> Result<Client, CrawlError> {
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

// Fetches a page and returns its HTML
//
// Non-2xx statuses become `CrawlError::Status` so callers can decide how to
// degrade (no links, failure marker, ...).
pub async fn fetch_page(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<FetchedPage, CrawlError> {
    let response = client.get(url).timeout(timeout).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let last_modified = response
        .headers()
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date);

    let body = response.text().await?;
    Ok(FetchedPage {
        body,
        last_modified,
    })
}

// Reads the Last-Modified date of a page with a HEAD request
//
// Never fails: any error (timeout, no header, unparseable header) falls back
// to today's date, the same as a page fetched right now.
pub async fn last_modified(client: &Client, url: &str, timeout: Duration) -> NaiveDate {
    let header_date = match client.head(url).timeout(timeout).send().await {
        Ok(response) => response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date),
        Err(e) => {
            debug!(url, error = %e, "HEAD request failed");
            None
        }
    };

    header_date.unwrap_or_else(|| Utc::now().date_naive())
}

// Parses an HTTP date ("Wed, 21 Oct 2015 07:28:00 GMT") into a calendar date
fn parse_http_date(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn client() -> Client {
        build_client(&CrawlConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_http_date() {
        assert_eq!(
            parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT"),
            NaiveDate::from_ymd_opt(2015, 10, 21)
        );
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[tokio::test]
    async fn test_fetch_page_success_reads_last_modified() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/docs")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_header("last-modified", "Tue, 02 Jan 2024 10:00:00 GMT")
            .with_body("<p>hello</p>")
            .create_async()
            .await;

        let url = format!("{}/docs", server.url());
        let page = fetch_page(&client(), &url, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.body, "<p>hello</p>");
        assert_eq!(page.last_modified, NaiveDate::from_ymd_opt(2024, 1, 2));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_is_status_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/missing", server.url());
        let result = fetch_page(&client(), &url, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(CrawlError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_last_modified_uses_header() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("HEAD", "/page")
            .with_status(200)
            .with_header("last-modified", "Fri, 01 Mar 2019 08:00:00 GMT")
            .create_async()
            .await;

        let url = format!("{}/page", server.url());
        let date = last_modified(&client(), &url, Duration::from_secs(5)).await;
        assert_eq!(Some(date), NaiveDate::from_ymd_opt(2019, 3, 1));
    }

    #[tokio::test]
    async fn test_last_modified_falls_back_to_today() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("HEAD", "/page")
            .with_status(200)
            .create_async()
            .await;

        let url = format!("{}/page", server.url());
        let date = last_modified(&client(), &url, Duration::from_secs(5)).await;
        assert_eq!(date, Utc::now().date_naive());
    }
}
