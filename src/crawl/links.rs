// src/crawl/links.rs
// =============================================================================
// Extracts crawlable links from a page.
//
// Steps for each page:
// 1. GET the page (bounded timeout, identifying user agent)
// 2. Parse the HTML with `scraper` and select every <a href>
// 3. Resolve each href against the PAGE url (not the base url)
// 4. Strip the #fragment
// 5. Keep it only if the classifier says it's eligible
// 6. Drop duplicates, keeping the order links appear in the page
//
// Failure policy: extraction "fails closed". A network error or non-2xx
// status yields an empty list, and one bad href never stops the others.
// =============================================================================

use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::classify::is_eligible;
use super::fetch::fetch_page;
use crate::error::CrawlError;

// Fetches `page_url` and returns the eligible links found on it
//
// Parameters:
//   client: shared HTTP client
//   page_url: the page to fetch (relative links resolve against it)
//   base_url: the crawl's base URL (defines the allowed hostname)
//   visited: pages already crawled in this job
//   timeout: bound for the GET request
//
// Returns: absolute, fragment-free, deduplicated URLs in page order
pub async fn extract_links(
    client: &Client,
    page_url: &str,
    base_url: &str,
    visited: &HashSet<String>,
    timeout: Duration,
) -> Vec<String> {
    match fetch_page(client, page_url, timeout).await {
        Ok(page) => links_from_html(&page.body, page_url, base_url, visited),
        Err(CrawlError::Status { status, .. }) => {
            debug!(url = page_url, status, "non-success status, no links");
            Vec::new()
        }
        Err(e) => {
            warn!(url = page_url, error = %e, "link extraction failed");
            Vec::new()
        }
    }
}

// Extracts eligible links from HTML that has already been fetched
//
// This is the offline half of `extract_links`, kept separate so the parsing
// rules can be tested without a server.
pub fn links_from_html(
    html: &str,
    page_url: &str,
    base_url: &str,
    visited: &HashSet<String>,
) -> Vec<String> {
    let page = match Url::parse(page_url) {
        Ok(url) => url,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);
    let selector = anchor_selector();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(absolute_url) = resolve_link(&page, href) else {
            continue;
        };

        if is_eligible(&absolute_url, base_url, visited) && seen.insert(absolute_url.clone()) {
            links.push(absolute_url);
        }
    }

    links
}

// Resolves an href to an absolute URL without its fragment
//
// Examples (page = "https://example.com/docs/"):
//   "intro"           -> Some("https://example.com/docs/intro")
//   "/about#team"     -> Some("https://example.com/about")
//   "#top"            -> Some("https://example.com/docs/")
//   "http://[broken"  -> None
fn resolve_link(page: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut url = page.join(href).ok()?;
    url.set_fragment(None);
    Some(url.to_string())
}

fn anchor_selector() -> Selector {
    // constant selector, always valid
    Selector::parse("a[href]").expect("static selector")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use crate::crawl::fetch::build_client;
    use mockito::Server;

    const BASE: &str = "https://example.com/";

    fn extract(html: &str, page: &str) -> Vec<String> {
        links_from_html(html, page, BASE, &HashSet::new())
    }

    #[test]
    fn test_resolves_relative_to_page_not_base() {
        let html = r#"<a href="intro">Intro</a>"#;
        let links = extract(html, "https://example.com/docs/");
        assert_eq!(links, vec!["https://example.com/docs/intro"]);
    }

    #[test]
    fn test_strips_fragment_and_dedupes() {
        let html = r##"
            <a href="/about#team">Team</a>
            <a href="/about">About</a>
            <a href='/about#history'>History</a>
        "##;
        let links = extract(html, BASE);
        assert_eq!(links, vec!["https://example.com/about"]);
    }

    #[test]
    fn test_keeps_page_order() {
        let html = r#"<a href="/b">B</a><a href="/a">A</a><a href="/c">C</a>"#;
        let links = extract(html, BASE);
        assert_eq!(
            links,
            vec![
                "https://example.com/b",
                "https://example.com/a",
                "https://example.com/c"
            ]
        );
    }

    #[test]
    fn test_filters_external_assets_and_special_schemes() {
        let html = r#"
            <a href="https://other.com/">Other</a>
            <a href="/logo.png">Logo</a>
            <a href="mailto:hi@example.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="/wp-admin/">Admin</a>
            <a href="/guide">Guide</a>
        "#;
        let links = extract(html, BASE);
        assert_eq!(links, vec!["https://example.com/guide"]);
    }

    #[test]
    fn test_bad_href_does_not_abort_the_rest() {
        let html = r#"
            <a href="http://[::1">broken</a>
            <a href="">empty</a>
            <a href="/still-here">ok</a>
        "#;
        let links = extract(html, BASE);
        assert_eq!(links, vec!["https://example.com/still-here"]);
    }

    #[test]
    fn test_skips_visited() {
        let mut visited = HashSet::new();
        visited.insert("https://example.com/".to_string());
        let html = r#"<a href="/">Home</a><a href="/news">News</a>"#;
        let links = links_from_html(html, BASE, BASE, &visited);
        assert_eq!(links, vec!["https://example.com/news"]);
    }

    #[test]
    fn test_malformed_markup_still_parses() {
        let html = r#"<div><a href=/unquoted>x<p><a href="/nested">y</div>"#;
        let links = extract(html, BASE);
        assert_eq!(
            links,
            vec!["https://example.com/unquoted", "https://example.com/nested"]
        );
    }

    #[tokio::test]
    async fn test_extract_links_fails_closed_on_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(500)
            .with_body(r#"<a href="/hidden">x</a>"#)
            .create_async()
            .await;

        let client = build_client(&CrawlConfig::default()).unwrap();
        let base = format!("{}/", server.url());
        let links = extract_links(
            &client,
            &base,
            &base,
            &HashSet::new(),
            Duration::from_secs(5),
        )
        .await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_extract_links_from_server() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/one">1</a><a href="two">2</a>"#)
            .create_async()
            .await;

        let client = build_client(&CrawlConfig::default()).unwrap();
        let base = format!("{}/", server.url());
        let links = extract_links(
            &client,
            &base,
            &base,
            &HashSet::new(),
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(links, vec![format!("{}one", base), format!("{}two", base)]);
    }
}
