// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling (sitemap discovery).
//
// Submodules:
// - classify: is a discovered URL worth crawling?
// - fetch: HTTP requests with per-request timeouts
// - links: fetch a page and pull out its crawlable links
// - job: the CrawlJob record and its lifecycle
// - engine: the breadth-first frontier loop
// =============================================================================

mod classify;
mod engine;
pub(crate) mod fetch;
mod job;
mod links;

pub use classify::is_eligible;
pub use engine::Crawler;
pub use fetch::{build_client, FetchedPage};
pub use job::{CrawlJob, DiscoveredPage, JobStatus, JobSummary, Progress};
pub use links::{extract_links, links_from_html};
