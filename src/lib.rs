// src/lib.rs
// =============================================================================
// site-scribe: crawl one website, build its sitemap and turn every page into
// documentation-ready Markdown and plain text.
//
// Modules:
// - config: crawl tuning (timeouts, politeness delay, freshness window)
// - error: the library error type
// - crawl: URL classification, link extraction and the breadth-first engine
// - content: HTML normalization, plain-text and Markdown rendering
// - document: page records, the assembled report, sitemap XML
// - observer: progress callbacks (log, channel, nothing)
// - store: where jobs, pages, documents and export files are kept
// - service: `SiteScribe`, the entry point tying it all together
// =============================================================================

pub mod config;
pub mod content;
pub mod crawl;
pub mod document;
pub mod error;
pub mod observer;
pub mod service;
pub mod store;

pub use config::CrawlConfig;
pub use crawl::{CrawlJob, JobStatus, JobSummary};
pub use document::{DocumentArtifact, PageRecord};
pub use error::CrawlError;
pub use observer::{ChannelObserver, CrawlEvent, CrawlObserver, LogObserver, NoopObserver};
pub use service::{canonical_base_url, JobHandle, SiteScribe};
pub use store::{JobStore, MemoryStore};
