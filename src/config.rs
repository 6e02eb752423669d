// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Defaults are tuned for polite crawling of a single site:
// - one request at a time with a fixed 500ms pause after every page
// - 15s / 10s / 5s timeouts for page, link-extraction and HEAD requests
// - completed crawls are reused for 30 days
//
// `CrawlConfig::builder()` lets the CLI (or tests) override individual fields.
// =============================================================================

use chrono::TimeDelta;
use std::time::Duration;

/// Tuning knobs for a crawl and for the document pass that follows it.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// User agent sent with every request
    pub user_agent: String,

    /// Timeout for the full-page fetch of the document pass
    pub page_timeout: Duration,

    /// Timeout for the GET that feeds link extraction
    pub link_timeout: Duration,

    /// Timeout for the HEAD request that reads Last-Modified
    pub head_timeout: Duration,

    /// Fixed pause after every frontier entry
    pub politeness_delay: Duration,

    /// How long a completed crawl may be served from the store
    pub freshness_window: TimeDelta,

    /// Upper bound on visited + queued pages before the crawl is failed
    pub max_pages: usize,

    /// Length of the per-page summary, in characters
    pub summary_chars: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("site-scribe/{}", env!("CARGO_PKG_VERSION")),
            page_timeout: Duration::from_secs(15),
            link_timeout: Duration::from_secs(10),
            head_timeout: Duration::from_secs(5),
            politeness_delay: Duration::from_millis(500),
            freshness_window: TimeDelta::days(30),
            max_pages: 10_000,
            summary_chars: 300,
        }
    }
}

impl CrawlConfig {
    /// Create a new builder
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::new()
    }
}

/// Builder for `CrawlConfig`
#[derive(Debug, Default)]
pub struct CrawlConfigBuilder {
    config: CrawlConfig,
}

impl CrawlConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CrawlConfig::default(),
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.config.page_timeout = timeout;
        self
    }

    pub fn link_timeout(mut self, timeout: Duration) -> Self {
        self.config.link_timeout = timeout;
        self
    }

    pub fn head_timeout(mut self, timeout: Duration) -> Self {
        self.config.head_timeout = timeout;
        self
    }

    pub fn politeness_delay(mut self, delay: Duration) -> Self {
        self.config.politeness_delay = delay;
        self
    }

    pub fn freshness_days(mut self, days: i64) -> Self {
        self.config.freshness_window = TimeDelta::days(days);
        self
    }

    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    pub fn summary_chars(mut self, summary_chars: usize) -> Self {
        self.config.summary_chars = summary_chars;
        self
    }

    pub fn build(self) -> CrawlConfig {
        self.config
    }
}
