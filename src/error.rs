// src/error.rs
// =============================================================================
// Error type for the crawl library.
//
// Most failures during a crawl are NOT errors from the caller's point of view:
// a page that times out or returns 404 just degrades to a fallback (no links,
// "today" as last-modified, a failure marker as content). The variants here
// are the things that do reach the caller:
// - invalid input before a job exists
// - a job that ends in `failed` or `cancelled`
// - lookups for jobs that do not exist or are still running
// =============================================================================

use thiserror::Error;

use crate::crawl::JobStatus;

/// Errors surfaced by the crawl engine and the service facade.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error (building the client, sending a request, reading a body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The base URL handed to `start_crawl` is not a usable absolute URL
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The frontier grew past the configured page cap
    #[error("frontier exceeded {limit} pages")]
    FrontierOverflow { limit: usize },

    /// A job status change that would move backwards
    #[error("invalid job transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// The caller cancelled the crawl
    #[error("crawl cancelled")]
    Cancelled,

    /// A crawl for this base URL is already in progress
    #[error("a crawl for {0} is already running")]
    AlreadyRunning(String),

    /// No job has been created for this base URL
    #[error("no crawl job for {0}")]
    JobNotFound(String),

    /// The crawl task panicked or was aborted
    #[error("crawl task failed: {0}")]
    Join(String),
}

impl CrawlError {
    /// Builds an `InvalidUrl` from anything displayable.
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        CrawlError::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for CrawlError {
    fn from(err: tokio::task::JoinError) -> Self {
        CrawlError::Join(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = CrawlError::invalid_url("nope", "relative URL without a base");
        assert_eq!(err.to_string(), "invalid URL 'nope': relative URL without a base");
        assert_eq!(
            CrawlError::FrontierOverflow { limit: 2 }.to_string(),
            "frontier exceeded 2 pages"
        );
    }

    #[tokio::test]
    async fn test_panicked_task_becomes_join_error() {
        let joined = tokio::spawn(async {
            if true {
                panic!("boom");
            }
        })
        .await;
        let err = CrawlError::from(joined.unwrap_err());
        assert!(matches!(&err, CrawlError::Join(msg) if msg.contains("panicked")));
    }
}
