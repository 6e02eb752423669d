// src/crawl/job.rs
// =============================================================================
// The record of one crawl run for a base URL.
//
// Lifecycle (only ever moves forward):
//
//   pending --> crawling --> completed
//                        \-> failed
//                        \-> cancelled
//
// The discovered-page list is append-only and never holds the same URL twice;
// its order is the order the engine discovered the pages in.
// =============================================================================

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::CrawlError;

/// Where a job is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Crawling,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Pending => "pending",
            JobStatus::Crawling => "crawling",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A page found during the crawl, with the date read from its HEAD response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPage {
    pub url: String,
    pub last_modified: NaiveDate,
}

/// Counters reported while a crawl runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Distinct pages discovered so far
    pub discovered: usize,
    /// Frontier entries popped and handled so far
    pub processed: usize,
    /// 0-100; only reaches 100 once the job completes
    pub percent: u8,
}

/// One crawl run for a base URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlJob {
    id: Uuid,
    base_url: String,
    status: JobStatus,
    pages: Vec<DiscoveredPage>,
    progress: Progress,
    completed_at: Option<DateTime<Utc>>,
    failure: Option<String>,
}

/// Snapshot handed to observers when a job finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub base_url: String,
    pub status: JobStatus,
    pub pages: usize,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CrawlJob {
    /// Creates a pending job. Ids are assigned by the store.
    pub fn new(id: Uuid, base_url: impl Into<String>) -> Self {
        Self {
            id,
            base_url: base_url.into(),
            status: JobStatus::Pending,
            pages: Vec::new(),
            progress: Progress::default(),
            completed_at: None,
            failure: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn pages(&self) -> &[DiscoveredPage] {
        &self.pages
    }

    /// Discovered URLs in discovery order
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.url.as_str())
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Why the job failed, if it did
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.iter().any(|p| p.url == url)
    }

    /// Appends a newly discovered page. Returns false (and changes nothing)
    /// if the URL is already in the list.
    pub fn push_page(&mut self, url: impl Into<String>, last_modified: NaiveDate) -> bool {
        let url = url.into();
        if self.contains(&url) {
            return false;
        }
        self.pages.push(DiscoveredPage { url, last_modified });
        self.progress.discovered = self.pages.len();
        true
    }

    /// Updates the processed counter and the percentage.
    ///
    /// `remaining` is the current frontier length. The percentage is capped
    /// at 99 until the job actually completes.
    pub fn record_processed(&mut self, processed: usize, remaining: usize) {
        self.progress.processed = processed;
        let total = processed + remaining;
        let percent = if total == 0 { 0 } else { processed * 100 / total };
        self.progress.percent = percent.min(99) as u8;
    }

    /// pending -> crawling
    pub fn begin(&mut self) -> Result<(), CrawlError> {
        self.transition(JobStatus::Crawling)
    }

    /// crawling -> completed; progress jumps to 100%
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), CrawlError> {
        self.transition(JobStatus::Completed)?;
        self.progress.percent = 100;
        self.completed_at = Some(at);
        Ok(())
    }

    /// -> failed, keeping every page discovered so far
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), CrawlError> {
        self.transition(JobStatus::Failed)?;
        self.failure = Some(reason.into());
        Ok(())
    }

    /// -> cancelled, keeping every page discovered so far
    pub fn cancel(&mut self) -> Result<(), CrawlError> {
        self.transition(JobStatus::Cancelled)
    }

    fn transition(&mut self, to: JobStatus) -> Result<(), CrawlError> {
        let allowed = match (self.status, to) {
            (JobStatus::Pending, JobStatus::Crawling) => true,
            (JobStatus::Pending | JobStatus::Crawling, JobStatus::Failed) => true,
            (JobStatus::Pending | JobStatus::Crawling, JobStatus::Cancelled) => true,
            (JobStatus::Crawling, JobStatus::Completed) => true,
            _ => false,
        };

        if !allowed {
            return Err(CrawlError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// A completed job finished less than `window` before `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        match (self.status, self.completed_at) {
            (JobStatus::Completed, Some(at)) => now - at < window,
            _ => false,
        }
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            base_url: self.base_url.clone(),
            status: self.status,
            pages: self.pages.len(),
            completed_at: self.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn job() -> CrawlJob {
        CrawlJob::new(Uuid::new_v4(), "https://example.com/")
    }

    #[test]
    fn test_push_page_never_duplicates() {
        let mut job = job();
        assert!(job.push_page("https://example.com/", today()));
        assert!(job.push_page("https://example.com/about", today()));
        assert!(!job.push_page("https://example.com/", today()));

        let urls: Vec<_> = job.urls().collect();
        assert_eq!(urls, vec!["https://example.com/", "https://example.com/about"]);
        assert_eq!(job.progress().discovered, 2);
    }

    #[test]
    fn test_lifecycle_moves_forward_only() {
        let mut job = job();
        assert!(job.complete(Utc::now()).is_err(), "pending cannot complete");

        job.begin().unwrap();
        job.complete(Utc::now()).unwrap();
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.progress().percent, 100);

        assert!(matches!(
            job.begin(),
            Err(CrawlError::InvalidTransition {
                from: JobStatus::Completed,
                to: JobStatus::Crawling
            })
        ));
        assert!(job.fail("late").is_err());
    }

    #[test]
    fn test_failure_keeps_pages() {
        let mut job = job();
        job.begin().unwrap();
        job.push_page("https://example.com/", today());
        job.fail("frontier exploded").unwrap();

        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.failure(), Some("frontier exploded"));
        assert_eq!(job.pages().len(), 1);
    }

    #[test]
    fn test_percent_capped_until_complete() {
        let mut job = job();
        job.record_processed(3, 1);
        assert_eq!(job.progress().percent, 75);
        job.record_processed(10, 0);
        assert_eq!(job.progress().percent, 99);
    }

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        let window = TimeDelta::days(30);

        let mut recent = job();
        recent.begin().unwrap();
        recent.complete(now - TimeDelta::days(10)).unwrap();
        assert!(recent.is_fresh(now, window));

        let mut stale = job();
        stale.begin().unwrap();
        stale.complete(now - TimeDelta::days(40)).unwrap();
        assert!(!stale.is_fresh(now, window));

        let mut failed = job();
        failed.fail("boom").unwrap();
        assert!(!failed.is_fresh(now, window));
    }
}
