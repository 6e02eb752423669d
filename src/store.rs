// src/store.rs
// =============================================================================
// Where jobs, pages, documents and exported files live.
//
// The engine and the service only talk to the `JobStore` trait, so a
// persistent backend can replace `MemoryStore` without touching crawl logic.
//
// Keys:
// - jobs and documents: canonical base URL
// - page records: page URL
// - files: export file name
//
// The store owns job id generation (UUID v4 at creation time).
// =============================================================================

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::crawl::{CrawlJob, JobStatus};
use crate::document::{DocumentArtifact, PageRecord};
use crate::error::CrawlError;

/// Result of asking the store for a job to run
#[derive(Debug, Clone)]
pub enum JobClaim {
    /// A completed job newer than the freshness cutoff; nothing to crawl
    Cached(CrawlJob),
    /// A brand-new pending job that the caller now owns
    Created(CrawlJob),
}

/// Storage for crawl state. All methods are synchronous and short.
pub trait JobStore: Send + Sync {
    /// Atomically returns a fresh cached job or creates a new pending one.
    ///
    /// A job completed less than `window` before `now` is returned as
    /// `Cached`. A job that is still running yields
    /// `CrawlError::AlreadyRunning`. Anything else is replaced by a new job
    /// with a new id, and the document built from the old job is dropped.
    fn claim_job(
        &self,
        base_url: &str,
        now: DateTime<Utc>,
        window: TimeDelta,
    ) -> Result<JobClaim, CrawlError>;

    fn job(&self, base_url: &str) -> Option<CrawlJob>;

    fn save_job(&self, job: &CrawlJob);

    fn put_page(&self, record: PageRecord);

    fn page(&self, url: &str) -> Option<PageRecord>;

    fn put_document(&self, artifact: DocumentArtifact);

    fn document(&self, base_url: &str) -> Option<DocumentArtifact>;

    fn save_file(&self, name: &str, contents: Vec<u8>);

    fn file(&self, name: &str) -> Option<Vec<u8>>;
}

#[derive(Debug, Default)]
struct Tables {
    jobs: HashMap<String, CrawlJob>,
    pages: HashMap<String, PageRecord>,
    documents: HashMap<String, DocumentArtifact>,
    files: HashMap<String, Vec<u8>>,
}

/// In-process store guarded by a single RwLock
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock can't leave the maps half-updated
    // (every write is a single insert), so poisoned locks are recovered.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JobStore for MemoryStore {
    // Check and insert happen under one write lock, so two callers racing
    // on the same base URL can't both get `Created`.
    //
    // Parameters:
    //   base_url: canonical base URL (the job key)
    //   now: reference time for the freshness check
    //   window: how old a completed job may be and still count as cached
    fn claim_job(
        &self,
        base_url: &str,
        now: DateTime<Utc>,
        window: TimeDelta,
    ) -> Result<JobClaim, CrawlError> {
        let mut tables = self.write();

        if let Some(existing) = tables.jobs.get(base_url) {
            match existing.status() {
                JobStatus::Pending | JobStatus::Crawling => {
                    return Err(CrawlError::AlreadyRunning(base_url.to_string()));
                }
                _ if existing.is_fresh(now, window) => {
                    return Ok(JobClaim::Cached(existing.clone()));
                }
                _ => {}
            }
        }

        // A document assembled from the replaced job no longer matches
        let job = CrawlJob::new(Uuid::new_v4(), base_url);
        tables.documents.remove(base_url);
        tables.jobs.insert(base_url.to_string(), job.clone());
        Ok(JobClaim::Created(job))
    }

    fn job(&self, base_url: &str) -> Option<CrawlJob> {
        self.read().jobs.get(base_url).cloned()
    }

    // Overwrites whatever is stored under the job's base URL
    fn save_job(&self, job: &CrawlJob) {
        self.write()
            .jobs
            .insert(job.base_url().to_string(), job.clone());
    }

    fn put_page(&self, record: PageRecord) {
        self.write().pages.insert(record.url.clone(), record);
    }

    fn page(&self, url: &str) -> Option<PageRecord> {
        self.read().pages.get(url).cloned()
    }

    fn put_document(&self, artifact: DocumentArtifact) {
        self.write()
            .documents
            .insert(artifact.base_url.clone(), artifact);
    }

    fn document(&self, base_url: &str) -> Option<DocumentArtifact> {
        self.read().documents.get(base_url).cloned()
    }

    fn save_file(&self, name: &str, contents: Vec<u8>) {
        self.write().files.insert(name.to_string(), contents);
    }

    fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.read().files.get(name).cloned()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait (JobStore) and a struct (MemoryStore)?
//    - The trait says what a store can do
//    - MemoryStore is one way of doing it; a database-backed store could be
//      another, and nothing else would change
//
// 2. What is Send + Sync on the trait?
//    - Send: the value can move to another thread
//    - Sync: several threads can use it through shared references
//    - Both are needed because crawl tasks run on tokio's worker threads
//
// 3. Why RwLock?
//    - Many readers OR one writer at a time
//    - Lookups (job, page, document) don't block each other
//
// 4. What is lock poisoning?
//    - If a thread panics while holding the lock, the lock is "poisoned"
//    - into_inner() takes the data anyway; it is safe here because every
//      write is a single insert or remove
// -----------------------------------------------------------------------------
