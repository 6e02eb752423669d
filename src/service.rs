// src/service.rs
// =============================================================================
// The public entry point: crawl a site, then turn it into documentation.
//
// Typical flow:
//
//   let scribe = SiteScribe::new(CrawlConfig::default())?;
//   let handle = scribe.start_crawl("https://example.com", Arc::new(LogObserver))?;
//   let job = handle.join().await?;                  // sitemap is ready
//   let doc = scribe.generate_document(job.base_url()).await?;
//   let xml = scribe.sitemap_xml(job.base_url())?;
//
// Base URLs are canonicalized once (`https://example.com` becomes
// `https://example.com/`) and every store key uses the canonical form, so
// lookups work with either spelling.
//
// A crawl completed within the freshness window is served from the store
// instead of being crawled again.
// =============================================================================

use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::CrawlConfig;
use crate::crawl::fetch::fetch_page;
use crate::crawl::{build_client, CrawlJob, Crawler, JobStatus};
use crate::document::{assemble, export_file_name, sitemap_xml, DocumentArtifact, PageRecord};
use crate::error::CrawlError;
use crate::observer::{CrawlObserver, LogObserver};
use crate::store::{JobClaim, JobStore, MemoryStore};

/// Crawls sites and produces sitemaps and documentation from them.
pub struct SiteScribe {
    store: Arc<dyn JobStore>,
    config: CrawlConfig,
    client: Client,
    crawler: Crawler,
}

/// A crawl that was started (or served from the cache).
///
/// Dropping the handle does not stop the crawl; call `cancel` for that.
pub struct JobHandle {
    id: Uuid,
    base_url: String,
    cancel: CancellationToken,
    outcome: Outcome,
}

enum Outcome {
    Cached(CrawlJob),
    Running(JoinHandle<Result<CrawlJob, CrawlError>>),
}

impl JobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when the job came from the store and no crawl is running
    pub fn is_cached(&self) -> bool {
        matches!(self.outcome, Outcome::Cached(_))
    }

    /// Asks the crawl to stop. It ends `cancelled` at its next iteration,
    /// keeping the pages found so far.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the crawl to finish and returns the completed job.
    ///
    /// A failed or cancelled crawl returns its error; the partial job stays
    /// readable through `SiteScribe::job`.
    pub async fn join(self) -> Result<CrawlJob, CrawlError> {
        match self.outcome {
            Outcome::Cached(job) => Ok(job),
            Outcome::Running(task) => task.await?,
        }
    }
}

impl SiteScribe {
    /// Creates a service backed by an in-memory store.
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Creates a service on top of an existing store.
    pub fn with_store(config: CrawlConfig, store: Arc<dyn JobStore>) -> Result<Self, CrawlError> {
        let client = build_client(&config)?;
        let crawler = Crawler::new(client.clone(), config.clone(), store.clone());
        Ok(Self {
            store,
            config,
            client,
            crawler,
        })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    // Starts crawling `base_url` in a background task
    //
    // Parameters:
    //   base_url - absolute http(s) URL; anything else is rejected before a
    //              job is created
    //   observer - receives progress; on a cache hit it only gets on_complete
    //
    // Returns:
    //   a handle to join or cancel the crawl, or
    //   CrawlError::InvalidUrl / CrawlError::AlreadyRunning
    pub fn start_crawl(
        &self,
        base_url: &str,
        observer: Arc<dyn CrawlObserver>,
    ) -> Result<JobHandle, CrawlError> {
        let base_url = canonical_base_url(base_url)?;
        let cancel = CancellationToken::new();

        match self.store.claim_job(&base_url, Utc::now(), self.config.freshness_window)? {
            JobClaim::Cached(job) => {
                info!(%base_url, pages = job.pages().len(), "serving crawl from cache");
                observer.on_complete(&job.summary());
                Ok(JobHandle {
                    id: job.id(),
                    base_url,
                    cancel,
                    outcome: Outcome::Cached(job),
                })
            }
            JobClaim::Created(mut job) => {
                let id = job.id();
                let crawler = self.crawler.clone();
                let store = self.store.clone();
                let token = cancel.clone();
                let key = base_url.clone();

                // The crawl runs in its own task so a panic inside it (engine
                // or observer) surfaces here as a JoinError instead of
                // leaving the stored job in `crawling`
                let task = tokio::spawn(async move {
                    let crawl_observer = observer.clone();
                    let crawl = tokio::spawn(async move {
                        crawler
                            .run(&mut job, crawl_observer.as_ref(), &token)
                            .await
                            .map(|()| job)
                    });

                    match crawl.await {
                        Ok(result) => result,
                        Err(e) => Err(fail_abandoned(store.as_ref(), &key, observer.as_ref(), e)),
                    }
                });

                Ok(JobHandle {
                    id,
                    base_url,
                    cancel,
                    outcome: Outcome::Running(task),
                })
            }
        }
    }

    /// Crawls `base_url` to completion, logging progress.
    pub async fn crawl(&self, base_url: &str) -> Result<CrawlJob, CrawlError> {
        self.start_crawl(base_url, Arc::new(LogObserver))?
            .join()
            .await
    }

    /// The latest job for `base_url`, in whatever state it is in.
    pub fn job(&self, base_url: &str) -> Option<CrawlJob> {
        self.store.job(&store_key(base_url))
    }

    /// True when a completed crawl for `base_url` exists (fresh or not).
    pub fn has_completed(&self, base_url: &str) -> bool {
        self.job(base_url)
            .map(|job| job.status() == JobStatus::Completed)
            .unwrap_or(false)
    }

    /// Sitemap XML for the latest job of `base_url`.
    pub fn sitemap_xml(&self, base_url: &str) -> Result<String, CrawlError> {
        let job = self
            .job(base_url)
            .ok_or_else(|| CrawlError::JobNotFound(store_key(base_url)))?;
        Ok(sitemap_xml(&job))
    }

    // Fetches every discovered page and assembles the documentation
    //
    // Pages are fetched one at a time with the page timeout and the same
    // politeness delay as the crawl. A page that fails to load becomes a
    // record with the failure marker; it never aborts the pass.
    //
    // The plain-text export is saved to the store as a file; its name is on
    // the returned artifact.
    pub async fn generate_document(&self, base_url: &str) -> Result<DocumentArtifact, CrawlError> {
        let key = store_key(base_url);
        let job = self
            .store
            .job(&key)
            .ok_or_else(|| CrawlError::JobNotFound(key.clone()))?;
        if !job.status().is_terminal() {
            return Err(CrawlError::AlreadyRunning(key));
        }

        info!(base_url = %key, pages = job.pages().len(), "generating document");
        let mut records = Vec::with_capacity(job.pages().len());

        for (i, page) in job.pages().iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.politeness_delay).await;
            }

            let record = match fetch_page(&self.client, &page.url, self.config.page_timeout).await {
                Ok(fetched) => PageRecord::fetched(
                    page.url.clone(),
                    fetched.body,
                    fetched.last_modified.unwrap_or(page.last_modified),
                    self.config.summary_chars,
                ),
                Err(e) => {
                    warn!(url = %page.url, error = %e, "page unavailable");
                    PageRecord::unavailable(page.url.clone(), e.to_string(), page.last_modified)
                }
            };

            self.store.put_page(record.clone());
            records.push(record);
        }

        let mut artifact = assemble(&job, &records);
        let file_name = export_file_name(&key, Uuid::new_v4());
        self.store
            .save_file(&file_name, artifact.plain_text.clone().into_bytes());
        artifact.export_file = Some(file_name);
        self.store.put_document(artifact.clone());

        info!(base_url = %key, "document ready");
        Ok(artifact)
    }

    pub fn get_document(&self, base_url: &str) -> Option<DocumentArtifact> {
        self.store.document(&store_key(base_url))
    }

    pub fn get_page(&self, url: &str) -> Option<PageRecord> {
        self.store.page(url)
    }

    pub fn get_file(&self, name: &str) -> Option<Vec<u8>> {
        self.store.file(name)
    }
}

/// Parses and canonicalizes a crawl root.
///
/// Only absolute http/https URLs with a host are accepted. The fragment is
/// dropped and an empty path becomes "/".
pub fn canonical_base_url(raw: &str) -> Result<String, CrawlError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| CrawlError::invalid_url(raw, e))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CrawlError::invalid_url(
            raw,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(CrawlError::invalid_url(raw, "missing host"));
    }

    url.set_fragment(None);
    Ok(url.to_string())
}

// Marks a job whose crawl task died (panic or abort) as failed
//
// Parameters:
//   store: where the job's last saved state lives
//   base_url: canonical key of the job
//   observer: told about the failure, like any other failed crawl
//   err: what the runtime reported for the dead task
//
// Returns: the error handed back to `JobHandle::join`
fn fail_abandoned(
    store: &dyn JobStore,
    base_url: &str,
    observer: &dyn CrawlObserver,
    err: tokio::task::JoinError,
) -> CrawlError {
    let err = CrawlError::from(err);
    let reason = err.to_string();
    warn!(%base_url, %reason, "crawl task died");

    if let Some(mut job) = store.job(base_url) {
        if !job.status().is_terminal() && job.fail(reason.clone()).is_ok() {
            store.save_job(&job);
        }
    }
    observer.on_error(&reason);
    err
}

// Lookups accept any spelling of a base URL; unparseable input is used as-is
// (and simply won't match anything)
fn store_key(base_url: &str) -> String {
    canonical_base_url(base_url).unwrap_or_else(|_| base_url.to_string())
}
