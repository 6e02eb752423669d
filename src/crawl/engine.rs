// src/crawl/engine.rs
// =============================================================================
// Breadth-first crawl of one site.
//
// How it works:
// 1. Start with the base URL in a FIFO queue (the frontier)
// 2. Pop the head URL; skip it if already visited
// 3. Otherwise mark it visited, record it in the job and read its
//    Last-Modified date with a HEAD request
// 4. Extract links from the page and push every new one to the tail
// 5. Pause for the politeness delay, then repeat until the queue is empty
//
// Politeness:
// - Pages are fetched one at a time, never concurrently within a job
// - A fixed delay follows EVERY page, whether the fetch worked or not
// - Only the base URL's hostname is crawled
//
// The visited set and the frontier are locals of `run`; nobody else can touch
// them. The outside world only sees the job (through the store) and the
// observer callbacks.
// =============================================================================

use chrono::Utc;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::fetch::last_modified;
use super::job::CrawlJob;
use super::links::extract_links;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::observer::CrawlObserver;
use crate::store::JobStore;

/// Runs crawl jobs. Cheap to clone; one instance can serve many jobs.
#[derive(Clone)]
pub struct Crawler {
    client: Client,
    config: CrawlConfig,
    store: Arc<dyn JobStore>,
}

impl Crawler {
    pub fn new(client: Client, config: CrawlConfig, store: Arc<dyn JobStore>) -> Self {
        Self {
            client,
            config,
            store,
        }
    }

    // Crawls `job.base_url()` until the frontier is empty
    //
    // The job must be pending. On return it is in a terminal state:
    //   Ok(())                          -> completed
    //   Err(CrawlError::Cancelled)      -> cancelled, pages so far kept
    //   Err(anything else)              -> failed with a reason, pages kept
    //
    // Exactly one of observer.on_complete / observer.on_error is called.
    #[instrument(skip_all, fields(base_url = %job.base_url()))]
    pub async fn run(
        &self,
        job: &mut CrawlJob,
        observer: &dyn CrawlObserver,
        cancel: &CancellationToken,
    ) -> Result<(), CrawlError> {
        job.begin()?;
        self.store.save_job(job);
        info!("crawl started");

        match self.discover(job, observer, cancel).await {
            Ok(()) => {
                job.complete(Utc::now())?;
                self.store.save_job(job);
                info!(pages = job.pages().len(), "crawl completed");
                observer.on_complete(&job.summary());
                Ok(())
            }
            Err(CrawlError::Cancelled) => {
                job.cancel()?;
                self.store.save_job(job);
                info!(pages = job.pages().len(), "crawl cancelled");
                observer.on_error("crawl cancelled");
                Err(CrawlError::Cancelled)
            }
            Err(e) => {
                let reason = e.to_string();
                job.fail(reason.clone())?;
                self.store.save_job(job);
                warn!(%reason, pages = job.pages().len(), "crawl failed");
                observer.on_error(&reason);
                Err(e)
            }
        }
    }

    // The frontier loop itself
    async fn discover(
        &self,
        job: &mut CrawlJob,
        observer: &dyn CrawlObserver,
        cancel: &CancellationToken,
    ) -> Result<(), CrawlError> {
        let base_url = job.base_url().to_string();

        let mut frontier = VecDeque::new();
        let mut queued = HashSet::new();
        frontier.push_back(base_url.clone());
        queued.insert(base_url.clone());

        let mut visited: HashSet<String> = HashSet::new();
        let mut processed = 0usize;

        while let Some(url) = frontier.pop_front() {
            if cancel.is_cancelled() {
                return Err(CrawlError::Cancelled);
            }
            queued.remove(&url);
            processed += 1;

            if visited.contains(&url) {
                observer.on_page_discovered(&url, false);
                job.record_processed(processed, frontier.len());
                continue;
            }

            visited.insert(url.clone());
            observer.on_page_discovered(&url, true);

            let lastmod = last_modified(&self.client, &url, self.config.head_timeout).await;
            job.push_page(url.clone(), lastmod);

            let links = extract_links(
                &self.client,
                &url,
                &base_url,
                &visited,
                self.config.link_timeout,
            )
            .await;
            debug!(%url, links = links.len(), "extracted links");

            for link in links {
                if !visited.contains(&link) && !queued.contains(&link) {
                    queued.insert(link.clone());
                    frontier.push_back(link);
                }
            }

            if visited.len() + frontier.len() > self.config.max_pages {
                return Err(CrawlError::FrontierOverflow {
                    limit: self.config.max_pages,
                });
            }

            job.record_processed(processed, frontier.len());
            self.store.save_job(job);

            // Fixed pause after every page; a cancel cuts it short
            tokio::select! {
                _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
                _ = tokio::time::sleep(self.config.politeness_delay) => {}
            }
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why both `queued` and `visited`?
//    - visited: pages already fetched
//    - queued: pages waiting in the frontier
//    - Checking both before push_back keeps a link from entering the queue
//      twice when several pages point at it
//
// 2. What does tokio::select! do here?
//    - It waits on two futures and runs the branch of whichever finishes first
//    - A cancel during the politeness sleep ends the crawl right away
//      instead of after the full delay
//
// 3. What is a CancellationToken?
//    - A cloneable flag from tokio-util
//    - cancel() on any clone is seen by all of them
//    - cancelled() is a future that completes once the flag is set
//
// 4. Why &dyn CrawlObserver?
//    - The engine doesn't care which observer it gets
//    - dyn means "any type implementing the trait", chosen at runtime
//
// 5. What does #[instrument] add?
//    - Every log line inside run() carries the base_url field
//    - skip_all keeps the (large) arguments out of the span
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetch::build_client;
    use crate::crawl::JobStatus;
    use crate::observer::NoopObserver;
    use crate::store::MemoryStore;
    use mockito::{Server, ServerGuard};
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;
    use uuid::Uuid;

    // Records every callback so tests can check order and terminal events
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl CrawlObserver for Recorder {
        fn on_page_discovered(&self, url: &str, is_new: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("page {} {}", url, is_new));
        }

        fn on_complete(&self, summary: &crate::crawl::JobSummary) {
            self.events
                .lock()
                .unwrap()
                .push(format!("complete {}", summary.pages));
        }

        fn on_error(&self, reason: &str) {
            self.events.lock().unwrap().push(format!("error {}", reason));
        }
    }

    fn test_config() -> CrawlConfig {
        CrawlConfig::builder()
            .politeness_delay(Duration::ZERO)
            .link_timeout(Duration::from_secs(5))
            .head_timeout(Duration::from_secs(5))
            .build()
    }

    fn crawler(config: CrawlConfig, store: Arc<MemoryStore>) -> Crawler {
        let client = build_client(&config).unwrap();
        Crawler::new(client, config, store)
    }

    async fn page(server: &mut ServerGuard, path: &str, body: &str) {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(body)
            .create_async()
            .await;
    }

    // Home links to /about and /contact; both link back home and off-site
    async fn small_site(server: &mut ServerGuard) {
        page(
            server,
            "/",
            r#"<a href="/about">About</a> <a href="/contact">Contact</a>
               <a href="https://other.com/">Other</a>"#,
        )
        .await;
        page(
            server,
            "/about",
            r#"<a href="/">Home</a><a href="https://other.com">Other</a>"#,
        )
        .await;
        page(
            server,
            "/contact",
            r#"<a href="/">Home</a><a href="https://other.com">Other</a>"#,
        )
        .await;
    }

    fn urls(job: &CrawlJob) -> Vec<String> {
        job.urls().map(str::to_string).collect()
    }

    #[tokio::test]
    async fn test_discovers_same_origin_pages_in_bfs_order() {
        let mut server = Server::new_async().await;
        small_site(&mut server).await;
        let base = format!("{}/", server.url());

        let store = Arc::new(MemoryStore::new());
        let recorder = Recorder::default();
        let mut job = CrawlJob::new(Uuid::new_v4(), base.clone());

        crawler(test_config(), store.clone())
            .run(&mut job, &recorder, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            urls(&job),
            vec![
                base.clone(),
                format!("{}about", base),
                format!("{}contact", base)
            ]
        );
        assert!(!urls(&job).iter().any(|u| u.contains("other.com")));
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.progress().percent, 100);
        assert!(job.completed_at().is_some());

        let events = recorder.events();
        assert_eq!(events.last().unwrap(), "complete 3");

        // the store sees the same final state
        let stored = store.job(&base).unwrap();
        assert_eq!(stored.status(), JobStatus::Completed);
        assert_eq!(stored.pages().len(), 3);
    }

    #[tokio::test]
    async fn test_two_runs_produce_same_order() {
        let mut server = Server::new_async().await;
        page(
            &mut server,
            "/",
            r#"<a href="/c">c</a><a href="/a">a</a><a href="/b">b</a>"#,
        )
        .await;
        page(&mut server, "/c", r#"<a href="/c/deep">deep</a>"#).await;
        page(&mut server, "/a", r#"<a href="/b">b</a>"#).await;
        page(&mut server, "/b", "").await;
        page(&mut server, "/c/deep", r#"<a href="/a">a</a>"#).await;
        let base = format!("{}/", server.url());

        let mut orders = Vec::new();
        for _ in 0..2 {
            let mut job = CrawlJob::new(Uuid::new_v4(), base.clone());
            crawler(test_config(), Arc::new(MemoryStore::new()))
                .run(&mut job, &NoopObserver, &CancellationToken::new())
                .await
                .unwrap();
            orders.push(urls(&job));
        }

        assert_eq!(orders[0], orders[1]);
        assert_eq!(
            orders[0],
            vec![
                base.clone(),
                format!("{}c", base),
                format!("{}a", base),
                format!("{}b", base),
                format!("{}c/deep", base),
            ]
        );
        let unique: HashSet<_> = orders[0].iter().collect();
        assert_eq!(unique.len(), orders[0].len());
    }

    #[tokio::test]
    async fn test_failed_pages_do_not_abort_crawl() {
        let mut server = Server::new_async().await;
        page(
            &mut server,
            "/",
            r#"<a href="/broken">broken</a><a href="/fine">fine</a>"#,
        )
        .await;
        server
            .mock("GET", "/broken")
            .with_status(500)
            .create_async()
            .await;
        page(&mut server, "/fine", "").await;
        let base = format!("{}/", server.url());

        let mut job = CrawlJob::new(Uuid::new_v4(), base.clone());
        crawler(test_config(), Arc::new(MemoryStore::new()))
            .run(&mut job, &NoopObserver, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            urls(&job),
            vec![base.clone(), format!("{}broken", base), format!("{}fine", base)]
        );
    }

    #[tokio::test]
    async fn test_slow_page_times_out_and_crawl_continues() {
        let mut server = Server::new_async().await;
        page(
            &mut server,
            "/",
            r#"<a href="/slow">slow</a><a href="/fast">fast</a>"#,
        )
        .await;
        server
            .mock("GET", "/slow")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(1500));
                w.write_all(br#"<a href="/never">never</a>"#)
            })
            .create_async()
            .await;
        page(&mut server, "/fast", "").await;
        let base = format!("{}/", server.url());

        let config = CrawlConfig::builder()
            .politeness_delay(Duration::ZERO)
            .link_timeout(Duration::from_millis(200))
            .build();
        let mut job = CrawlJob::new(Uuid::new_v4(), base.clone());
        crawler(config, Arc::new(MemoryStore::new()))
            .run(&mut job, &NoopObserver, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            urls(&job),
            vec![base.clone(), format!("{}slow", base), format!("{}fast", base)]
        );
        assert_eq!(job.status(), JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_frontier_overflow_fails_job_and_keeps_pages() {
        let mut server = Server::new_async().await;
        page(
            &mut server,
            "/",
            r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#,
        )
        .await;
        let base = format!("{}/", server.url());

        let config = CrawlConfig::builder()
            .politeness_delay(Duration::ZERO)
            .max_pages(2)
            .build();
        let store = Arc::new(MemoryStore::new());
        let recorder = Recorder::default();
        let mut job = CrawlJob::new(Uuid::new_v4(), base.clone());

        let result = crawler(config, store.clone())
            .run(&mut job, &recorder, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(CrawlError::FrontierOverflow { limit: 2 })));
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.failure().unwrap().contains("2 pages"));
        assert_eq!(urls(&job), vec![base.clone()]);
        assert!(recorder.events().last().unwrap().starts_with("error"));
        assert_eq!(store.job(&base).unwrap().status(), JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_cancel_stops_between_pages() {
        let mut server = Server::new_async().await;
        small_site(&mut server).await;
        let base = format!("{}/", server.url());

        // a long politeness delay gives the cancel something to interrupt
        let config = CrawlConfig::builder()
            .politeness_delay(Duration::from_secs(30))
            .build();
        let store = Arc::new(MemoryStore::new());
        let cancel = CancellationToken::new();

        let crawler = crawler(config, store.clone());
        let task_cancel = cancel.clone();
        let task_base = base.clone();
        let task = tokio::spawn(async move {
            let mut job = CrawlJob::new(Uuid::new_v4(), task_base);
            let result = crawler.run(&mut job, &NoopObserver, &task_cancel).await;
            (job, result)
        });

        tokio::time::sleep(Duration::from_millis(300)).await;
        cancel.cancel();
        let (job, result) = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("crawl should stop promptly")
            .unwrap();

        assert!(matches!(result, Err(CrawlError::Cancelled)));
        assert_eq!(job.status(), JobStatus::Cancelled);
        assert_eq!(urls(&job), vec![base.clone()]);
        assert_ne!(job.progress().percent, 100);
        assert_eq!(store.job(&base).unwrap().status(), JobStatus::Cancelled);
    }
}
