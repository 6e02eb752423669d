// src/observer.rs
// =============================================================================
// Progress reporting.
//
// The engine never knows how progress reaches the outside world. It calls a
// `CrawlObserver` synchronously from its loop:
// - on_page_discovered(url, is_new) for every frontier pop
// - on_complete(summary) or on_error(reason) exactly once at the end
//
// The caller picks the transport: a log line, a channel feeding a push
// stream, or nothing at all.
// =============================================================================

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::crawl::JobSummary;

/// Receives crawl progress. Implementations must be cheap; they run inline
/// with the crawl loop.
pub trait CrawlObserver: Send + Sync {
    fn on_page_discovered(&self, url: &str, is_new: bool);
    fn on_complete(&self, summary: &JobSummary);
    fn on_error(&self, reason: &str);
}

/// Ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CrawlObserver for NoopObserver {
    fn on_page_discovered(&self, _url: &str, _is_new: bool) {}
    fn on_complete(&self, _summary: &JobSummary) {}
    fn on_error(&self, _reason: &str) {}
}

/// Writes progress to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl CrawlObserver for LogObserver {
    fn on_page_discovered(&self, url: &str, is_new: bool) {
        if is_new {
            info!(url, "discovered page");
        }
    }

    fn on_complete(&self, summary: &JobSummary) {
        info!(
            base_url = %summary.base_url,
            pages = summary.pages,
            "crawl completed"
        );
    }

    fn on_error(&self, reason: &str) {
        warn!(reason, "crawl did not complete");
    }
}

/// Progress event as pushed through a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    PageDiscovered { url: String, is_new: bool },
    Completed(JobSummary),
    Failed { reason: String },
}

/// Forwards events into an mpsc channel.
///
/// When the receiving side goes away (e.g. a streaming client disconnected)
/// the optional token is cancelled so the crawl stops at its next iteration.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<CrawlEvent>,
    cancel_on_disconnect: Option<CancellationToken>,
}

impl ChannelObserver {
    pub fn new(sender: UnboundedSender<CrawlEvent>) -> Self {
        Self {
            sender,
            cancel_on_disconnect: None,
        }
    }

    pub fn cancel_on_disconnect(mut self, token: CancellationToken) -> Self {
        self.cancel_on_disconnect = Some(token);
        self
    }

    fn send(&self, event: CrawlEvent) {
        if self.sender.send(event).is_err() {
            if let Some(token) = &self.cancel_on_disconnect {
                token.cancel();
            }
        }
    }
}

impl CrawlObserver for ChannelObserver {
    fn on_page_discovered(&self, url: &str, is_new: bool) {
        self.send(CrawlEvent::PageDiscovered {
            url: url.to_string(),
            is_new,
        });
    }

    fn on_complete(&self, summary: &JobSummary) {
        self.send(CrawlEvent::Completed(summary.clone()));
    }

    fn on_error(&self, reason: &str) {
        self.send(CrawlEvent::Failed {
            reason: reason.to_string(),
        });
    }
}
