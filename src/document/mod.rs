// src/document/mod.rs
// =============================================================================
// Per-page records and the assembled documentation artifact.
//
// Submodules:
// - assemble: PageRecords + CrawlJob -> Markdown report and plain-text export
// - sitemap: CrawlJob -> sitemap XML
// =============================================================================

mod assemble;
mod sitemap;

pub use assemble::{assemble, assemble_at, export_file_name, PAGE_SEPARATOR};
pub use sitemap::sitemap_xml;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{normalize, to_plain_text};

/// One fetched (or unfetchable) page of a crawled site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Absolute, fragment-free URL
    pub url: String,
    /// Raw HTML as fetched; None when the fetch failed
    pub html: Option<String>,
    /// Normalized semantic HTML, or the failure marker
    pub content: String,
    pub summary: String,
    pub last_modified: NaiveDate,
    /// Why the fetch failed, when it did
    pub fetch_error: Option<String>,
}

impl PageRecord {
    /// Builds a record from a successfully fetched page.
    pub fn fetched(
        url: impl Into<String>,
        html: String,
        last_modified: NaiveDate,
        summary_chars: usize,
    ) -> Self {
        let content = normalize(&html);
        let summary = summarize(&to_plain_text(&content), summary_chars);
        Self {
            url: url.into(),
            html: Some(html),
            content,
            summary,
            last_modified,
            fetch_error: None,
        }
    }

    /// Builds a record for a page that could not be fetched.
    ///
    /// The content is an explicit marker, never an empty string.
    pub fn unavailable(
        url: impl Into<String>,
        reason: impl Into<String>,
        last_modified: NaiveDate,
    ) -> Self {
        let url = url.into();
        let marker = unavailable_marker(&url);
        Self {
            content: marker.clone(),
            summary: marker,
            url,
            html: None,
            last_modified,
            fetch_error: Some(reason.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.html.is_some()
    }
}

/// The assembled output for one crawled site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentArtifact {
    pub base_url: String,
    pub markdown: String,
    pub plain_text: String,
    pub generated_at: DateTime<Utc>,
    /// Name of the saved plain-text export, once it has been written
    pub export_file: Option<String>,
}

/// Placeholder text for a page whose content could not be fetched.
pub fn unavailable_marker(url: &str) -> String {
    format!("[content unavailable: {}]", url)
}

// Collapses whitespace and truncates to `max_chars` characters, appending
// "..." when anything was cut. Counts chars, so multi-byte text is never
// split mid-sequence.
pub fn summarize(plain: &str, max_chars: usize) -> String {
    let collapsed = plain.split_whitespace().collect::<Vec<_>>().join(" ");

    match collapsed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &collapsed[..cut]),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_summary_of_500_chars_is_303() {
        let body = "a".repeat(500);
        let summary = summarize(&body, 300);
        assert_eq!(summary.chars().count(), 303);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_short_summary_is_untouched() {
        assert_eq!(summarize("  short \n\n text ", 300), "short text");
        let exact = "b".repeat(300);
        assert_eq!(summarize(&exact, 300), exact);
    }

    #[test]
    fn test_summary_respects_multibyte_chars() {
        let body = "żółć".repeat(100);
        let summary = summarize(&body, 300);
        assert_eq!(summary.chars().count(), 303);
        assert!(summary.starts_with("żółćżółć"));
    }

    #[test]
    fn test_fetched_record_normalizes_content() {
        let html = "<html><body><nav>menu</nav>\
                    <p>Hello <b>world</b></p><script>x()</script></body></html>";
        let record = PageRecord::fetched("https://example.com/", html.to_string(), date(), 300);

        assert!(record.is_available());
        assert_eq!(record.content, "<p>Hello <b>world</b></p>");
        assert_eq!(record.summary, "Hello world");
        assert_eq!(record.fetch_error, None);
    }

    #[test]
    fn test_unavailable_record_has_marker() {
        let record = PageRecord::unavailable("https://example.com/slow", "timed out", date());

        assert!(!record.is_available());
        assert_eq!(record.content, "[content unavailable: https://example.com/slow]");
        assert!(!record.summary.is_empty());
        assert_eq!(record.fetch_error.as_deref(), Some("timed out"));
    }
}
