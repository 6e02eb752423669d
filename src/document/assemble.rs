// src/document/assemble.rs
// =============================================================================
// Builds the Markdown report and the plain-text export for a crawled site.
//
// Layout of the Markdown report:
//
//   # Documentation for https://example.com/
//
//   Generated automatically.
//
//   ## Site structure
//
//   - https://example.com/
//   - https://example.com/about
//
//   ## https://example.com/
//
//   _Last modified: 2024-03-01_
//
//   ...page content as Markdown...
//
//   ---
//   Generated: 2024-03-02 10:00:00 UTC
//
// Pages appear in discovery order. A page without a usable record still gets
// its section, with an "unavailable" note instead of content.
// =============================================================================

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Write as _;
use uuid::Uuid;

use super::{unavailable_marker, DocumentArtifact, PageRecord};
use crate::content::{semantic_to_markdown, to_plain_text};
use crate::crawl::CrawlJob;

/// Marker between pages in the plain-text export
pub const PAGE_SEPARATOR: &str = "\n\n--- New Page ---\n\n";

/// Assembles the document for `job`, stamped with the current time.
pub fn assemble(job: &CrawlJob, records: &[PageRecord]) -> DocumentArtifact {
    assemble_at(job, records, Utc::now())
}

/// Same as `assemble`, with an explicit generation time.
pub fn assemble_at(
    job: &CrawlJob,
    records: &[PageRecord],
    generated_at: DateTime<Utc>,
) -> DocumentArtifact {
    let by_url: HashMap<&str, &PageRecord> = records
        .iter()
        .map(|record| (record.url.as_str(), record))
        .collect();

    let mut markdown = String::new();
    let _ = writeln!(markdown, "# Documentation for {}", job.base_url());
    markdown.push_str("\nGenerated automatically.\n\n## Site structure\n\n");
    for url in job.urls() {
        let _ = writeln!(markdown, "- {}", url);
    }

    let mut exports = Vec::with_capacity(job.pages().len());

    for page in job.pages() {
        let record = by_url
            .get(page.url.as_str())
            .copied()
            .filter(|record| record.is_available());

        let _ = write!(markdown, "\n## {}\n\n", page.url);
        match record {
            Some(record) => {
                let _ = writeln!(markdown, "_Last modified: {}_\n", record.last_modified);
                let body = semantic_to_markdown(&record.content);
                if body.is_empty() {
                    markdown.push_str("_No readable content._\n");
                } else {
                    markdown.push_str(&body);
                    markdown.push('\n');
                }
                exports.push(to_plain_text(&record.content));
            }
            None => {
                let _ = writeln!(markdown, "_Last modified: {}_\n", page.last_modified);
                markdown.push_str("_Content unavailable: this page could not be fetched._\n");
                exports.push(unavailable_marker(&page.url));
            }
        }
    }

    let _ = write!(
        markdown,
        "\n---\nGenerated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    DocumentArtifact {
        base_url: job.base_url().to_string(),
        markdown,
        plain_text: exports.join(PAGE_SEPARATOR),
        generated_at,
        export_file: None,
    }
}

// "https://a.io/x" -> "https___a_io_x_<uuid>.txt"
pub fn export_file_name(base_url: &str, id: Uuid) -> String {
    let stem: String = base_url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}.txt", stem, id)
}
