// src/crawl/classify.rs
// =============================================================================
// Decides whether a discovered URL should be crawled.
//
// A URL is eligible only if ALL of these hold:
// - it parses as an absolute URL
// - its hostname is exactly the base URL's hostname (no subdomains)
// - it has not been visited yet
// - its path does not end in a static-asset extension
// - its path does not contain an admin/auth/shop-flow segment
//
// This is a pure function - no network I/O - so it is tested entirely offline.
// Anything unparseable is simply "not eligible"; it never panics or errors.
// =============================================================================

use std::collections::HashSet;
use url::Url;

// Static files we never want in a sitemap (compared lowercase)
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".pdf", ".doc", ".docx", ".xls", ".xlsx",
    ".ppt", ".pptx", ".zip", ".rar", ".tar", ".gz", ".7z", ".mp3", ".mp4", ".avi", ".mov",
    ".webm", ".css", ".js", ".json", ".xml", ".rss", ".atom",
];

// Administrative / login / checkout areas
const EXCLUDED_PATHS: &[&str] = &[
    "/wp-admin",
    "/wp-login",
    "/admin",
    "/login",
    "/signin",
    "/cart",
    "/checkout",
];

// Checks if a candidate URL should be added to the crawl
//
// Parameters:
//   candidate: the absolute URL found on a page
//   base_url: the URL the crawl started from (defines the hostname)
//   visited: URLs already crawled in this job
//
// Returns: true if the crawler should visit `candidate`
//
// Example:
//   base = "https://example.com"
//   "https://example.com/docs"      -> true
//   "https://sub.example.com/docs"  -> false (different hostname)
//   "https://example.com/IMG.JPG"   -> false (static asset)
pub fn is_eligible(candidate: &str, base_url: &str, visited: &HashSet<String>) -> bool {
    let (Ok(parsed), Ok(base)) = (Url::parse(candidate), Url::parse(base_url)) else {
        return false;
    };

    match (parsed.host_str(), base.host_str()) {
        (Some(host), Some(base_host)) if host == base_host => {}
        _ => return false,
    }

    if visited.contains(candidate) {
        return false;
    }

    let path = parsed.path();
    let path_lower = path.to_lowercase();
    if EXCLUDED_EXTENSIONS.iter().any(|ext| path_lower.ends_with(ext)) {
        return false;
    }

    if EXCLUDED_PATHS.iter().any(|segment| path.contains(segment)) {
        return false;
    }

    true
}
