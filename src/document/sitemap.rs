// src/document/sitemap.rs
// =============================================================================
// Sitemap XML for a crawled site, one <url> entry per discovered page in
// discovery order. changefreq and priority are fixed for every entry.
// =============================================================================

use quick_xml::escape::escape;

use crate::crawl::CrawlJob;

const CHANGE_FREQUENCY: &str = "weekly";
const PRIORITY: &str = "0.7";

/// Renders the sitemap for `job`.
pub fn sitemap_xml(job: &CrawlJob) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for url in job.urls() {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape(url)));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", CHANGE_FREQUENCY));
        xml.push_str(&format!("    <priority>{}</priority>\n", PRIORITY));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>");
    xml
}
