// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
//   site-scribe sitemap <url> [--json | --xml] [crawl options]
//   site-scribe doc <url> [--out DIR] [--json] [crawl options]
//
// Crawl options are shared by both subcommands through a flattened struct
// and map one-to-one onto `CrawlConfig`.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use site_scribe::CrawlConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "site-scribe",
    version,
    about = "Crawl a website, build its sitemap and turn its pages into documentation",
    long_about = "site-scribe crawls every page reachable from a starting URL on the same host, \
                  then writes a sitemap, a Markdown report and a plain-text export of the content."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a site and print the pages it contains
    ///
    /// Example: site-scribe sitemap https://example.com --xml
    Sitemap {
        /// Starting URL; only pages on the same host are crawled
        url: String,

        /// Print the crawl job as JSON instead of a table
        #[arg(long, conflicts_with = "xml")]
        json: bool,

        /// Print the sitemap XML instead of a table
        #[arg(long)]
        xml: bool,

        #[command(flatten)]
        crawl: CrawlArgs,
    },

    /// Crawl a site and write its documentation to a directory
    ///
    /// Writes document.md, sitemap.xml and the plain-text export.
    ///
    /// Example: site-scribe doc https://example.com --out ./docs
    Doc {
        /// Starting URL; only pages on the same host are crawled
        url: String,

        /// Directory the files are written to (created if missing)
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Print the document metadata as JSON when done
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        crawl: CrawlArgs,
    },
}

/// Options shared by every crawling subcommand
#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Pause after every page, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// Give up when more than this many pages are found
    #[arg(long, default_value_t = 10_000)]
    pub max_pages: usize,

    /// User agent sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Reuse a completed crawl younger than this many days
    #[arg(long, default_value_t = 30)]
    pub fresh_days: i64,
}

impl CrawlArgs {
    pub fn to_config(&self) -> CrawlConfig {
        let mut builder = CrawlConfig::builder()
            .politeness_delay(Duration::from_millis(self.delay_ms))
            .max_pages(self.max_pages)
            .freshness_days(self.fresh_days);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_sitemap_with_defaults() {
        let cli = Cli::try_parse_from(["site-scribe", "sitemap", "https://example.com"]).unwrap();
        match cli.command {
            Commands::Sitemap { url, json, xml, crawl } => {
                assert_eq!(url, "https://example.com");
                assert!(!json && !xml);
                let config = crawl.to_config();
                assert_eq!(config.politeness_delay, Duration::from_millis(500));
                assert_eq!(config.max_pages, 10_000);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_crawl_flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "site-scribe",
            "doc",
            "https://example.com",
            "--out",
            "/tmp/docs",
            "--delay-ms",
            "0",
            "--max-pages",
            "50",
            "--user-agent",
            "bot/1.0",
            "--fresh-days",
            "7",
        ])
        .unwrap();
        match cli.command {
            Commands::Doc { out, crawl, .. } => {
                assert_eq!(out, PathBuf::from("/tmp/docs"));
                let config = crawl.to_config();
                assert_eq!(config.politeness_delay, Duration::ZERO);
                assert_eq!(config.max_pages, 50);
                assert_eq!(config.user_agent, "bot/1.0");
                assert_eq!(config.freshness_window, chrono::TimeDelta::days(7));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_json_and_xml_conflict() {
        let parsed = Cli::try_parse_from([
            "site-scribe",
            "sitemap",
            "https://example.com",
            "--json",
            "--xml",
        ]);
        assert!(parsed.is_err());
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It splices the fields of CrawlArgs into the subcommand's own flags
//    - Both `sitemap` and `doc` accept --delay-ms etc. without repeating them
//
// 2. Why Option<String> for user_agent?
//    - None means "flag not given", so the library default is kept
//    - clap makes Option fields optional flags automatically
//
// 3. Why a separate to_config()?
//    - The CLI speaks in milliseconds and days, the library in Durations
//    - Converting in one place keeps main.rs free of unit juggling
// -----------------------------------------------------------------------------
