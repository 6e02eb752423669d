// src/main.rs
// =============================================================================
// Entry point of the site-scribe CLI.
//
// What happens here:
// 1. Install logging (stderr, filtered by RUST_LOG, default site_scribe=info)
// 2. Parse command-line arguments using clap
// 3. Run the crawl, racing it against Ctrl-C
// 4. Print or write the results
// 5. Exit with proper code (0 = success, 1 = crawl failed or cancelled,
//    2 = error)
//
// Logs go to stderr so `--json` / `--xml` output on stdout stays clean.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, CrawlArgs};
use site_scribe::{CrawlError, CrawlJob, DocumentArtifact, LogObserver, SiteScribe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("site_scribe=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = crawl (and document) finished
//   Ok(1) = crawl failed or was cancelled; partial results were reported
//   Err   = invalid input or an unexpected error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sitemap {
            url,
            json,
            xml,
            crawl,
        } => handle_sitemap(&url, json, xml, &crawl).await,
        Commands::Doc {
            url,
            out,
            json,
            crawl,
        } => handle_doc(&url, &out, json, &crawl).await,
    }
}

// Handles the 'sitemap' subcommand
// Parameters:
//   url: starting URL
//   json / xml: output format (table by default)
//   args: shared crawl options
async fn handle_sitemap(url: &str, json: bool, xml: bool, args: &CrawlArgs) -> Result<i32> {
    let scribe = SiteScribe::new(args.to_config()).context("failed to set up the HTTP client")?;

    let job = match crawl_until_done(&scribe, url).await? {
        Ok(job) => job,
        Err(code) => return Ok(code),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else if xml {
        println!("{}", scribe.sitemap_xml(job.base_url())?);
    } else {
        print_table(&job);
    }
    Ok(0)
}

// Handles the 'doc' subcommand
// Parameters:
//   url: starting URL
//   out: directory for document.md, sitemap.xml and the text export
//   json: print the artifact metadata as JSON when done
//   args: shared crawl options
async fn handle_doc(url: &str, out: &Path, json: bool, args: &CrawlArgs) -> Result<i32> {
    let scribe = SiteScribe::new(args.to_config()).context("failed to set up the HTTP client")?;

    let job = match crawl_until_done(&scribe, url).await? {
        Ok(job) => job,
        Err(code) => return Ok(code),
    };

    let artifact = scribe
        .generate_document(job.base_url())
        .await
        .context("failed to generate the document")?;
    let sitemap = scribe.sitemap_xml(job.base_url())?;
    let written = write_outputs(out, &artifact, &sitemap).await?;

    if json {
        let report = serde_json::json!({
            "base_url": artifact.base_url,
            "generated_at": artifact.generated_at,
            "pages": job.pages().len(),
            "files": written,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Documented {} page(s) of {}", job.pages().len(), artifact.base_url);
        for path in &written {
            println!("   wrote {}", path.display());
        }
    }
    Ok(0)
}

// Runs a crawl to the end, cancelling it on Ctrl-C
//
// Returns:
//   Ok(Ok(job))   = completed (or served from cache)
//   Ok(Err(1))    = failed or cancelled; the reason has been logged
//   Err           = the crawl could not start (bad URL, already running)
async fn crawl_until_done(
    scribe: &SiteScribe,
    url: &str,
) -> Result<std::result::Result<CrawlJob, i32>> {
    let handle = scribe.start_crawl(url, Arc::new(LogObserver))?;
    if handle.is_cached() {
        info!(base_url = handle.base_url(), "using a recent crawl");
    }

    let token = handle.cancellation_token();
    let base_url = handle.base_url().to_string();
    let mut join = Box::pin(handle.join());

    let finished = tokio::select! {
        result = &mut join => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let result = match finished {
        Some(result) => result,
        None => {
            warn!("interrupted, stopping crawl");
            token.cancel();
            join.await
        }
    };

    match result {
        Ok(job) => Ok(Ok(job)),
        Err(CrawlError::Cancelled) | Err(CrawlError::FrontierOverflow { .. }) => {
            if let Some(job) = scribe.job(&base_url) {
                eprintln!(
                    "Crawl {} with {} page(s) found",
                    job.status(),
                    job.pages().len()
                );
            }
            Ok(Err(1))
        }
        Err(e) => Err(e).context("crawl failed"),
    }
}

// Writes the three output files into `dir`
//
// Returns the paths written, in the order: report, sitemap, text export
async fn write_outputs(
    dir: &Path,
    artifact: &DocumentArtifact,
    sitemap: &str,
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let export_name = artifact
        .export_file
        .clone()
        .unwrap_or_else(|| "export.txt".to_string());

    let files = [
        (dir.join("document.md"), artifact.markdown.as_str()),
        (dir.join("sitemap.xml"), sitemap),
        (dir.join(export_name), artifact.plain_text.as_str()),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (path, contents) in files {
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

// Prints discovered pages as a table
fn print_table(job: &CrawlJob) {
    println!("{:<70} {:<12}", "URL", "LAST MODIFIED");
    println!("{}", "=".repeat(83));

    for page in job.pages() {
        // Truncate URL if too long for display (char boundary safe)
        let url_display = if page.url.chars().count() > 67 {
            format!("{}...", page.url.chars().take(67).collect::<String>())
        } else {
            page.url.clone()
        };
        println!("{:<70} {:<12}", url_display, page.last_modified);
    }

    println!();
    println!("Summary:");
    println!("   Status: {}", job.status());
    println!("   Pages: {}", job.pages().len());
}
