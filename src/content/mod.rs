// src/content/mod.rs
// =============================================================================
// This module turns fetched HTML into documentation-ready text.
//
// Submodules:
// - normalize: raw HTML -> semantic HTML (only meaningful tags survive)
// - plain: semantic HTML -> plain text with bullets and blank lines
// - markdown: semantic HTML -> Markdown for the assembled report
//
// All three walk a real DOM (scraper / html5ever). Regexes are only used in
// `tidy`, the final whitespace pass.
// =============================================================================

mod markdown;
mod normalize;
mod plain;

pub use markdown::semantic_to_markdown;
pub use normalize::normalize;
pub use plain::to_plain_text;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;

/// A child of an element that the walkers care about
pub(crate) enum Child<'a> {
    Text(&'a str),
    Element(ElementRef<'a>),
}

// Text and element children of `el`; comments, doctypes and processing
// instructions are skipped
pub(crate) fn children<'a>(el: ElementRef<'a>) -> impl Iterator<Item = Child<'a>> {
    el.children().filter_map(|node| match node.value() {
        Node::Text(text) => Some(Child::Text(&**text)),
        Node::Element(_) => ElementRef::wrap(node).map(Child::Element),
        _ => None,
    })
}

// The element whose children hold the page content: <body>, or the root
// element when the document has no body (e.g. a frameset page)
pub(crate) fn content_root(document: &Html) -> ElementRef<'_> {
    static BODY: OnceLock<Selector> = OnceLock::new();
    let selector = BODY.get_or_init(|| Selector::parse("body").expect("static selector"));

    document
        .select(selector)
        .next()
        .unwrap_or_else(|| document.root_element())
}

// Final whitespace cleanup shared by every output:
// - runs of spaces/tabs become one space
// - each line is trimmed
// - 3+ consecutive newlines (2+ blank lines) become one blank line
// - the whole result is trimmed
pub(crate) fn tidy(text: &str) -> String {
    static HORIZONTAL: OnceLock<Regex> = OnceLock::new();
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();
    let horizontal = HORIZONTAL.get_or_init(|| Regex::new(r"[ \t]+").expect("static regex"));
    let blank_runs = BLANK_RUNS.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"));

    let spaced = horizontal.replace_all(text, " ");
    let lines: Vec<&str> = spaced
        .split('\n')
        .map(|line| line.trim_matches(|c| c == ' ' || c == '\r'))
        .collect();
    let joined = lines.join("\n");

    blank_runs.replace_all(&joined, "\n\n").trim().to_string()
}
