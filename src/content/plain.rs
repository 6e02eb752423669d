// src/content/plain.rs
// =============================================================================
// Flattens semantic HTML (the output of `normalize`) into plain text.
//
// - headings, paragraphs and other blocks are separated by a blank line
// - list items become "• item" lines, one per line
// - table rows become one line each, cells separated by spaces
// - images contribute their alt text
// - entities (&nbsp; &lt; &gt; &amp; &quot; &apos; ...) are decoded by the
//   HTML parser; non-breaking spaces become plain spaces
// =============================================================================

use scraper::{ElementRef, Html};

use super::{children, content_root, tidy, Child};

const BLOCKS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "dl", "table", "article", "section",
    "main", "blockquote", "pre",
];

/// Converts semantic HTML to readable plain text.
pub fn to_plain_text(semantic: &str) -> String {
    let document = Html::parse_document(semantic);
    let mut out = String::new();
    flatten_children(content_root(&document), &mut out);
    tidy(&out.replace('\u{a0}', " "))
}

fn flatten_children(el: ElementRef<'_>, out: &mut String) {
    for child in children(el) {
        match child {
            Child::Text(text) => out.push_str(text),
            Child::Element(element) => flatten_element(element, out),
        }
    }
}

fn flatten_element(el: ElementRef<'_>, out: &mut String) {
    let element = el.value();
    match element.name() {
        "head" | "script" | "style" => {}
        "br" => out.push('\n'),
        "li" => {
            start_line(out);
            out.push_str("• ");
            flatten_children(el, out);
            out.push('\n');
        }
        "tr" | "dt" | "dd" => {
            start_line(out);
            flatten_children(el, out);
            out.push('\n');
        }
        "td" | "th" => {
            flatten_children(el, out);
            out.push(' ');
        }
        "img" => {
            if let Some(alt) = element.attr("alt").filter(|alt| !alt.trim().is_empty()) {
                out.push_str(alt);
            }
        }
        name if BLOCKS.contains(&name) => {
            out.push_str("\n\n");
            flatten_children(el, out);
            out.push_str("\n\n");
        }
        _ => flatten_children(el, out),
    }
}

fn start_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
