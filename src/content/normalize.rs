// src/content/normalize.rs
// =============================================================================
// Reduces a raw HTML page to its semantic content.
//
// Pipeline (each stage narrows what is left):
// 1. Parse the document; <!DOCTYPE>, <head> and everything in it are dropped
// 2. Work on <body> (the whole document if there is no body)
// 3. Remove non-content elements WITH their content: script, style, iframe,
//    svg, form controls, comments
// 4. Strip presentation attributes: class, id, style, role, data-*, aria-*,
//    on* event handlers
// 5. Remove page chrome: nav/header/footer/aside/menu elements and anything
//    whose class or id mentions sidebar, navigation, menu or navbar
// 6. Unwrap every tag not on the semantic allow-list, keeping its text
// 7. Tidy whitespace
//
// The output is itself valid input: normalize(normalize(x)) == normalize(x).
// That's why text is re-escaped on the way out and every element gets an
// explicit end tag - re-parsing must rebuild the exact same tree.
// =============================================================================

use scraper::{ElementRef, Html};
use std::fmt::Write as _;

use super::{children, content_root, tidy, Child};

// Removed together with everything inside them
const REMOVED: &[&str] = &[
    "head", "title", "script", "noscript", "template", "style", "iframe", "svg", "object",
    "embed", "applet", "form", "input", "button", "select", "option", "optgroup", "textarea",
    "label", "fieldset", "legend", "caption", "colgroup", "col",
];

// Structural chrome, matched by tag name
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside", "menu"];

// Structural chrome, matched as a substring of class or id
const CHROME_MARKERS: &[&str] = &["sidebar", "navigation", "menu", "navbar"];

// Tags that survive normalization
const ALLOWED: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "li", "table", "tr", "td", "th",
    "thead", "tbody", "tfoot", "article", "section", "main", "blockquote", "pre", "code",
    "strong", "em", "b", "i", "a", "img", "time", "mark", "dl", "dt", "dd",
];

// Unwrapped block containers leave a line break behind so their text
// doesn't run into the next block
const LINE_BREAKING: &[&str] = &[
    "div", "figure", "figcaption", "address", "details", "summary", "hr", "hgroup", "center",
];

/// Strips an HTML document down to semantic, human-readable structure.
pub fn normalize(raw_html: &str) -> String {
    let document = Html::parse_document(raw_html);
    let mut out = String::new();
    write_children(content_root(&document), &mut out);
    tidy(&out)
}

fn write_children(el: ElementRef<'_>, out: &mut String) {
    for child in children(el) {
        match child {
            Child::Text(text) => escape_text(text, out),
            Child::Element(element) => write_element(element, out),
        }
    }
}

fn write_element(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();

    if REMOVED.contains(&name) || is_chrome(el) {
        return;
    }

    if name == "br" {
        out.push('\n');
        return;
    }

    if !ALLOWED.contains(&name) {
        write_children(el, out);
        if LINE_BREAKING.contains(&name) {
            out.push('\n');
        }
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr, value) in el.value().attrs() {
        if keep_attribute(attr) {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            escape_attribute(value, out);
            out.push('"');
        }
    }
    out.push('>');

    // img is a void element
    if name == "img" {
        return;
    }

    // The parser swallows exactly one newline right after <pre>, so one is
    // always written there. Whatever `tidy` leaves of the content then
    // reparses unchanged.
    if name == "pre" {
        out.push('\n');
    }

    write_children(el, out);
    let _ = write!(out, "</{}>", name);
}

fn is_chrome(el: ElementRef<'_>) -> bool {
    let element = el.value();
    if CHROME_TAGS.contains(&element.name()) {
        return true;
    }

    let class = element.attr("class").unwrap_or_default().to_lowercase();
    let id = element.attr("id").unwrap_or_default().to_lowercase();
    CHROME_MARKERS
        .iter()
        .any(|marker| class.contains(marker) || id.contains(marker))
}

fn keep_attribute(name: &str) -> bool {
    !(matches!(name, "class" | "id" | "style" | "role")
        || name.starts_with("data-")
        || name.starts_with("aria-")
        || name.starts_with("on"))
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why walk the DOM instead of using regexes?
//    - HTML nests, and regexes don't understand nesting
//    - The parser (html5ever, through scraper) fixes broken markup the same
//      way a browser would, so we only ever see a proper tree
//
// 2. What is ElementRef<'_>?
//    - A borrowed handle to one element of the parsed document
//    - The '_ lifetime ties it to the Html value it came from
//
// 3. Why write into a &mut String?
//    - Every recursive call appends to the same buffer
//    - No temporary strings per element
//
// 4. What does `let _ = write!(...)` mean?
//    - write! on a String can't fail, but it still returns a Result
//    - Binding it to _ says "ignore it" without a warning
// -----------------------------------------------------------------------------
