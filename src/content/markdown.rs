// src/content/markdown.rs
// =============================================================================
// Renders semantic HTML as Markdown for the assembled report.
//
//   <h2>x</h2>              -> ## x
//   <p>x</p>                -> x (blank line around)
//   <li>x</li>              -> - x   (1. x inside <ol>)
//   <a href="u">x</a>       -> [x](u)
//   <strong>/<b>            -> **x**
//   <em>/<i>                -> *x*
//   <code>                  -> `x`
//   <pre>                   -> fenced block
//   <blockquote>            -> "> " prefixed lines
//   <table>                 -> pipe table
//   <img alt="a" src="s">   -> ![a](s)
// =============================================================================

use scraper::{ElementRef, Html};

use super::{children, content_root, tidy, Child};

// Stands in for a space that `tidy` must keep (list indentation, code
// blocks). Text nodes never contain it: their non-breaking spaces are
// replaced on the way in.
const HARD_SPACE: char = '\u{a0}';

/// Converts semantic HTML to Markdown.
pub fn semantic_to_markdown(semantic: &str) -> String {
    let document = Html::parse_document(semantic);
    let mut out = String::new();
    render_children(content_root(&document), &mut out, 0);
    tidy(&out).replace(HARD_SPACE, " ")
}

fn render_children(el: ElementRef<'_>, out: &mut String, depth: usize) {
    for child in children(el) {
        match child {
            Child::Text(text) => out.push_str(&text.replace(HARD_SPACE, " ")),
            Child::Element(element) => render_element(element, out, depth),
        }
    }
}

// Renders the children of `el` into a fresh buffer (for wrapping)
fn inline(el: ElementRef<'_>, depth: usize) -> String {
    let mut buf = String::new();
    render_children(el, &mut buf, depth);
    buf.trim().to_string()
}

// Writes the Markdown for one element and everything below it
//
// Parameters:
//   el: the element to render
//   out: buffer the Markdown is appended to
//   depth: list nesting level (0 outside any list)
fn render_element(el: ElementRef<'_>, out: &mut String, depth: usize) {
    let element = el.value();
    let name = element.name();

    match name {
        "head" | "script" | "style" => {}
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = usize::from(name.as_bytes()[1] - b'0');
            let text = inline(el, depth).replace('\n', " ");
            out.push_str("\n\n");
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(&text);
            out.push_str("\n\n");
        }
        "p" | "article" | "section" | "main" | "dl" => {
            out.push_str("\n\n");
            render_children(el, out, depth);
            out.push_str("\n\n");
        }
        "ul" | "ol" => {
            out.push_str(if depth == 0 { "\n\n" } else { "\n" });
            let ordered = name == "ol";
            let mut number = 0;
            for child in children(el) {
                if let Child::Element(item) = child {
                    if item.value().name() == "li" {
                        number += 1;
                        let marker = if ordered {
                            format!("{}.", number)
                        } else {
                            "-".to_string()
                        };
                        render_item(item, &marker, out, depth);
                    }
                }
            }
            out.push_str(if depth == 0 { "\n\n" } else { "\n" });
        }
        "li" => render_item(el, "-", out, depth),
        "dt" => {
            out.push('\n');
            out.push_str(&format!("**{}**", inline(el, depth)));
            out.push('\n');
        }
        "dd" => {
            out.push_str(": ");
            out.push_str(&inline(el, depth));
            out.push('\n');
        }
        "a" => {
            let text = inline(el, depth);
            match element.attr("href").filter(|href| !href.is_empty()) {
                Some(href) if !text.is_empty() => out.push_str(&format!("[{}]({})", text, href)),
                _ => out.push_str(&text),
            }
        }
        "strong" | "b" => wrap(el, "**", out, depth),
        "em" | "i" => wrap(el, "*", out, depth),
        "code" => wrap(el, "`", out, depth),
        "pre" => {
            let code = el
                .text()
                .collect::<String>()
                .replace('\t', "    ")
                .replace(' ', &HARD_SPACE.to_string());
            out.push_str("\n\n```\n");
            out.push_str(code.trim_matches('\n'));
            out.push_str("\n```\n\n");
        }
        "blockquote" => {
            let inner = tidy(&inline(el, depth));
            out.push_str("\n\n");
            for line in inner.lines() {
                if line.is_empty() {
                    out.push_str(">\n");
                } else {
                    out.push_str("> ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        "table" => render_table(el, out, depth),
        "img" => {
            let alt = element.attr("alt").unwrap_or_default();
            if let Some(src) = element.attr("src") {
                out.push_str(&format!("![{}]({})", alt, src));
            }
        }
        "br" => out.push('\n'),
        _ => render_children(el, out, depth),
    }
}

// Writes one list item as `marker text`
//
// Parameters:
//   item: the <li> element
//   marker: "-" for bullets, "N." for ordered lists
//   depth: nesting level of the enclosing list
fn render_item(item: ElementRef<'_>, marker: &str, out: &mut String, depth: usize) {
    if !out.ends_with('\n') {
        out.push('\n');
    }
    // Continuation lines (nested lists included) are indented under the
    // marker; deeper levels pick up one indent per enclosing item
    let body = inline(item, depth + 1);
    let mut lines = body.lines().filter(|line| !line.trim().is_empty());
    if let Some(first) = lines.next() {
        out.push_str(&format!("{} {}\n", marker, first.trim()));
    }
    for line in lines {
        out.push(HARD_SPACE);
        out.push(HARD_SPACE);
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

fn wrap(el: ElementRef<'_>, marker: &str, out: &mut String, depth: usize) {
    let text = inline(el, depth);
    if !text.is_empty() {
        out.push_str(marker);
        out.push_str(&text);
        out.push_str(marker);
    }
}

// Renders a table as a pipe table. The first row becomes the header,
// and short rows are padded with empty cells.
fn render_table(table: ElementRef<'_>, out: &mut String, depth: usize) {
    let rows: Vec<Vec<String>> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|row| row.value().name() == "tr")
        .map(|row| {
            children(row)
                .filter_map(|cell| match cell {
                    Child::Element(cell) if matches!(cell.value().name(), "td" | "th") => {
                        Some(inline(cell, depth).replace('\n', " ").replace('|', "\\|"))
                    }
                    _ => None,
                })
                .collect()
        })
        .collect();

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return;
    }

    out.push_str("\n\n");
    for (i, row) in rows.iter().enumerate() {
        let mut cells = row.clone();
        cells.resize(columns, String::new());
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
        if i == 0 {
            out.push_str(&format!("|{}\n", " --- |".repeat(columns)));
        }
    }
    out.push('\n');
}
