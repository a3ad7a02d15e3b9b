//! Base document handling.
//!
//! Every prerendered page is a copy of the built SPA entry document with its
//! head rewritten. Two operations cover that:
//!
//! - [`strip_seo_tags`] removes whatever SEO markup the document already
//!   carries: tags shipped in the SPA template and blocks injected by an
//!   earlier run of this tool.
//! - [`inject_head`] inserts a freshly rendered block, wrapped in marker
//!   comments so the next run can find and remove it exactly.
//!
//! Only the head section is touched; the SPA body is copied verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

pub const BEGIN_MARKER: &str = "<!-- folio-prerender:begin -->";
pub const END_MARKER: &str = "<!-- folio-prerender:end -->";

static INJECTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!-- folio-prerender:begin -->.*?<!-- folio-prerender:end -->\n?")
        .expect("valid injected block regex")
});
static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>.*?</title\s*>").expect("valid title regex"));
static SEO_META: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<meta\b[^>]*?\b(?:name|property)\s*=\s*["'](?:description|og:[^"']*|twitter:[^"']*|article:[^"']*)["'][^>]*>"#,
    )
    .expect("valid meta regex")
});
static CANONICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<link\b[^>]*?\brel\s*=\s*["']canonical["'][^>]*>"#)
        .expect("valid canonical regex")
});
static LD_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*?\btype\s*=\s*["']application/ld\+json["'][^>]*>.*?</script\s*>"#)
        .expect("valid ld+json regex")
});
static SOCIAL_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<!--\s*Social Meta Tags\s*-->").expect("valid social comment regex")
});
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").expect("valid blank line regex"));
static HEAD_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<head\b[^>]*>").expect("valid head regex"));

/// Byte offset of the first case-insensitive `</head>`.
fn head_close(html: &str) -> Option<usize> {
    html.to_ascii_lowercase().find("</head>")
}

/// Remove existing SEO markup from the head and collapse the blank lines it
/// leaves behind. Documents without `</head>` are stripped as a whole.
pub fn strip_seo_tags(html: &str) -> String {
    let (head, rest) = match head_close(html) {
        Some(at) => html.split_at(at),
        None => (html, ""),
    };
    let head = INJECTED.replace_all(head, "");
    let head = TITLE.replace_all(&head, "");
    let head = SEO_META.replace_all(&head, "");
    let head = CANONICAL.replace_all(&head, "");
    let head = LD_JSON.replace_all(&head, "");
    let head = SOCIAL_COMMENT.replace_all(&head, "");
    let head = collapse_blank_lines(&head);
    format!("{head}{rest}")
}

fn collapse_blank_lines(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = BLANK_LINES.replace_all(&current, "\n");
        if next == current {
            return current;
        }
        current = next.into_owned();
    }
}

/// Marker-wrapped block of head tags, each on its own indented line.
pub fn head_block(tags: &[String]) -> String {
    let mut block = String::from(BEGIN_MARKER);
    for tag in tags {
        block.push_str("\n    ");
        block.push_str(tag);
    }
    block.push('\n');
    block.push_str(END_MARKER);
    block
}

/// Insert `block` right before `</head>`. Without a closing tag the block
/// goes after the opening `<head>`; without any head it is prepended.
pub fn inject_head(html: &str, block: &str) -> String {
    if let Some(at) = head_close(html) {
        let (before, after) = html.split_at(at);
        return format!("{before}{block}\n{after}");
    }
    if let Some(open) = HEAD_OPEN.find(html) {
        let (before, after) = html.split_at(open.end());
        return format!("{before}\n{block}\n{after}");
    }
    log::warn!("base document has no <head>, prepending SEO tags");
    format!("{block}\n{html}")
}

/// Strip and inject in one step.
pub fn render_page(base: &str, tags: &[String]) -> String {
    inject_head(&strip_seo_tags(base), &head_block(tags))
}
