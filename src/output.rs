//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every page is shown
//! by its title and positional index, with its output file after an arrow
//! and its source as an indented context line. The report reads as a
//! content inventory while still letting users trace each page back to the
//! post or markdown file it came from.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//!
//! Posts
//!     001 Hello → post/42/index.html
//!     002 Heap notes → post/43/index.html
//!
//! Pages
//!     001 Curriculum Vitae → page/resume/index.html
//!
//! Sitemap → sitemap.xml (5 urls)
//! Manifest → manifest.json
//! Generated 2 posts, 1 page
//! ```
//!
//! ## Check
//!
//! ```text
//! Home
//!     Title: Folio - Notes
//!
//! Posts
//!     001 Hello
//!         Route: /post/42
//!         Source: post 42
//!         Description: World
//!
//! Pages
//!     001 Resume
//!         Route: /page/resume
//!         Source: resume.md (missing)
//!
//! Sitemap (5 urls)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::extract;
use crate::generate::{self, GenerateReport, PageSource, Plan, PlannedPage};
use crate::seo;
use crate::types::PageKind;
use std::path::Path;

/// Descriptions longer than this are cut in the check report.
const DESCRIPTION_PREVIEW: usize = 60;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn page_title(page: &PlannedPage, plan: &Plan) -> String {
    match page.meta.title.as_deref() {
        Some(title) => title.to_string(),
        None => seo::compose_title(None, &plan.site),
    }
}

fn source_line(source: &PageSource) -> Option<String> {
    match source {
        PageSource::Site => None,
        PageSource::Post { id, decoded: false } => Some(format!("post {id}")),
        PageSource::Post { id, decoded: true } => Some(format!("post {id} (base64)")),
        PageSource::Markdown { file, found: true } => Some(file.clone()),
        PageSource::Markdown { file, found: false } => Some(format!("{file} (missing)")),
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_generate_output(report: &GenerateReport, dist: &Path) -> Vec<String> {
    let plan = &report.plan;
    let mut lines = Vec::new();

    for page in plan.pages_of(PageKind::Home) {
        lines.push(format!(
            "Home \u{2192} {}",
            generate::relative(&page.output, dist)
        ));
    }

    for (heading, kind) in [("Posts", PageKind::Post), ("Pages", PageKind::Page)] {
        let pages: Vec<_> = plan.pages_of(kind).collect();
        if pages.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(heading.to_string());
        for (i, page) in pages.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(i + 1),
                page_title(page, plan),
                generate::relative(&page.output, dist)
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Sitemap \u{2192} sitemap.xml ({})",
        plural(plan.sitemap.len(), "url")
    ));
    if report.manifest_synced {
        lines.push("Manifest \u{2192} manifest.json".to_string());
    }
    if !plan.collisions.is_empty() {
        lines.push(format!(
            "Warning: {}, see log",
            plural(plan.collisions.len(), "route collision")
        ));
    }
    lines.push(format!(
        "Generated {}, {}",
        plural(plan.pages_of(PageKind::Post).count(), "post"),
        plural(plan.pages_of(PageKind::Page).count(), "page")
    ));
    lines
}

/// Print build output to stdout.
pub fn print_generate_output(report: &GenerateReport, dist: &Path) {
    for line in format_generate_output(report, dist) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(plan: &Plan, dist: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if plan.pages_of(PageKind::Home).next().is_some() {
        lines.push("Home".to_string());
        lines.push(format!(
            "{}Title: {}",
            indent(1),
            seo::compose_title(None, &plan.site)
        ));
    }

    for (heading, kind) in [("Posts", PageKind::Post), ("Pages", PageKind::Page)] {
        let pages: Vec<_> = plan.pages_of(kind).collect();
        if pages.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(heading.to_string());
        for (i, page) in pages.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(1),
                format_index(i + 1),
                page_title(page, plan)
            ));
            lines.push(format!("{}Route: {}", indent(2), page.meta.route));
            if let Some(source) = source_line(&page.source) {
                lines.push(format!("{}Source: {}", indent(2), source));
            }
            if !page.meta.description.is_empty() {
                lines.push(format!(
                    "{}Description: {}",
                    indent(2),
                    extract::truncate(&page.meta.description, DESCRIPTION_PREVIEW)
                ));
            }
        }
    }

    if !plan.collisions.is_empty() {
        lines.push(String::new());
        lines.push("Collisions".to_string());
        for collision in &plan.collisions {
            lines.push(format!(
                "{}{} and {} \u{2192} {}",
                indent(1),
                collision.first,
                collision.second,
                generate::relative(&collision.path, dist)
            ));
        }
    }

    if !plan.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for route in &plan.skipped {
            lines.push(format!("{}{}", indent(1), route));
        }
    }

    lines.push(String::new());
    lines.push(format!("Sitemap ({})", plural(plan.sitemap.len(), "url")));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(plan: &Plan, dist: &Path) {
    for line in format_check_output(plan, dist) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
