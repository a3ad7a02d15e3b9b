//! `sitemap.xml` and `robots.txt`.
//!
//! The sitemap lists the home page, every site-relative external route and
//! every post, in that order. Posts carry their publish date as `lastmod`;
//! everything else is stamped with the build date.
//!
//! External routes arrive already normalized by the planner, so each
//! prerendered page is listed under the same URL as its canonical link.

use crate::config::SitemapConfig;
use crate::seo::page_url;
use crate::types::{PageKind, PageMeta, SiteContext};
use chrono::NaiveDate;

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: Option<&'static str>,
    pub priority: f32,
}

/// Sitemap entries for a run. `external` holds the site-relative external
/// routes to list; only the posts of `pages` are used.
pub fn sitemap_entries(
    external: &[String],
    pages: &[PageMeta],
    site: &SiteContext,
    config: &SitemapConfig,
    today: NaiveDate,
) -> Vec<SitemapEntry> {
    let mut entries = vec![SitemapEntry {
        loc: page_url(&site.base_url, "/"),
        lastmod: today,
        changefreq: Some("daily"),
        priority: config.home_priority,
    }];

    for route in external {
        entries.push(SitemapEntry {
            loc: page_url(&site.base_url, route),
            lastmod: today,
            changefreq: Some("monthly"),
            priority: config.page_priority,
        });
    }

    for post in pages.iter().filter(|p| p.kind == PageKind::Post) {
        entries.push(SitemapEntry {
            loc: page_url(&site.base_url, &post.route),
            lastmod: post.published.unwrap_or(today),
            changefreq: None,
            priority: config.post_priority,
        });
    }

    let mut seen = std::collections::BTreeSet::new();
    entries.retain(|entry| {
        let first = seen.insert(entry.loc.clone());
        if !first {
            log::debug!("sitemap: dropping duplicate {}", entry.loc);
        }
        first
    });
    entries
}

pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!("<urlset xmlns=\"{SITEMAP_NS}\">\n"));
    for entry in entries {
        out.push_str("  <url>\n");
        out.push_str(&format!(
            "    <loc>{}</loc>\n",
            html_escape::encode_text(&entry.loc)
        ));
        out.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            entry.lastmod.format("%Y-%m-%d")
        ));
        if let Some(changefreq) = entry.changefreq {
            out.push_str(&format!("    <changefreq>{changefreq}</changefreq>\n"));
        }
        out.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        out.push_str("  </url>\n");
    }
    out.push_str("</urlset>\n");
    out
}

pub fn render_robots(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/{SITEMAP_FILE}\n",
        base_url.trim_end_matches('/')
    )
}
