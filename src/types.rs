//! Shared types used across pipeline stages.
//!
//! [`SiteContext`] is resolved once per run from `template.json` and
//! `seo.toml`; [`PageMeta`] is resolved once per route and consumed by the
//! head renderer, the report and the sitemap.

use crate::config::BuildConfig;
use crate::content::SiteDocument;
use chrono::NaiveDate;

/// What kind of route a page is. Drives `og:type`, the JSON-LD schema type
/// and sitemap hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Post,
    Page,
}

/// Resolved metadata for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    /// Site-relative route, always starting with `/`.
    pub route: String,
    pub kind: PageKind,
    /// Page title without the site suffix. `None` on the home page.
    pub title: Option<String>,
    pub description: String,
    /// Image references as found (absolute or site-relative), deduplicated.
    pub images: Vec<String>,
    /// Publish date for posts.
    pub published: Option<NaiveDate>,
    pub tags: Vec<String>,
}

/// Site-wide values every page needs, in the build language.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteContext {
    pub language: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    /// Canonical base URL without a trailing slash.
    pub base_url: String,
    /// Image reference used when a page has none.
    pub default_image: String,
    pub author: Option<String>,
    /// `@handle` for `twitter:creator`.
    pub twitter_creator: Option<String>,
    pub twitter_card: String,
}

impl SiteContext {
    /// Resolve site values, taking `seo.toml` defaults for anything the
    /// document leaves out.
    pub fn new(doc: &SiteDocument, config: &BuildConfig) -> Self {
        let language = Some(config.language.trim())
            .filter(|l| !l.is_empty())
            .or_else(|| doc.site.languages.first().map(|l| l.trim()))
            .filter(|l| !l.is_empty())
            .unwrap_or("en")
            .to_string();

        let base_url = doc
            .site
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(config.defaults.site_url.as_str())
            .trim_end_matches('/')
            .to_string();

        let owner = doc.owner.as_ref();

        Self {
            title: doc
                .site
                .title
                .get(&language)
                .unwrap_or(config.defaults.site_title.as_str())
                .to_string(),
            subtitle: doc.site.subtitle.get(&language).map(String::from),
            description: doc
                .site
                .description
                .get(&language)
                .unwrap_or_default()
                .to_string(),
            base_url,
            default_image: config.defaults.image.trim().to_string(),
            author: owner.and_then(|o| o.name.get(&language)).map(String::from),
            twitter_creator: owner.and_then(|o| o.twitter_handle()),
            twitter_card: config.social.twitter_card.clone(),
            language,
        }
    }
}
