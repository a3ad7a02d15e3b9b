//! Site document loading.
//!
//! The SPA and this prerenderer share one JSON document, `template.json`,
//! which holds site metadata, the blog post list and the external page list.
//! Only the parts the prerenderer needs are modelled; every other key
//! (`achievements`, `about`, comment settings, ...) is ignored.
//!
//! ```json
//! {
//!   "site": {
//!     "title": { "en": "shulkwisec", "zh": "..." },
//!     "subtitle": { "en": "Security notes" },
//!     "description": { "en": "Research and writeups" },
//!     "url": "https://example.com",
//!     "languages": ["en", "zh"],
//!     "external": [{ "url": "/page/resume", "name": { "en": "Resume" } }]
//!   },
//!   "blog": { "posts": [{ "id": "42", "date": "2024-03-01", ... }] },
//!   "owner": { "name": { "en": "Shulk" }, "social": { "twitter": "..." } }
//! }
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("site document not found: {0}")]
    MissingTemplate(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid site document {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A per-language string map such as `{ "en": "Hello", "zh": "你好" }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Localized(pub BTreeMap<String, String>);

impl Localized {
    /// Value for `lang`, falling back to `en`, then to any non-empty value.
    pub fn get(&self, lang: &str) -> Option<&str> {
        let non_empty = |key: &str| {
            self.0
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        non_empty(lang)
            .or_else(|| non_empty("en"))
            .or_else(|| self.0.values().map(|v| v.trim()).find(|v| !v.is_empty()))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Localized {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Localized(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// The parts of `template.json` the prerenderer reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteDocument {
    pub site: Site,
    #[serde(default)]
    pub blog: Blog,
    #[serde(default)]
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Site {
    #[serde(default)]
    pub title: Localized,
    #[serde(default)]
    pub subtitle: Localized,
    #[serde(default)]
    pub description: Localized,
    /// Canonical base URL, e.g. `https://example.com`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub external: Vec<ExternalLink>,
}

/// Entry of `site.external`: a nav link, prerendered when its route starts
/// with the configured page prefix.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalLink {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub name: Localized,
}

impl ExternalLink {
    /// The route when this link points inside the site (`/...`).
    pub fn site_route(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| u.starts_with('/') && !u.starts_with("//"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Blog {
    #[serde(default)]
    pub posts: Vec<BlogPost>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPost {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub title: Localized,
    #[serde(default)]
    pub excerpt: Localized,
    /// Markdown body, base64-encoded when `encoding` is true.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub banner: Option<Banner>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub encoding: Option<bool>,
    #[serde(default)]
    pub pin: bool,
}

impl BlogPost {
    /// Publish date, or `today` when missing or unparseable.
    pub fn published(&self, today: NaiveDate) -> NaiveDate {
        self.date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or_else(|| {
                log::debug!(
                    "post {}: date {:?} not parseable, using {}",
                    self.id,
                    self.date,
                    today
                );
                today
            })
    }

    /// Banner image URL, if the banner is a still image.
    pub fn banner_image(&self) -> Option<&str> {
        self.banner.as_ref().and_then(Banner::image_url)
    }
}

/// Post ids are strings in current documents; older ones used numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// A post banner: either a bare URL or a media descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Banner {
    Url(String),
    Media {
        url: String,
        #[serde(default, rename = "type")]
        kind: Option<String>,
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        thumbnail: Option<String>,
    },
}

impl Banner {
    /// Image usable as a social card: the URL for images and gifs, the
    /// thumbnail for videos, embeds and documents.
    pub fn image_url(&self) -> Option<&str> {
        let url = match self {
            Banner::Url(url) => Some(url.as_str()),
            Banner::Media {
                url,
                kind,
                thumbnail,
                ..
            } => match kind.as_deref() {
                None | Some("image") | Some("gif") => Some(url.as_str()),
                _ => thumbnail.as_deref(),
            },
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: Localized,
    #[serde(default)]
    pub social: Option<Social>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Social {
    #[serde(default)]
    pub twitter: Option<String>,
}

impl Owner {
    /// Twitter handle as `@name`, from either a handle or a profile URL.
    pub fn twitter_handle(&self) -> Option<String> {
        let raw = self.social.as_ref()?.twitter.as_deref()?.trim();
        let handle = raw
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(raw)
            .trim_start_matches('@');
        (!handle.is_empty()).then(|| format!("@{handle}"))
    }
}

/// Read and parse the site document. A missing file is reported as
/// [`ContentError::MissingTemplate`].
pub fn load_site_document(path: &Path) -> Result<SiteDocument, ContentError> {
    if !path.is_file() {
        return Err(ContentError::MissingTemplate(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ContentError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read `{slug}.md` from the data directory.
///
/// Returns `None` when the file is missing or unreadable; the page is still
/// generated from its configured fallbacks.
pub fn read_page_markdown(data_dir: &Path, slug: &str) -> Option<String> {
    let path = data_dir.join(format!("{slug}.md"));
    match fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(err) => {
            log::warn!(
                "markdown for page '{slug}' unavailable ({}): {err}",
                path.display()
            );
            None
        }
    }
}

/// Best-effort date parsing for post dates.
///
/// Accepts RFC 3339 timestamps, ISO dates with or without a time part,
/// slash-separated dates and long-form English dates.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    None
}
