//! Page metadata resolution.
//!
//! Each route's title, description and images can come from two independent
//! sources:
//!
//! - **Explicit values** written into `template.json`: a post's localized
//!   `title`, `excerpt` and `banner`, an external page's localized `name`.
//! - **Extracted values** pulled from the markdown body by [`crate::extract`].
//!
//! ## Resolution priority
//!
//! Each field is resolved independently. The first non-empty value wins:
//!
//! - **Post title**: explicit title → first heading in the body → post id
//! - **Post description**: explicit excerpt → body text → site description
//! - **Post images**: banner, then every body image → site default image
//! - **Page title**: first heading in the markdown → configured name → slug
//! - **Page description**: markdown text → site description
//! - **Page images**: markdown images → site default image
//!
//! Posts favour explicit values because the post editor asks for them on
//! purpose. External pages only have a nav label, so their markdown wins.

use crate::config::DescriptionConfig;
use crate::content::{BlogPost, ExternalLink};
use crate::extract::{self, Fallbacks};
use crate::routes;
use crate::types::{PageKind, PageMeta, SiteContext};
use chrono::NaiveDate;

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
///
/// ```text
/// title:       resolve(&[explicit_title, extracted_title, post_id])
/// description: resolve(&[excerpt,        body_text,       site_description])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Order-preserving dedup of image references, falling back to the site
/// default when nothing is left.
fn collect_images<'a>(refs: impl IntoIterator<Item = &'a str>, site: &SiteContext) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();
    for image in refs.into_iter().map(str::trim).filter(|i| !i.is_empty()) {
        if !images.iter().any(|seen| seen == image) {
            images.push(image.to_string());
        }
    }
    if images.is_empty() && !site.default_image.is_empty() {
        images.push(site.default_image.clone());
    }
    images
}

/// Metadata of a blog post. `body` is the decoded markdown.
pub fn post_meta(
    post: &BlogPost,
    body: &str,
    site: &SiteContext,
    budget: &DescriptionConfig,
    today: NaiveDate,
) -> PageMeta {
    let lang = site.language.as_str();
    let extracted = extract::extract(
        Some(body),
        Fallbacks {
            description: Some(&site.description),
            ..Fallbacks::default()
        },
        budget,
    );
    let excerpt = post
        .excerpt
        .get(lang)
        .map(|e| extract::truncate(&extract::clean_text(e), budget.max_chars));

    let title = resolve(&[
        post.title.get(lang),
        extracted.title.as_deref(),
        Some(post.id.as_str()),
    ]);
    let description =
        resolve(&[excerpt.as_deref(), Some(extracted.description.as_str())]).unwrap_or_default();
    let images = collect_images(
        post.banner_image()
            .into_iter()
            .chain(extracted.images.iter().map(String::as_str)),
        site,
    );

    PageMeta {
        route: routes::post_route(&post.id),
        kind: PageKind::Post,
        title,
        description,
        images,
        published: Some(post.published(today)),
        tags: post
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
    }
}

/// Metadata of a markdown-backed external page. `markdown` is `None` when
/// the page's file is missing.
pub fn page_meta(
    route: &str,
    slug: &str,
    link: &ExternalLink,
    markdown: Option<&str>,
    site: &SiteContext,
    budget: &DescriptionConfig,
) -> PageMeta {
    let name = resolve(&[link.name.get(&site.language), Some(slug)]);
    let extracted = extract::extract(
        markdown,
        Fallbacks {
            title: name.as_deref(),
            description: Some(&site.description),
            image: Some(&site.default_image),
        },
        budget,
    );

    PageMeta {
        route: route.to_string(),
        kind: PageKind::Page,
        title: extracted.title.or(name),
        description: extracted.description,
        images: collect_images(extracted.images.iter().map(String::as_str), site),
        published: None,
        tags: Vec::new(),
    }
}

/// Metadata of the home page: site values only.
pub fn home_meta(site: &SiteContext, budget: &DescriptionConfig) -> PageMeta {
    PageMeta {
        route: "/".to_string(),
        kind: PageKind::Home,
        title: None,
        description: extract::truncate(&extract::clean_text(&site.description), budget.max_chars),
        images: collect_images(std::iter::empty::<&str>(), site),
        published: None,
        tags: Vec::new(),
    }
}
