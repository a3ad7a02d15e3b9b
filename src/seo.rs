//! Head tag rendering.
//!
//! Turns one route's [`PageMeta`] into the tags crawlers and link previews
//! read: `<title>`, meta description, canonical link, Open Graph, Twitter
//! Card, `article:*` for posts, and a JSON-LD block.
//!
//! Tags are rendered with [maud](https://maud.lambda.xyz/), which escapes
//! every attribute value. The JSON-LD block is serialized with `serde_json`
//! and its `<`, `>` and `&` are written as `\u` escapes, which leaves the
//! JSON value unchanged but keeps it from ending or confusing its `<script>`.

use crate::types::{PageKind, PageMeta, SiteContext};
use maud::{Markup, PreEscaped, html};
use serde_json::{Value, json};

/// Resolve an image or link reference against the site base URL.
///
/// References starting with `http` pass through unchanged; anything else is
/// joined with exactly one `/`.
pub fn absolute_url(base_url: &str, reference: &str) -> String {
    let reference = reference.trim();
    if reference.starts_with("http") {
        return reference.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}

/// Canonical URL of a route. The home route keeps its trailing slash.
pub fn page_url(base_url: &str, route: &str) -> String {
    if route.trim_matches('/').is_empty() {
        format!("{}/", base_url.trim_end_matches('/'))
    } else {
        absolute_url(base_url, route)
    }
}

/// Document title: `"{page} | {site}"`, or `"{site} - {subtitle}"` for pages
/// without their own title.
pub fn compose_title(page_title: Option<&str>, site: &SiteContext) -> String {
    match page_title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) if title != site.title => format!("{title} | {}", site.title),
        _ => match site.subtitle.as_deref() {
            Some(subtitle) => format!("{} - {subtitle}", site.title),
            None => site.title.clone(),
        },
    }
}

/// schema.org description of the page: `BlogPosting` for posts, `WebSite`
/// for everything else.
pub fn structured_data(meta: &PageMeta, site: &SiteContext) -> Value {
    let url = page_url(&site.base_url, &meta.route);
    match meta.kind {
        PageKind::Post => {
            let mut data = json!({
                "@context": "https://schema.org",
                "@type": "BlogPosting",
                "headline": meta.title.as_deref().unwrap_or(site.title.as_str()),
                "description": meta.description,
                "image": absolute_images(meta, site),
                "url": url,
            });
            if !meta.tags.is_empty() {
                data["keywords"] = json!(meta.tags.join(", "));
            }
            if let Some(published) = meta.published {
                data["datePublished"] = json!(published.format("%Y-%m-%d").to_string());
            }
            if let Some(author) = &site.author {
                data["author"] = json!([{
                    "@type": "Person",
                    "name": author,
                    "url": page_url(&site.base_url, "/"),
                }]);
            }
            data
        }
        PageKind::Home | PageKind::Page => json!({
            "@context": "https://schema.org",
            "@type": "WebSite",
            "name": compose_title(meta.title.as_deref(), site),
            "url": url,
            "description": meta.description,
        }),
    }
}

fn absolute_images(meta: &PageMeta, site: &SiteContext) -> Vec<String> {
    meta.images
        .iter()
        .map(|image| absolute_url(&site.base_url, image))
        .collect()
}

/// JSON for an inline `<script>`: no raw `<`, `>` or `&` survive.
fn script_json(value: &Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Every head tag for a route, in emission order.
pub fn head_tags(meta: &PageMeta, site: &SiteContext) -> Vec<Markup> {
    let title = compose_title(meta.title.as_deref(), site);
    let url = page_url(&site.base_url, &meta.route);
    let images = absolute_images(meta, site);
    let og_type = match meta.kind {
        PageKind::Post => "article",
        PageKind::Home | PageKind::Page => "website",
    };

    let mut tags = vec![
        html! { title { (title) } },
        html! { meta name="description" content=(meta.description); },
        html! { link rel="canonical" href=(url); },
        html! { meta property="og:type" content=(og_type); },
        html! { meta property="og:title" content=(title); },
        html! { meta property="og:description" content=(meta.description); },
    ];
    for image in &images {
        tags.push(html! { meta property="og:image" content=(image); });
    }
    tags.push(html! { meta property="og:url" content=(url); });
    tags.push(html! { meta property="og:site_name" content=(site.title); });

    tags.push(html! { meta name="twitter:card" content=(site.twitter_card); });
    tags.push(html! { meta name="twitter:title" content=(title); });
    tags.push(html! { meta name="twitter:description" content=(meta.description); });
    if let Some(image) = images.first() {
        tags.push(html! { meta name="twitter:image" content=(image); });
    }
    if let Some(creator) = &site.twitter_creator {
        tags.push(html! { meta name="twitter:creator" content=(creator); });
    }

    if meta.kind == PageKind::Post {
        if let Some(published) = meta.published {
            let published = published.format("%Y-%m-%d").to_string();
            tags.push(html! { meta property="article:published_time" content=(published); });
        }
        for tag in &meta.tags {
            tags.push(html! { meta property="article:tag" content=(tag); });
        }
    }

    let data = script_json(&structured_data(meta, site));
    tags.push(html! { script type="application/ld+json" { (PreEscaped(data)) } });
    tags
}

/// Head tags as HTML, one per line.
pub fn render_head_tags(meta: &PageMeta, site: &SiteContext) -> Vec<String> {
    head_tags(meta, site)
        .into_iter()
        .map(Markup::into_string)
        .collect()
}
