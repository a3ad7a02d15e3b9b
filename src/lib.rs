//! # Folio Prerender
//!
//! Build-time SEO prerendering for a client-rendered portfolio and blog.
//! The SPA renders everything in the browser, so crawlers and link preview
//! bots that do not run JavaScript see one generic `index.html` for every
//! URL. This crate writes a copy of that document per route with the right
//! title, description, images and structured data already in its head.
//!
//! # Architecture: Single-Pass Pipeline
//!
//! ```text
//! 1. Load      template.json + seo.toml  →  SiteDocument, BuildConfig
//! 2. Resolve   each route                →  PageMeta        (Plan)
//! 3. Render    base index.html + tags    →  dist/{route}/index.html
//! 4. Emit      plan                      →  sitemap.xml, robots.txt, manifest.json
//! ```
//!
//! Steps 1 and 2 touch no output files, which is what `check` runs. The
//! whole pipeline is re-run on every site build; nothing is cached between
//! runs, and re-running over the same inputs rewrites identical pages.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `seo.toml` loading over stock defaults, validation |
//! | [`content`] | `template.json` model, page markdown loading, date parsing |
//! | [`decode`] | Base64 post body detection and decoding |
//! | [`extract`] | Title, description and image extraction from markdown/HTML |
//! | [`metadata`] | Per-route metadata resolution: explicit values → extracted → fallbacks |
//! | [`routes`] | Route → output path mapping, path safety, collision tracking |
//! | [`seo`] | Head tag rendering with Maud: Open Graph, Twitter Card, JSON-LD |
//! | [`document`] | Stripping old SEO tags from the base document and injecting new ones |
//! | [`sitemap`] | `sitemap.xml` and `robots.txt` |
//! | [`generate`] | The driver: plan, write pages, sync the web manifest |
//! | [`types`] | Shared types: `PageMeta`, `SiteContext` |
//! | [`output`] | CLI output formatting: route inventory for `build` and `check` |
//!
//! # Design Decisions
//!
//! ## One Policy, Uniformly Applied
//!
//! Posts may carry an explicit `encoding` flag saying whether their body is
//! base64. The flag always wins; the length-and-alphabet heuristic only runs
//! for posts without it.
//!
//! ## Regex Extraction, Not a Markdown Parser
//!
//! Metadata needs only the first heading, a few lines of prose and image
//! references. Pattern matching over raw markdown and inline HTML finds
//! those without rendering the body, and malformed markup simply fails to
//! match and falls through to the next source.
//!
//! ## Marker-Wrapped Injection
//!
//! The home page overwrites the SPA entry document that every page is built
//! from. Injected tags sit between begin/end marker comments, so the next
//! run strips exactly what the previous one added.

pub mod config;
pub mod content;
pub mod decode;
pub mod document;
pub mod extract;
pub mod generate;
pub mod metadata;
pub mod output;
pub mod routes;
pub mod seo;
pub mod sitemap;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
