//! Prerendered page generation.
//!
//! The driver of the pipeline. Loads the build configuration and the site
//! document, resolves every route into a [`Plan`], then writes one HTML file
//! per route plus the sitemap, robots file and synced web manifest.
//!
//! ## Output Structure
//!
//! ```text
//! dist/public/
//! ├── index.html              # Home (the SPA entry, head rewritten)
//! ├── post/
//! │   └── 42/index.html       # One per blog post
//! ├── page/
//! │   └── resume/index.html   # One per markdown-backed external page
//! ├── sitemap.xml
//! ├── robots.txt
//! └── manifest.json           # name/short_name/description synced
//! ```
//!
//! ## Base document
//!
//! Every page is rendered from the built SPA entry `dist/index.html`, read
//! once before anything is written. Since the home page overwrites that same
//! file, a second run reads the previous run's home page; stripping removes
//! the block injected then, so repeated runs produce identical files.
//!
//! ## Failure model
//!
//! A missing or invalid `template.json`, `seo.toml` or base document aborts
//! the run, as does any failed write. A missing page markdown file only
//! degrades that page to its fallbacks. Manifest problems are logged and
//! skipped.

use crate::config::{self, BuildConfig, ConfigError};
use crate::content::{self, ContentError, SiteDocument};
use crate::decode;
use crate::document;
use crate::metadata;
use crate::routes::{self, Collision, RouteTable};
use crate::seo;
use crate::sitemap::{self, SitemapEntry};
use crate::types::{PageKind, PageMeta, SiteContext};
use chrono::NaiveDate;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BASE_DOCUMENT: &str = "index.html";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("base document not found: {0} (build the SPA first)")]
    MissingBaseDocument(PathBuf),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0} is not a JSON object")]
    NotAnObject(PathBuf),
}

/// Input and output directories of a run.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    /// Directory holding `template.json`, page markdown and `seo.toml`.
    pub data_dir: PathBuf,
    /// Built SPA directory; prerendered files are written here.
    pub dist_dir: PathBuf,
}

impl BuildPaths {
    pub fn base_document(&self) -> PathBuf {
        self.dist_dir.join(BASE_DOCUMENT)
    }
}

/// Where a page's content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// Site values only.
    Site,
    /// A post body; `decoded` when it was stored base64-encoded.
    Post { id: String, decoded: bool },
    /// An external page's markdown file; `found` is false when missing.
    Markdown { file: String, found: bool },
}

#[derive(Debug, Clone)]
pub struct PlannedPage {
    pub meta: PageMeta,
    pub output: PathBuf,
    pub source: PageSource,
}

/// Everything a run will write, resolved without touching the output
/// directory.
#[derive(Debug)]
pub struct Plan {
    pub site: SiteContext,
    /// Home first, then posts in document order, then external pages.
    pub pages: Vec<PlannedPage>,
    pub sitemap: Vec<SitemapEntry>,
    pub collisions: Vec<Collision>,
    /// Routes that could not be turned into an output path.
    pub skipped: Vec<String>,
}

impl Plan {
    pub fn pages_of(&self, kind: PageKind) -> impl Iterator<Item = &PlannedPage> {
        self.pages.iter().filter(move |p| p.meta.kind == kind)
    }
}

#[derive(Debug)]
pub struct GenerateReport {
    pub plan: Plan,
    pub manifest_synced: bool,
}

/// Load the build configuration and the site document of `paths`.
pub fn load_inputs(paths: &BuildPaths) -> Result<(BuildConfig, SiteDocument), GenerateError> {
    let config = config::load_config(&paths.data_dir)?;
    let doc = content::load_site_document(&paths.data_dir.join(&config.template_file))?;
    Ok((config, doc))
}

/// Resolve every route of a run. Reads page markdown but writes nothing.
pub fn plan(paths: &BuildPaths, today: NaiveDate) -> Result<Plan, GenerateError> {
    let (config, doc) = load_inputs(paths)?;
    Ok(plan_site(&doc, &config, paths, today))
}

/// Pages resolved so far, with the output files they claimed.
#[derive(Default)]
struct PlanBuilder {
    table: RouteTable,
    pages: Vec<PlannedPage>,
    collisions: Vec<Collision>,
    skipped: Vec<String>,
}

impl PlanBuilder {
    /// Queue a page. Returns `false` when its route was skipped as unsafe.
    fn add(&mut self, dist: &Path, meta: PageMeta, source: PageSource) -> bool {
        let Some(output) = routes::output_file(dist, &meta.route) else {
            log::warn!("skipping unsafe route {:?}", meta.route);
            self.skipped.push(meta.route);
            return false;
        };
        if let Some(collision) = self.table.claim(&meta.route, &output) {
            log::warn!(
                "routes {} and {} both write {}; keeping {}",
                collision.first,
                collision.second,
                collision.path.display(),
                collision.second
            );
            self.pages.retain(|p| p.output != output);
            self.collisions.push(collision);
        }
        self.pages.push(PlannedPage {
            meta,
            output,
            source,
        });
        true
    }
}

/// Resolve every route of an already loaded site.
pub fn plan_site(
    doc: &SiteDocument,
    config: &BuildConfig,
    paths: &BuildPaths,
    today: NaiveDate,
) -> Plan {
    let site = SiteContext::new(doc, config);
    let budget = &config.description;
    let dist = paths.dist_dir.as_path();
    let mut builder = PlanBuilder::default();

    builder.add(dist, metadata::home_meta(&site, budget), PageSource::Site);

    for post in &doc.blog.posts {
        let id = post.id.trim();
        if id.is_empty() {
            log::warn!("skipping post without an id");
            continue;
        }
        let body = decode::decode_post_body(id, &post.content, post.encoding);
        let decoded = matches!(body, Cow::Owned(_));
        let meta = metadata::post_meta(post, &body, &site, budget, today);
        builder.add(
            dist,
            meta,
            PageSource::Post {
                id: id.to_string(),
                decoded,
            },
        );
    }

    // Site-relative external routes for the sitemap, trimmed the same way
    // as page routes. Prefix routes are listed only once they have a page.
    let mut external_routes = Vec::new();
    for link in &doc.site.external {
        let Some(route) = link.site_route() else {
            continue;
        };
        if !route.starts_with(&config.page_prefix) {
            log::debug!("external route {route} is not under {}", config.page_prefix);
            let route = route.trim_end_matches('/');
            if routes::is_safe_route(route) {
                external_routes.push(route.to_string());
            }
            continue;
        }
        let route = route.trim_end_matches('/');
        let Some(slug) = routes::page_slug(route, &config.page_prefix) else {
            log::warn!("skipping external route {route:?}: no usable page name");
            builder.skipped.push(route.to_string());
            continue;
        };
        let markdown = content::read_page_markdown(&paths.data_dir, slug);
        let meta = metadata::page_meta(route, slug, link, markdown.as_deref(), &site, budget);
        let source = PageSource::Markdown {
            file: format!("{slug}.md"),
            found: markdown.is_some(),
        };
        if builder.add(dist, meta, source) {
            external_routes.push(route.to_string());
        }
    }

    let metas: Vec<PageMeta> = builder.pages.iter().map(|p| p.meta.clone()).collect();
    let sitemap =
        sitemap::sitemap_entries(&external_routes, &metas, &site, &config.sitemap, today);

    Plan {
        site,
        pages: builder.pages,
        sitemap,
        collisions: builder.collisions,
        skipped: builder.skipped,
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), GenerateError> {
    let io_err = |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}

/// Run the whole pipeline.
pub fn generate(paths: &BuildPaths, today: NaiveDate) -> Result<GenerateReport, GenerateError> {
    let plan = plan(paths, today)?;

    let base_path = paths.base_document();
    if !base_path.is_file() {
        return Err(GenerateError::MissingBaseDocument(base_path));
    }
    let base = fs::read_to_string(&base_path).map_err(|source| GenerateError::Io {
        path: base_path.clone(),
        source,
    })?;

    for page in &plan.pages {
        let tags = seo::render_head_tags(&page.meta, &plan.site);
        write_file(&page.output, &document::render_page(&base, &tags))?;
        log::info!("{} → {}", page.meta.route, relative(&page.output, &paths.dist_dir));
    }

    let manifest_synced = sync_manifest(&paths.dist_dir.join(MANIFEST_FILE), &plan.site);

    write_file(
        &paths.dist_dir.join(sitemap::SITEMAP_FILE),
        &sitemap::render_sitemap(&plan.sitemap),
    )?;
    log::info!("sitemap: {} urls", plan.sitemap.len());
    write_file(
        &paths.dist_dir.join(sitemap::ROBOTS_FILE),
        &sitemap::render_robots(&plan.site.base_url),
    )?;

    Ok(GenerateReport {
        plan,
        manifest_synced,
    })
}

/// Copy site name and description into the web manifest. Returns whether
/// the manifest was written; problems are logged, never fatal.
pub fn sync_manifest(path: &Path, site: &SiteContext) -> bool {
    if !path.is_file() {
        log::debug!("no web manifest at {}", path.display());
        return false;
    }
    match try_sync_manifest(path, site) {
        Ok(()) => {
            log::info!("synced {}", path.display());
            true
        }
        Err(err) => {
            log::warn!("web manifest not updated: {err}");
            false
        }
    }
}

fn try_sync_manifest(path: &Path, site: &SiteContext) -> Result<(), GenerateError> {
    let raw = fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut manifest: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| GenerateError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let object = manifest
        .as_object_mut()
        .ok_or_else(|| GenerateError::NotAnObject(path.to_path_buf()))?;
    object.insert("name".into(), site.title.clone().into());
    object.insert("short_name".into(), site.title.clone().into());
    object.insert("description".into(), site.description.clone().into());

    let mut pretty = serde_json::to_string_pretty(&manifest).map_err(|source| GenerateError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    pretty.push('\n');
    write_file(path, &pretty)
}

/// `path` relative to `root` for display, `/`-separated.
pub fn relative(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn plan_orders_home_posts_pages() {
        let site = FixtureSite::new();
        let plan = plan(&site.paths(), today()).unwrap();
        let routes: Vec<_> = plan.pages.iter().map(|p| p.meta.route.as_str()).collect();
        assert_eq!(routes, vec!["/", "/post/42", "/post/43", "/page/resume"]);
        assert!(plan.collisions.is_empty());
    }

    #[test]
    fn plan_writes_nothing() {
        let site = FixtureSite::new();
        plan(&site.paths(), today()).unwrap();
        assert!(!site.dist().join("post").exists());
        assert!(!site.dist().join("sitemap.xml").exists());
    }

    #[test]
    fn plan_skips_routes_outside_page_prefix() {
        let site = FixtureSite::new();
        let plan = plan(&site.paths(), today()).unwrap();
        assert!(plan.pages.iter().all(|p| p.meta.route != "/about"));
        assert!(!plan.pages.iter().any(|p| p.meta.route.starts_with("https:")));
    }

    #[test]
    fn plan_records_missing_markdown() {
        let site = FixtureSite::new();
        site.remove_data("resume.md");
        let plan = plan(&site.paths(), today()).unwrap();
        let page = plan.pages_of(PageKind::Page).next().unwrap();
        assert_eq!(
            page.source,
            PageSource::Markdown {
                file: "resume.md".into(),
                found: false
            }
        );
        assert_eq!(page.meta.title.as_deref(), Some("Resume"));
    }

    #[test]
    fn plan_marks_decoded_posts() {
        let site = FixtureSite::new();
        let plan = plan(&site.paths(), today()).unwrap();
        let sources: Vec<_> = plan.pages_of(PageKind::Post).map(|p| &p.source).collect();
        assert_eq!(
            sources[0],
            &PageSource::Post {
                id: "42".into(),
                decoded: false
            }
        );
        assert_eq!(
            sources[1],
            &PageSource::Post {
                id: "43".into(),
                decoded: true
            }
        );
    }

    #[test]
    fn duplicate_post_ids_collide_and_later_wins() {
        let site = FixtureSite::new();
        site.write_template(
            r##"{ "site": { "title": { "en": "Folio" }, "url": "https://example.com" },
                 "blog": { "posts": [
                    { "id": "1", "title": { "en": "First" }, "content": "a", "encoding": false },
                    { "id": "1", "title": { "en": "Second" }, "content": "b", "encoding": false }
                 ] } }"##,
        );
        let plan = plan(&site.paths(), today()).unwrap();
        assert_eq!(plan.collisions.len(), 1);
        let posts: Vec<_> = plan.pages_of(PageKind::Post).collect();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].meta.title.as_deref(), Some("Second"));
    }

    #[test]
    fn unsafe_and_empty_ids_skipped() {
        let site = FixtureSite::new();
        site.write_template(
            r##"{ "site": { "url": "https://example.com" },
                 "blog": { "posts": [
                    { "id": "../../etc", "content": "x" },
                    { "id": " ", "content": "x" },
                    { "id": "ok", "content": "x" }
                 ] } }"##,
        );
        let plan = plan(&site.paths(), today()).unwrap();
        let posts: Vec<_> = plan.pages_of(PageKind::Post).map(|p| p.meta.route.clone()).collect();
        assert_eq!(posts, vec!["/post/ok"]);
        assert_eq!(plan.skipped, vec!["/post/../../etc"]);
    }

    #[test]
    fn sitemap_uses_page_routes_and_drops_skipped_ones() {
        let site = FixtureSite::new();
        site.write_template(
            r##"{ "site": { "url": "https://example.com", "external": [
                    { "url": "/page/resume/", "name": { "en": "Resume" } },
                    { "url": "/page/", "name": { "en": "Pages" } },
                    { "url": "/about/", "name": { "en": "About" } }
                 ] } }"##,
        );
        let plan = plan(&site.paths(), today()).unwrap();
        let locs: Vec<_> = plan.sitemap.iter().map(|e| e.loc.as_str()).collect();
        assert_eq!(
            locs,
            vec![
                "https://example.com/",
                "https://example.com/page/resume",
                "https://example.com/about",
            ]
        );
        assert_eq!(plan.skipped, vec!["/page"]);
        let page = plan.pages_of(PageKind::Page).next().unwrap();
        assert_eq!(seo::page_url(&plan.site.base_url, &page.meta.route), locs[1]);
    }

    #[test]
    fn generate_requires_base_document() {
        let site = FixtureSite::new();
        site.remove_dist("index.html");
        let err = generate(&site.paths(), today()).unwrap_err();
        assert!(matches!(err, GenerateError::MissingBaseDocument(_)));
    }

    #[test]
    fn generate_requires_template() {
        let site = FixtureSite::new();
        site.remove_data("template.json");
        let err = generate(&site.paths(), today()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Content(ContentError::MissingTemplate(_))
        ));
    }

    #[test]
    fn generate_writes_every_page() {
        let site = FixtureSite::new();
        let report = generate(&site.paths(), today()).unwrap();
        for page in &report.plan.pages {
            assert!(page.output.is_file(), "missing {}", page.output.display());
        }
        assert!(site.dist().join("sitemap.xml").is_file());
        assert!(site.dist().join("robots.txt").is_file());
    }

    #[test]
    fn manifest_synced_and_other_keys_kept() {
        let site = FixtureSite::new();
        site.write_dist(
            "manifest.json",
            r##"{ "name": "old", "short_name": "old", "theme_color": "#000000", "icons": [] }"##,
        );
        let report = generate(&site.paths(), today()).unwrap();
        assert!(report.manifest_synced);
        let manifest: serde_json::Value =
            serde_json::from_str(&site.read_dist("manifest.json")).unwrap();
        assert_eq!(manifest["name"], "Folio");
        assert_eq!(manifest["short_name"], "Folio");
        assert_eq!(manifest["description"], "Security notes and writeups");
        assert_eq!(manifest["theme_color"], "#000000");
        assert!(manifest["icons"].as_array().unwrap().is_empty());
    }

    #[test]
    fn broken_manifest_is_not_fatal() {
        let site = FixtureSite::new();
        site.write_dist("manifest.json", "[1, 2");
        let report = generate(&site.paths(), today()).unwrap();
        assert!(!report.manifest_synced);
        assert_eq!(site.read_dist("manifest.json"), "[1, 2");

        site.write_dist("manifest.json", "[1, 2]");
        let report = generate(&site.paths(), today()).unwrap();
        assert!(!report.manifest_synced);
    }

    #[test]
    fn missing_manifest_is_skipped() {
        let site = FixtureSite::new();
        let report = generate(&site.paths(), today()).unwrap();
        assert!(!report.manifest_synced);
        assert!(!site.dist().join("manifest.json").exists());
    }

    #[test]
    fn relative_display_paths() {
        let root = Path::new("/site/dist");
        assert_eq!(relative(&root.join("post/42/index.html"), root), "post/42/index.html");
        assert_eq!(relative(Path::new("/elsewhere/x"), root), "/elsewhere/x");
    }
}
