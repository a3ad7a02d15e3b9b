//! Route naming and output paths.
//!
//! Every prerendered document is addressed by a site-relative route:
//!
//! - `/` → `dist/index.html` (overwrites the SPA entry document)
//! - `/post/{id}` → `dist/post/{id}/index.html`
//! - `/page/{slug}` → `dist/page/{slug}/index.html`, body read from `{slug}.md`
//!
//! Routes come from user content, so each one is checked before it becomes a
//! path: empty, `.` and `..` segments and backslashes are refused.
//!
//! ## Collisions
//!
//! Two routes can map to the same file (a post id that matches a page slug
//! under a custom prefix, duplicate post ids). [`RouteTable`] records which
//! route claimed each file first so the driver can warn; the later route
//! still wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Route prefix of blog posts.
pub const POST_PREFIX: &str = "/post/";

/// Route of a blog post.
pub fn post_route(id: &str) -> String {
    format!("{POST_PREFIX}{}", id.trim())
}

/// Markdown slug of an external page route.
///
/// The route must start with `prefix`; the slug is its last path segment.
/// `/page/resume` → `resume`, `/page/notes/intro/` → `intro`.
pub fn page_slug<'a>(route: &'a str, prefix: &str) -> Option<&'a str> {
    route
        .strip_prefix(prefix)?
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|slug| is_safe_segment(slug))
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['\\', '?', '#'])
}

/// Whether a route can be written below the output directory.
pub fn is_safe_route(route: &str) -> bool {
    if !route.starts_with('/') {
        return false;
    }
    let trimmed = route.trim_matches('/');
    trimmed.is_empty() || trimmed.split('/').all(is_safe_segment)
}

/// Output file of a route: `{dist}/index.html` for `/`, else
/// `{dist}/{route}/index.html`. `None` for unsafe routes.
pub fn output_file(dist: &Path, route: &str) -> Option<PathBuf> {
    if !is_safe_route(route) {
        return None;
    }
    let mut path = dist.to_path_buf();
    for segment in route.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.push("index.html");
    Some(path)
}

/// Two routes that resolve to the same output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub path: PathBuf,
    pub first: String,
    pub second: String,
}

/// Output files claimed so far in a run.
#[derive(Debug, Default)]
pub struct RouteTable {
    claimed: BTreeMap<PathBuf, String>,
}

impl RouteTable {
    /// Claim `path` for `route`. Returns the collision when another route
    /// already claimed it; the new route takes over the file.
    pub fn claim(&mut self, route: &str, path: &Path) -> Option<Collision> {
        let previous = self.claimed.insert(path.to_path_buf(), route.to_string())?;
        Some(Collision {
            path: path.to_path_buf(),
            first: previous,
            second: route.to_string(),
        })
    }
}
