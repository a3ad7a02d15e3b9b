//! Shared test utilities for the folio-prerender test suite.
//!
//! [`FixtureSite`] lays out a small but complete site in a temp directory:
//! a data directory with `template.json` and page markdown, and a dist
//! directory holding the built SPA entry document.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let site = FixtureSite::new();
//! site.remove_data("resume.md");
//! let plan = plan(&site.paths(), today()).unwrap();
//! ```
//!
//! The fixture contains:
//!
//! - post `42`: plain markdown, `"encoding": false`
//! - post `43`: base64 body without an `encoding` flag
//! - external `/page/resume` backed by `resume.md`
//! - external `/about` and an absolute GitHub link, both not prerendered

use crate::generate::BuildPaths;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fixed build date for deterministic output.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

pub const SPA_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>shulkwisec</title>
    <meta name="description" content="placeholder" />
    <!-- Social Meta Tags -->
    <meta property="og:title" content="placeholder" />
    <script type="module" crossorigin src="/assets/index.js"></script>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#;

pub const RESUME_MD: &str = "# Curriculum Vitae\n\n![portrait](/img/me.jpg)\n\nSecurity researcher focused on web exploitation.\n";

/// Body of post 43 before encoding.
pub const ENCODED_POST_MD: &str =
    "## Heap notes\n\nA walk through glibc malloc internals for CTF players.\n\n![chunk](https://cdn.example.org/chunk.png)\n";

fn template_json() -> String {
    let encoded = STANDARD.encode(ENCODED_POST_MD);
    format!(
        r##"{{
  "site": {{
    "title": {{ "en": "Folio" }},
    "subtitle": {{ "en": "Notes" }},
    "description": {{ "en": "Security notes and writeups" }},
    "url": "https://example.com",
    "languages": ["en"],
    "external": [
      {{ "url": "/page/resume", "name": {{ "en": "Resume" }} }},
      {{ "url": "/about", "name": {{ "en": "About" }} }},
      {{ "url": "https://github.com/shulk", "name": {{ "en": "GitHub" }} }}
    ]
  }},
  "blog": {{
    "posts": [
      {{
        "id": "42",
        "date": "2024-03-01",
        "title": {{ "en": "Hello" }},
        "excerpt": {{ "en": "World" }},
        "content": "# Hello\nWorld body.",
        "tags": ["intro"],
        "encoding": false
      }},
      {{
        "id": 43,
        "date": "2024-04-10",
        "content": "{encoded}"
      }}
    ]
  }},
  "owner": {{ "name": {{ "en": "Shulk" }}, "social": {{ "twitter": "https://x.com/shulk" }} }},
  "achievements": []
}}"##
    )
}

/// A complete site in a temp directory.
pub struct FixtureSite {
    tmp: TempDir,
}

impl FixtureSite {
    pub fn new() -> Self {
        let site = Self {
            tmp: TempDir::new().unwrap(),
        };
        fs::create_dir_all(site.data()).unwrap();
        fs::create_dir_all(site.dist()).unwrap();
        site.write_template(&template_json());
        site.write_data("resume.md", RESUME_MD);
        site.write_dist("index.html", SPA_INDEX);
        site
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn data(&self) -> PathBuf {
        self.root().join("data")
    }

    pub fn dist(&self) -> PathBuf {
        self.root().join("dist")
    }

    pub fn paths(&self) -> BuildPaths {
        BuildPaths {
            data_dir: self.data(),
            dist_dir: self.dist(),
        }
    }

    pub fn write_template(&self, json: &str) {
        self.write_data("template.json", json);
    }

    pub fn write_data(&self, name: &str, contents: &str) {
        fs::write(self.data().join(name), contents).unwrap();
    }

    pub fn remove_data(&self, name: &str) {
        fs::remove_file(self.data().join(name)).unwrap();
    }

    pub fn write_dist(&self, name: &str, contents: &str) {
        let path = self.dist().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn read_dist(&self, name: &str) -> String {
        fs::read_to_string(self.dist().join(name)).unwrap()
    }

    pub fn remove_dist(&self, name: &str) {
        fs::remove_file(self.dist().join(name)).unwrap();
    }
}
