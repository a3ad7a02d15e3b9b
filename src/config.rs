//! Build configuration module.
//!
//! Handles loading and validating `seo.toml`. The file is optional: stock
//! defaults cover a standard site, and a user file only overrides the keys
//! it names.
//!
//! ## Config File Location
//!
//! `seo.toml` lives next to `template.json` in the data directory:
//!
//! ```text
//! client/src/data/
//! ├── template.json         # Site content (title, posts, external pages)
//! ├── seo.toml              # Prerender settings (optional)
//! ├── resume.md             # Body of /page/resume
//! └── vision.md             # Body of /page/vision
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! template_file = "template.json"  # Site document, relative to the data dir
//! page_prefix = "/page/"           # Routes backed by a markdown file
//! language = ""                    # Empty = first entry of site.languages
//!
//! [description]
//! max_chars = 200           # Description budget before "..." is appended
//! max_lines = 3             # Body lines considered for the description
//!
//! [defaults]
//! site_title = "shulkwisec"                 # Used when template.json has none
//! site_url = "https://shulkwisec.github.io" # Used when site.url is missing
//! image = "favicon.png"                     # Social card image fallback
//!
//! [social]
//! twitter_card = "summary_large_image"
//!
//! [sitemap]
//! home_priority = 1.0
//! page_priority = 0.8
//! post_priority = 0.7
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the data directory.
pub const CONFIG_FILE: &str = "seo.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Prerender configuration loaded from `seo.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Site document file name, relative to the data directory.
    pub template_file: String,
    /// Route prefix of markdown-backed external pages.
    pub page_prefix: String,
    /// Language used for every localized field. Empty picks the first
    /// entry of `site.languages`.
    pub language: String,
    /// Description extraction budget.
    pub description: DescriptionConfig,
    /// Values used when the site document leaves them out.
    pub defaults: DefaultsConfig,
    /// Social card settings.
    pub social: SocialConfig,
    /// Sitemap priority hints.
    pub sitemap: SitemapConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            template_file: "template.json".to_string(),
            page_prefix: "/page/".to_string(),
            language: String::new(),
            description: DescriptionConfig::default(),
            defaults: DefaultsConfig::default(),
            social: SocialConfig::default(),
            sitemap: SitemapConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.description.max_chars == 0 {
            return Err(ConfigError::Validation(
                "description.max_chars must be greater than 0".into(),
            ));
        }
        if self.description.max_lines == 0 {
            return Err(ConfigError::Validation(
                "description.max_lines must be greater than 0".into(),
            ));
        }
        if !self.page_prefix.starts_with('/') || !self.page_prefix.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "page_prefix must start and end with '/', got {:?}",
                self.page_prefix
            )));
        }
        if self.template_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "template_file must not be empty".into(),
            ));
        }
        if self.defaults.site_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "defaults.site_url must not be empty".into(),
            ));
        }
        for (key, value) in [
            ("home_priority", self.sitemap.home_priority),
            ("page_priority", self.sitemap.page_priority),
            ("post_priority", self.sitemap.post_priority),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "sitemap.{key} must be within 0.0-1.0"
                )));
            }
        }
        Ok(())
    }
}

/// How much body text goes into a meta description.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptionConfig {
    /// Maximum characters kept before `...` is appended.
    pub max_chars: usize,
    /// Number of leading body lines considered.
    pub max_lines: usize,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            max_chars: 200,
            max_lines: 3,
        }
    }
}

/// Fallback values for fields the site document leaves out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub site_title: String,
    pub site_url: String,
    /// Site-relative or absolute image used when a page has none.
    pub image: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            site_title: "shulkwisec".to_string(),
            site_url: "https://shulkwisec.github.io".to_string(),
            image: "favicon.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocialConfig {
    /// Value of the `twitter:card` meta tag.
    pub twitter_card: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            twitter_card: "summary_large_image".to_string(),
        }
    }
}

/// Sitemap `<priority>` values per route kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    pub home_priority: f32,
    pub page_priority: f32,
    pub post_priority: f32,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            home_priority: 1.0,
            page_priority: 0.8,
            post_priority: 0.7,
        }
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Load config from `seo.toml` in the given data directory.
///
/// A missing file yields the stock defaults. Keys the file leaves out keep
/// their defaults, unknown keys are rejected, and the result is validated.
pub fn load_config(data_dir: &Path) -> Result<BuildConfig, ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let config: BuildConfig = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        BuildConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `seo.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio-prerender configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Site document, relative to the data directory.
template_file = "template.json"

# External pages whose route starts with this prefix are prerendered from
# a markdown file named after the last route segment (/page/resume -> resume.md).
page_prefix = "/page/"

# Language used for titles, excerpts and page names.
# Empty picks the first entry of site.languages in template.json.
language = ""

# ---------------------------------------------------------------------------
# Meta description extraction
# ---------------------------------------------------------------------------
[description]
# Characters kept before "..." is appended.
max_chars = 200

# Leading body lines (headers, HTML and rules skipped) used for the text.
max_lines = 3

# ---------------------------------------------------------------------------
# Fallbacks for values template.json leaves out
# ---------------------------------------------------------------------------
[defaults]
site_title = "shulkwisec"
site_url = "https://shulkwisec.github.io"

# Social card image for pages without one (site-relative or absolute).
image = "favicon.png"

# ---------------------------------------------------------------------------
# Social cards
# ---------------------------------------------------------------------------
[social]
twitter_card = "summary_large_image"

# ---------------------------------------------------------------------------
# Sitemap priority hints (0.0 - 1.0)
# ---------------------------------------------------------------------------
[sitemap]
home_priority = 1.0
page_priority = 0.8
post_priority = 0.7
"##
}
