//! Metadata extraction from markdown bodies.
//!
//! Turns a raw body (plain text, markdown, or markdown with inline HTML) into
//! the three things a social card needs:
//!
//! - **Title**: the first `#`, `##` or `###` heading, else the first line
//!   wrapped in `**bold**`.
//! - **Description**: the first few lines of prose, stripped of markup and
//!   truncated to the configured budget.
//! - **Images**: every markdown image and `<img src>` in document order.
//!
//! Everything here is a pure function of its inputs. Malformed markup never
//! errors: a construct that does not match simply contributes nothing and the
//! caller's fallbacks fill the gap.

use crate::config::DescriptionConfig;
use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! regex {
    ($name:ident, $pattern:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pattern).expect($pattern));
    };
}

regex!(HEADING, r"(?m)^[ \t]*(?:[-*][ \t]+)?#{1,3}[ \t]+(.+)$");
regex!(BOLD_LINE, r"(?m)^[ \t]*\*\*([^*\n]+)\*\*[ \t]*\r?$");
regex!(
    IMAGE,
    r#"!\[[^\]]*\]\(\s*<?([^)\s>]+)>?[^)]*\)|(?i:<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["'])"#
);
regex!(STYLE_BLOCK, r"(?is)<style\b[^>]*>.*?</style\s*>");
regex!(SCRIPT_BLOCK, r"(?is)<script\b[^>]*>.*?</script\s*>");
regex!(COMMENT, r"(?s)<!--.*?-->");
regex!(MD_IMAGE, r"!\[[^\]]*\]\([^)]*\)");
regex!(HTML_TAG, r"<[^<>]*>");
regex!(MD_LINK, r"\[([^\[\]]*)\]\([^)]*\)");
regex!(LIST_MARKER, r"(?m)^[ \t]*(?:[-+]|\d+[.)])[ \t]+");
regex!(HEADING_MARKER, r"(?m)^[ \t]*#{1,6}[ \t]+");
regex!(QUOTE_MARKER, r"(?m)^[ \t]*>+[ \t]?");
regex!(EMPHASIS, r"[*_`~]");
regex!(WHITESPACE, r"\s+");

/// Values used for whatever the body does not provide.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fallbacks<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
}

/// Metadata pulled from a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: Option<String>,
    pub description: String,
    /// Image references as written (absolute or site-relative).
    pub images: Vec<String>,
}

/// Extract title, description and images from `content`.
pub fn extract(content: Option<&str>, fallbacks: Fallbacks<'_>, budget: &DescriptionConfig) -> Extracted {
    let fallback_images = || {
        fallbacks
            .image
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(|i| vec![i.to_string()])
            .unwrap_or_default()
    };
    let fallback_description = || {
        fallbacks
            .description
            .map(|d| truncate(&clean_text(d), budget.max_chars))
            .unwrap_or_default()
    };

    let Some(text) = content.filter(|c| !c.trim().is_empty()) else {
        return Extracted {
            title: fallbacks.title.map(clean_text).filter(|t| !t.is_empty()),
            description: fallback_description(),
            images: fallback_images(),
        };
    };

    let title = extract_title(text)
        .or_else(|| fallbacks.title.map(clean_text))
        .filter(|t| !t.is_empty());

    let description = match extract_description(text, budget) {
        d if d.is_empty() => fallback_description(),
        d => d,
    };

    let mut images = extract_images(text);
    if images.is_empty() {
        images = fallback_images();
    }

    Extracted {
        title,
        description,
        images,
    }
}

/// First level 1-3 heading, else the first fully bold line, cleaned.
pub fn extract_title(text: &str) -> Option<String> {
    HEADING
        .captures(text)
        .or_else(|| BOLD_LINE.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|t| !t.is_empty())
}

/// Plain-text description from the leading prose lines, within budget.
///
/// Headers, lines opening with raw HTML and horizontal rules are skipped.
pub fn extract_description(text: &str, budget: &DescriptionConfig) -> String {
    let without_blocks = strip_blocks(text);
    let lines: Vec<String> = without_blocks
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('<') && !l.starts_with("---"))
        .map(clean_text)
        .filter(|l| !l.is_empty())
        .take(budget.max_lines)
        .collect();
    // Tags split across lines only match once joined.
    truncate(&clean_text(&lines.join(" ")), budget.max_chars)
}

/// Every markdown image target and `<img src>` value, in document order.
pub fn extract_images(text: &str) -> Vec<String> {
    IMAGE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|src| !src.is_empty())
        .collect()
}

fn strip_blocks(text: &str) -> String {
    let text = STYLE_BLOCK.replace_all(text, "");
    let text = SCRIPT_BLOCK.replace_all(&text, "");
    COMMENT.replace_all(&text, "").into_owned()
}

/// Replace matches of `re` until the text stops changing, so markup that
/// only forms once its inner part is removed is stripped too.
fn replace_until_stable(re: &Regex, text: String, rep: &str) -> String {
    let mut current = text;
    loop {
        let next = re.replace_all(&current, rep);
        if next == current {
            return current;
        }
        current = next.into_owned();
    }
}

/// Strip markup from a fragment and collapse its whitespace.
pub fn clean_text(text: &str) -> String {
    let text = strip_blocks(text);
    let text = MD_IMAGE.replace_all(&text, "").into_owned();
    let text = replace_until_stable(&HTML_TAG, text, "");
    let text = replace_until_stable(&MD_LINK, text, "$1");
    let text = HEADING_MARKER.replace_all(&text, "");
    let text = QUOTE_MARKER.replace_all(&text, "");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Cut `text` to `max_chars` characters, appending `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> DescriptionConfig {
        DescriptionConfig::default()
    }

    fn no_fallbacks() -> Fallbacks<'static> {
        Fallbacks::default()
    }

    #[test]
    fn title_from_heading() {
        assert_eq!(extract_title("# Hello\nWorld"), Some("Hello".to_string()));
        assert_eq!(extract_title("intro\n### Third"), Some("Third".to_string()));
        assert_eq!(extract_title("- ## Listed"), Some("Listed".to_string()));
    }

    #[test]
    fn title_ignores_deep_headings() {
        assert_eq!(extract_title("#### Too deep\ntext"), None);
    }

    #[test]
    fn title_heading_wins_over_bold() {
        assert_eq!(
            extract_title("**Bold first**\n## Heading"),
            Some("Heading".to_string())
        );
    }

    #[test]
    fn title_from_bold_line() {
        assert_eq!(
            extract_title("**CVE-2024-1234 analysis**\nbody"),
            Some("CVE-2024-1234 analysis".to_string())
        );
        // Bold in the middle of a line is not a title
        assert_eq!(extract_title("some **bold** text"), None);
    }

    #[test]
    fn title_needs_the_whole_line_bold() {
        assert_eq!(extract_title("**a** and **b**
body"), None);
        assert_eq!(
            extract_title("**a** and **b**
**Real title**
body"),
            Some("Real title".to_string())
        );
    }

    #[test]
    fn title_strips_inline_markup() {
        assert_eq!(
            extract_title("# The [`nmap`](https://nmap.org) *cheatsheet*"),
            Some("The nmap cheatsheet".to_string())
        );
    }

    #[test]
    fn description_skips_headers_html_and_rules() {
        let text = "# Title\n<div align=\"center\">\n---\nFirst line.\n\nSecond line.\nThird line.\nFourth line.";
        assert_eq!(
            extract_description(text, &budget()),
            "First line. Second line. Third line."
        );
    }

    #[test]
    fn description_strips_markup() {
        let text = "Read **this** [guide](https://x.y/z) and `code` ![pic](/a.png) <b>now</b>";
        assert_eq!(
            extract_description(text, &budget()),
            "Read this guide and code now"
        );
    }

    #[test]
    fn description_drops_style_and_script_blocks() {
        let text = "<style>\n.a { color: red }\n</style>\nVisible text\n<script>\nalert(1)\n</script>";
        assert_eq!(extract_description(text, &budget()), "Visible text");
    }

    #[test]
    fn description_is_truncated_with_ellipsis() {
        let text = "word ".repeat(100);
        let budget = DescriptionConfig {
            max_chars: 20,
            max_lines: 3,
        };
        let desc = extract_description(&text, &budget);
        assert!(desc.ends_with("..."));
        assert!(desc.chars().count() <= 23);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "héllo wörld ünïcode";
        let out = truncate(text, 7);
        assert_eq!(out, "héllo w...");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn clean_text_handles_nested_tags() {
        assert_eq!(clean_text("a <<b>i> b"), "a b");
        assert_eq!(clean_text("<p><em>x</em></p>"), "x");
    }

    #[test]
    fn title_keeps_trailing_hash() {
        assert_eq!(extract_title("## Learn C#"), Some("Learn C#".to_string()));
    }

    #[test]
    fn description_joins_tags_split_across_lines() {
        let text = "intro <a\nhref=\"/x\">linked</a> outro";
        assert_eq!(extract_description(text, &budget()), "intro linked outro");
    }

    #[test]
    fn description_strips_list_markers_per_line() {
        let text = "1. first\n2. second\n- third\n- fourth";
        assert_eq!(extract_description(text, &budget()), "first second third");
    }

    #[test]
    fn image_only_lines_do_not_use_up_description_lines() {
        let text = "![a](/a.png)\none\ntwo\nthree";
        assert_eq!(extract_description(text, &budget()), "one two three");
    }

    #[test]
    fn clean_text_keeps_hyphenated_words() {
        assert_eq!(clean_text("client-side rendering"), "client-side rendering");
    }

    #[test]
    fn images_in_document_order() {
        let text = "<img src='/first.png'>\n![b](/second.png \"title\")\n<IMG alt=x src=\"https://c.dev/third.jpg\">";
        assert_eq!(
            extract_images(text),
            vec!["/first.png", "/second.png", "https://c.dev/third.jpg"]
        );
    }

    #[test]
    fn image_only_line_example() {
        let out = extract(
            Some("![alt](/img/a.png) some text"),
            Fallbacks {
                title: Some("Default"),
                ..Default::default()
            },
            &budget(),
        );
        assert_eq!(out.images, vec!["/img/a.png"]);
        assert_eq!(out.title.as_deref(), Some("Default"));
        assert_eq!(out.description, "some text");
    }

    #[test]
    fn empty_content_returns_fallbacks() {
        let fallbacks = Fallbacks {
            title: Some("Resume"),
            description: Some("About **me**"),
            image: Some("/favicon.png"),
        };
        for content in [None, Some(""), Some("  \n\t ")] {
            let out = extract(content, fallbacks, &budget());
            assert_eq!(out.title.as_deref(), Some("Resume"));
            assert_eq!(out.description, "About me");
            assert_eq!(out.images, vec!["/favicon.png"]);
        }
    }

    #[test]
    fn missing_images_use_fallback_image() {
        let out = extract(
            Some("# T\nbody"),
            Fallbacks {
                image: Some("favicon.png"),
                ..Default::default()
            },
            &budget(),
        );
        assert_eq!(out.images, vec!["favicon.png"]);
    }

    #[test]
    fn description_falls_back_when_body_has_no_prose() {
        let out = extract(
            Some("# Only a heading\n<div></div>"),
            Fallbacks {
                description: Some("Site description"),
                ..Default::default()
            },
            &budget(),
        );
        assert_eq!(out.title.as_deref(), Some("Only a heading"));
        assert_eq!(out.description, "Site description");
    }

    #[test]
    fn malformed_markup_degrades_gracefully() {
        let out = extract(
            Some("![broken(/x.png\n[link](no close\n<img src=\"unterminated"),
            no_fallbacks(),
            &budget(),
        );
        assert!(out.images.is_empty());
        assert_eq!(out.title, None);
        assert!(!out.description.contains('*'));
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "# A\n![i](/i.png)\nSome *text* here <br> and [there](/t).";
        let a = extract(Some(text), no_fallbacks(), &budget());
        let b = extract(Some(text), no_fallbacks(), &budget());
        assert_eq!(a, b);
    }

    #[test]
    fn description_never_contains_markup() {
        let samples = [
            "**bold** _em_ `code` ~~strike~~ > quote",
            "<p>para <a href=\"/x\">link</a></p> text",
            "[![badge](/b.svg)](https://ci) build status",
            "1. first\n2. second\n- third",
        ];
        for sample in samples {
            let desc = extract_description(sample, &budget());
            assert!(!HTML_TAG.is_match(&desc), "{desc:?}");
            assert!(!MD_IMAGE.is_match(&desc), "{desc:?}");
            assert!(!MD_LINK.is_match(&desc), "{desc:?}");
            assert!(!desc.contains(['*', '_', '`', '~']), "{desc:?}");
            assert!(desc.chars().count() <= budget().max_chars + 3);
        }
    }
}
