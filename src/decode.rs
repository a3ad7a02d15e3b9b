//! Base64 post bodies.
//!
//! Posts written through the site manager are stored base64-encoded so that
//! raw HTML and front-matter-like markup survive JSON round trips. Each post
//! may say so explicitly with `"encoding": true`; older posts carry no flag
//! and are sniffed instead.
//!
//! Decoding never fails the build: anything that does not decode to UTF-8
//! text is returned as stored.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use thiserror::Error;

/// Bodies this short are never sniffed as base64.
pub const MIN_SNIFF_LEN: usize = 50;

static BASE64_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/=\r\n]+$").expect("valid base64 body regex"));

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded bytes are not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Whether `content` looks like a base64 block: longer than
/// [`MIN_SNIFF_LEN`] once trimmed, and nothing but base64 characters and
/// line breaks.
pub fn looks_like_base64(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.len() > MIN_SNIFF_LEN && BASE64_BODY.is_match(trimmed)
}

/// Decode a base64 block to UTF-8 text. Line breaks are ignored.
pub fn decode_base64(content: &str) -> Result<String, DecodeError> {
    let compact: String = content
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect();
    let bytes = LENIENT.decode(compact.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

/// Resolve a post body to markdown.
///
/// - `Some(true)`: decode.
/// - `Some(false)`: use as stored.
/// - `None`: decode only when [`looks_like_base64`] says so.
///
/// On decode failure the stored content is returned unchanged.
pub fn decode_post_body<'a>(post_id: &str, content: &'a str, encoded: Option<bool>) -> Cow<'a, str> {
    let should_decode = match encoded {
        Some(flag) => flag,
        None => looks_like_base64(content),
    };
    if !should_decode {
        return Cow::Borrowed(content);
    }
    match decode_base64(content) {
        Ok(text) => Cow::Owned(text),
        Err(err) => {
            log::warn!("post {post_id}: body not decodable, using it as stored: {err}");
            Cow::Borrowed(content)
        }
    }
}
