//! Document metadata: base URL, declared charset and the "saved from" marker

use chrono::{SecondsFormat, Utc};

use crate::utils::url::{clean_url, Url};

use super::dom::Document;

/// Returns the `href` of the document's `<base>` element
///
/// Only the first `<base>` inside `<head>` counts; any others are ignored,
/// as browsers do.
pub fn get_base_url(document: &Document) -> Option<String> {
    document
        .find_children(&["html", "head"], "base")
        .into_iter()
        .find_map(|base| base.get_attr("href"))
        .map(str::to_string)
}

/// Returns the charset declared by the document's `<meta>` elements
///
/// Both `<meta charset="...">` and the older
/// `<meta http-equiv="content-type" content="text/html; charset=...">`
/// forms are recognized; the first declaration wins.
pub fn get_charset(document: &Document) -> Option<String> {
    for meta in document.find_children(&["html", "head"], "meta") {
        if let Some(charset) = meta.get_attr("charset") {
            return Some(charset.trim().to_string());
        }

        if meta
            .get_attr("http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = meta.get_attr("content") {
                let (_media_type, charset) = parse_content_type(content);
                return Some(charset);
            }
        }
    }

    None
}

/// Splits a Content-Type value into its media type and charset
pub fn parse_content_type(content_type: &str) -> (String, String) {
    let mut parts = content_type.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_lowercase();
    let mut charset = String::new();

    for part in parts {
        let part = part.trim();
        if let Some(key) = part.get(..8) {
            if key.eq_ignore_ascii_case("charset=") {
                charset = part[8..].trim_matches('"').to_string();
            }
        }
    }

    (media_type, charset)
}

/// Builds the comment that marks where and when a snapshot was taken
///
/// Credentials and fragments never end up in the comment; non-HTTP sources
/// are reported as "local source".
pub fn create_metadata_tag(url: &Url) -> String {
    let datetime: &str = &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let clean_url: Url = clean_url(url.clone());
    let is_http = clean_url.scheme() == "http" || clean_url.scheme() == "https";

    format!(
        "<!-- Saved from {} at {} using {} v{} -->",
        if is_http {
            clean_url.as_str()
        } else {
            "local source"
        },
        datetime,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
}
