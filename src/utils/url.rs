use percent_encoding::percent_decode_str;
pub use url::{ParseError, Url};

/// Name used for a stylesheet whose href has no usable final path segment
pub const FALLBACK_FILE_NAME: &str = "stylesheet.css";

/// Characters that cannot appear in a local file name
const UNSAFE_FILE_NAME_CHARS: &[char] = &['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

/// Strips the fragment and any credentials from a URL
pub fn clean_url(url: Url) -> Url {
    let mut url = url;

    url.set_fragment(None);

    if url.has_authority() {
        // Only fails for URLs that cannot carry credentials in the first place
        let _ = url.set_username("");
        let _ = url.set_password(None);
    }

    url
}

/// Resolves a possibly relative reference against a base URL
///
/// Follows the standard reference resolution rules: absolute references
/// are returned as they are, scheme-relative, path-absolute and
/// path-relative ones are resolved against `base`. Without a base only
/// absolute references can be resolved.
pub fn resolve_url(base: Option<&Url>, href: &str) -> Result<Url, ParseError> {
    match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    }
}

/// Derives a local file name from the final path segment of an href
///
/// The query and fragment are dropped, the segment is percent-decoded and
/// characters unsafe in file names are replaced with underscores. Leading
/// dots are removed so the result is never hidden nor a parent reference.
pub fn file_name_from_href(href: &str) -> String {
    let segment = last_path_segment(href.trim());
    let decoded = percent_decode_str(&segment).decode_utf8_lossy();

    let sanitized: String = decoded
        .chars()
        .map(|c| {
            if UNSAFE_FILE_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let sanitized = sanitized.trim().trim_start_matches('.');

    if sanitized.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        sanitized.to_string()
    }
}

/// Final path segment of an href, still percent-encoded
///
/// Absolute and scheme-relative hrefs are parsed so their host never
/// passes for a path segment.
fn last_path_segment(href: &str) -> String {
    let parsed = if href.starts_with("//") {
        Url::parse(&format!("https:{href}"))
    } else {
        Url::parse(href)
    };

    match parsed {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        Err(_) => {
            let path = href.split(['#', '?']).next().unwrap_or_default();
            path.rsplit('/').next().unwrap_or_default().to_string()
        }
    }
}
