use encoding_rs::Encoding;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::parsers::html::{
    create_metadata_tag, discover_stylesheets, encode_output, get_base_url, get_charset,
    html_to_dom, rewrite_stylesheet_links, serialize_document, strip_base_href, strip_scripts,
    Document,
};
use crate::relocator::{
    CancellationToken, Fetch, LocalNames, Persist, Relocator, ResourceMapping, SkippedResource,
    DEFAULT_JOBS,
};
use crate::utils::url::{resolve_url, Url};

/// Errors that prevent a snapshot from being produced at all
///
/// Problems with individual stylesheets never end up here; they are
/// reported through [`Snapshot::skipped`] instead.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no document to snapshot: the page is empty")]
    EmptyDocument,
    #[error("unknown encoding \"{0}\"")]
    UnknownEncoding(String),
    #[error("unable to serialize document: {0}")]
    Serialize(#[from] std::io::Error),
}

/// Configuration options for taking a snapshot
#[derive(Clone, Debug)]
pub struct SnapshotOptions {
    /// Keep `<script>` elements in the saved document
    pub keep_scripts: bool,
    /// How many stylesheets may be fetched at the same time
    pub jobs: usize,
    /// Charset of the page, overriding whatever the page declares
    pub encoding: Option<String>,
    /// Prepend a comment recording where and when the page was saved
    pub metadata: bool,
    /// Local names already used at the destination
    pub reserved_names: Vec<String>,
    pub cancellation: CancellationToken,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        SnapshotOptions {
            keep_scripts: false,
            jobs: DEFAULT_JOBS,
            encoding: None,
            metadata: false,
            reserved_names: Vec::new(),
            cancellation: CancellationToken::new(),
        }
    }
}

/// Result of a snapshot
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// The rewritten document, in the page's own encoding
    pub html: Vec<u8>,
    /// Stylesheets left pointing at their original address, with the reason why
    pub skipped: Vec<SkippedResource>,
    /// Stylesheets saved locally: original href → local name
    pub mapping: ResourceMapping,
    /// Charset the document was decoded from and re-encoded into
    pub encoding: String,
}

/// Snapshots a page for offline viewing
///
/// Parses `page`, saves every stylesheet it links to through `sink`
/// (retrieving them through `fetcher`), points the links at the saved
/// copies, strips scripts unless asked to keep them, and renders the result.
///
/// Relative references are resolved against `base_address`, as amended by
/// the page's own `<base href>`. An unparsable base address is not fatal;
/// only absolute references can be resolved then. Once any stylesheet has
/// been saved locally the `<base href>` is dropped from the output, since
/// the rewritten links are relative to the saved document.
///
/// Output is the serialized tree (see [`serialize_document`]) in the page's
/// charset, always terminated by a single `\n`.
///
/// # Examples
///
/// ```
/// use pagesnap::core::{create_snapshot, SnapshotOptions};
/// use pagesnap::relocator::{FetchError, PersistError};
/// use pagesnap::utils::url::Url;
///
/// let fetch = |_: &Url| -> Result<Vec<u8>, FetchError> { Ok(b"p {}".to_vec()) };
/// let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };
///
/// let snapshot = create_snapshot(
///     b"<link rel=\"stylesheet\" href=\"/css/site.css\">",
///     "https://example.com/index.html",
///     &SnapshotOptions::default(),
///     &fetch,
///     &persist,
/// )
/// .unwrap();
///
/// assert_eq!(snapshot.mapping.get("/css/site.css"), Some("site.css"));
/// assert!(snapshot.skipped.is_empty());
/// ```
pub fn create_snapshot<F: Fetch, P: Persist>(
    page: &[u8],
    base_address: &str,
    options: &SnapshotOptions,
    fetcher: &F,
    sink: &P,
) -> Result<Snapshot, SnapshotError> {
    if page.is_empty() {
        return Err(SnapshotError::EmptyDocument);
    }

    let (mut document, document_encoding) = process_encoding(page, options)?;
    let base_url = determine_base_url(base_address, &document);

    // Discover and relocate stylesheets
    let hrefs: Vec<String> = discover_stylesheets(&document)
        .into_iter()
        .map(|link| link.href)
        .collect();
    debug!("found {} stylesheet link(s)", hrefs.len());

    let names = LocalNames::with_reserved(options.reserved_names.iter().cloned());
    let relocation = Relocator::new(base_url.as_ref(), fetcher, sink)
        .with_names(names)
        .with_jobs(options.jobs)
        .relocate_all(&hrefs, &options.cancellation);

    // Point links at the local copies
    let rewritten = rewrite_stylesheet_links(&mut document, &relocation.mapping);
    if !relocation.mapping.is_empty() {
        strip_base_href(&mut document);
    }
    info!(
        "saved {} stylesheet(s), rewrote {} link(s), skipped {}",
        relocation.mapping.len(),
        rewritten,
        relocation.skipped.len()
    );

    if !options.keep_scripts {
        let removed = strip_scripts(&mut document);
        debug!("removed {} script element(s)", removed);
    }

    let html = format_output(&document, &document_encoding, base_url.as_ref(), options)?;

    Ok(Snapshot {
        html,
        skipped: relocation.skipped,
        mapping: relocation.mapping,
        encoding: document_encoding,
    })
}

/// Parses the page, re-parsing it once if it declares a charset of its own
fn process_encoding(
    page: &[u8],
    options: &SnapshotOptions,
) -> Result<(Document, String), SnapshotError> {
    if let Some(encoding) = &options.encoding {
        if Encoding::for_label_no_replacement(encoding.as_bytes()).is_none() {
            return Err(SnapshotError::UnknownEncoding(encoding.clone()));
        }
        return Ok((html_to_dom(page, encoding), encoding.clone()));
    }

    let document = html_to_dom(page, "utf-8");

    if let Some(html_charset) = get_charset(&document).filter(|c| !c.is_empty()) {
        match Encoding::for_label_no_replacement(html_charset.as_bytes()) {
            // The declaration was just read as ASCII, so the bytes cannot be UTF-16
            Some(charset)
                if charset == encoding_rs::UTF_16LE
                    || charset == encoding_rs::UTF_16BE
                    || charset == encoding_rs::X_USER_DEFINED =>
            {
                debug!("treating declared charset {} as UTF-8", charset.name());
            }
            Some(charset) if charset != encoding_rs::UTF_8 => {
                debug!("re-parsing document as {}", charset.name());
                return Ok((html_to_dom(page, charset.name()), html_charset));
            }
            Some(_) => {}
            None => warn!("ignoring unknown document charset \"{}\"", html_charset),
        }
    }

    Ok((document, "utf-8".to_string()))
}

/// Works out the URL relative references are resolved against
fn determine_base_url(base_address: &str, document: &Document) -> Option<Url> {
    let base_url = match Url::parse(base_address) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("unable to parse base address \"{}\": {}", base_address, e);
            None
        }
    };

    match get_base_url(document) {
        Some(base_href) => match resolve_url(base_url.as_ref(), base_href.trim()) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("ignoring unusable <base href=\"{}\">: {}", base_href, e);
                base_url
            }
        },
        None => base_url,
    }
}

/// Serializes, re-encodes and terminates the output with a newline
fn format_output(
    document: &Document,
    document_encoding: &str,
    base_url: Option<&Url>,
    options: &SnapshotOptions,
) -> Result<Vec<u8>, SnapshotError> {
    let mut result = encode_output(serialize_document(document)?, document_encoding);

    if options.metadata {
        if let Some(url) = base_url {
            let mut metadata_comment = create_metadata_tag(url);
            metadata_comment.push('\n');
            result.splice(0..0, metadata_comment.into_bytes());
        }
    }

    if result.last() != Some(&b'\n') {
        result.push(b'\n');
    }

    Ok(result)
}
