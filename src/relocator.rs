//! Retrieval and local storage of the stylesheets a document references
//!
//! The relocator never touches the document tree. It turns the list of
//! discovered hrefs into a [`ResourceMapping`] (original href → local name)
//! that the rewriter applies afterwards, plus a list of resources that had
//! to be skipped.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use crate::utils::url::{file_name_from_href, resolve_url, ParseError, Url};

/// Number of stylesheets fetched at the same time unless told otherwise
pub const DEFAULT_JOBS: usize = 4;

/// Failure reported by a [`Fetch`] implementation
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct FetchError {
    pub reason: String,
}

impl FetchError {
    pub fn new(reason: impl Into<String>) -> Self {
        FetchError {
            reason: reason.into(),
        }
    }
}

/// Failure reported by a [`Persist`] implementation
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct PersistError {
    pub reason: String,
}

impl PersistError {
    pub fn new(reason: impl Into<String>) -> Self {
        PersistError {
            reason: reason.into(),
        }
    }
}

/// Retrieves the raw bytes behind an absolute URL
pub trait Fetch: Sync {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

impl<F> Fetch for F
where
    F: Fn(&Url) -> Result<Vec<u8>, FetchError> + Sync,
{
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self(url)
    }
}

/// Stores bytes under a name relative to some destination
pub trait Persist: Sync {
    fn persist(&self, name: &str, data: &[u8]) -> Result<(), PersistError>;
}

impl<F> Persist for F
where
    F: Fn(&str, &[u8]) -> Result<(), PersistError> + Sync,
{
    fn persist(&self, name: &str, data: &[u8]) -> Result<(), PersistError> {
        self(name, data)
    }
}

/// Why a stylesheet was left pointing at its original address
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SkipReason {
    #[error("unable to resolve reference: {0}")]
    Resolution(#[from] ParseError),
    #[error("unable to fetch {url}: {error}")]
    Fetch { url: String, error: FetchError },
    #[error("unable to save as {name}: {error}")]
    Persist { name: String, error: PersistError },
    #[error("cancelled before it was fetched")]
    Cancelled,
}

/// A stylesheet that could not be relocated
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedResource {
    /// The href as written in the document
    pub href: String,
    pub reason: SkipReason,
}

/// Original href → local name, in the order the hrefs were relocated
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceMapping {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ResourceMapping {
    /// Records a mapping; a second insert for the same href replaces the first
    pub fn insert(&mut self, href: &str, local_name: &str) {
        match self.index.get(href) {
            Some(&i) => self.entries[i].1 = local_name.to_string(),
            None => {
                self.index.insert(href.to_string(), self.entries.len());
                self.entries
                    .push((href.to_string(), local_name.to_string()));
            }
        }
    }

    pub fn get(&self, href: &str) -> Option<&str> {
        self.index
            .get(href)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(href, name)| (href.as_str(), name.as_str()))
    }
}

/// Hands out unique local file names
///
/// A name already taken gets an index inserted before its extension:
/// `a.css`, `a-1.css`, `a-2.css`, … Names differing only in ASCII case
/// count as taken, so they stay distinct on case-insensitive filesystems.
#[derive(Clone, Debug, Default)]
pub struct LocalNames {
    // Lowercased
    taken: HashSet<String>,
}

impl LocalNames {
    /// Creates an allocator where the given names are already in use
    pub fn with_reserved<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LocalNames {
            taken: reserved
                .into_iter()
                .map(|name| Into::<String>::into(name).to_ascii_lowercase())
                .collect(),
        }
    }

    /// Returns a fresh name derived from the final path segment of `href`
    pub fn allocate(&mut self, href: &str) -> String {
        let name = file_name_from_href(href);

        if self.taken.insert(name.to_ascii_lowercase()) {
            return name;
        }

        let (stem, extension) = match name.rfind('.') {
            Some(i) if i > 0 => name.split_at(i),
            _ => (name.as_str(), ""),
        };

        let mut n = 1;
        loop {
            let candidate = format!("{stem}-{n}{extension}");
            if self.taken.insert(candidate.to_ascii_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Shared flag used to stop dispatching further fetches
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of relocating a batch of stylesheets
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relocation {
    pub mapping: ResourceMapping,
    pub skipped: Vec<SkippedResource>,
}

/// Resolves, fetches and persists stylesheets
pub struct Relocator<'a, F: Fetch, P: Persist> {
    base_url: Option<&'a Url>,
    fetcher: &'a F,
    sink: &'a P,
    names: LocalNames,
    jobs: usize,
}

impl<'a, F: Fetch, P: Persist> Relocator<'a, F, P> {
    pub fn new(base_url: Option<&'a Url>, fetcher: &'a F, sink: &'a P) -> Self {
        Relocator {
            base_url,
            fetcher,
            sink,
            names: LocalNames::default(),
            jobs: DEFAULT_JOBS,
        }
    }

    /// Uses the given name allocator, e.g. one with reserved names
    pub fn with_names(mut self, names: LocalNames) -> Self {
        self.names = names;
        self
    }

    /// Sets the size of the worker pool used by [`Relocator::relocate_all`]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Relocates a single stylesheet and returns its local name
    ///
    /// A name is reserved for the href even when the transfer fails.
    pub fn relocate(&mut self, href: &str) -> Result<String, SkipReason> {
        let local_name = self.names.allocate(href);
        self.transfer(href, &local_name)?;
        Ok(local_name)
    }

    /// Relocates a batch of stylesheets on the worker pool
    ///
    /// Duplicate hrefs are transferred once. Names are handed out in the
    /// order of `hrefs` before anything is fetched, and results are merged
    /// in that same order, so the outcome does not depend on which fetch
    /// finishes first. Once `cancel` is set no new fetch starts; the
    /// remaining hrefs are reported as cancelled.
    pub fn relocate_all(&mut self, hrefs: &[String], cancel: &CancellationToken) -> Relocation {
        let mut seen = HashSet::new();
        let jobs: Vec<(&str, String)> = hrefs
            .iter()
            .filter(|href| seen.insert(href.as_str()))
            .map(|href| (href.as_str(), self.names.allocate(href)))
            .collect();

        let results = self.run_jobs(&jobs, cancel);

        let mut relocation = Relocation::default();
        for ((href, local_name), result) in jobs.iter().zip(results) {
            match result {
                Ok(()) => relocation.mapping.insert(href, local_name),
                Err(reason) => {
                    warn!("skipping stylesheet {}: {}", href, reason);
                    relocation.skipped.push(SkippedResource {
                        href: href.to_string(),
                        reason,
                    });
                }
            }
        }

        relocation
    }

    fn run_jobs(
        &self,
        jobs: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Vec<Result<(), SkipReason>> {
        let run = |(href, local_name): &(&str, String)| {
            if cancel.is_cancelled() {
                Err(SkipReason::Cancelled)
            } else {
                self.transfer(href, local_name)
            }
        };

        if self.jobs <= 1 || jobs.len() <= 1 {
            return jobs.iter().map(run).collect();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            // par_iter keeps the input order when collecting
            Ok(pool) => pool.install(|| jobs.par_iter().map(run).collect()),
            Err(e) => {
                warn!("unable to start worker pool, fetching sequentially: {}", e);
                jobs.iter().map(run).collect()
            }
        }
    }

    fn transfer(&self, href: &str, local_name: &str) -> Result<(), SkipReason> {
        let url = resolve_url(self.base_url, href.trim())?;
        debug!("fetching stylesheet {} from {}", href, url);

        let data = self.fetcher.fetch(&url).map_err(|error| SkipReason::Fetch {
            url: url.to_string(),
            error,
        })?;

        self.sink
            .persist(local_name, &data)
            .map_err(|error| SkipReason::Persist {
                name: local_name.to_string(),
                error,
            })?;
        debug!("saved {} as {} ({} bytes)", url, local_name, data.len());

        Ok(())
    }
}
