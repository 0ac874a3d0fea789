/*!
 * Display-name resolution via per-EIN lookup documents
 *
 * Each distinct EIN from the inverted index has a small JSON document at a
 * templated URL listing that employer's negotiated-rates files with
 * human-readable display names. The resolver fetches one document per EIN,
 * sequentially, and records display names for the URLs the scan already
 * matched.
 *
 * A failed fetch or an unparsable document is isolated to its EIN: those
 * URLs are skipped, the failure is recorded in the outcome, and the run
 * continues. There is no retry.
 */

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::JobConfig;
use crate::constants::EIN_PLACEHOLDER;
use crate::data_types::{EinUrlsMap, LookupDocument, UrlDisplayNameMap};
use crate::{Result, SieveError};

/// Fetches a lookup document from a URL.
///
/// The seam between the resolver and the network; tests substitute an
/// in-memory implementation.
pub trait FetchLookup {
    fn fetch(&self, url: &str) -> Result<LookupDocument>;
}

/// Blocking HTTP fetcher backed by a reused reqwest client
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a 60 second request timeout
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(format!("mrf-sieve/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl FetchLookup for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<LookupDocument> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SieveError::Http {
                message: format!("HTTP {} fetching lookup document", status),
                url: Some(url.to_string()),
            });
        }
        Ok(response.json::<LookupDocument>()?)
    }
}

/// One EIN whose lookup could not be completed
#[derive(Debug)]
pub struct ResolveFailure {
    pub ein: String,
    /// Number of scanned URLs left unresolved by this failure
    pub url_count: usize,
    pub error: SieveError,
}

/// Result of a resolve pass
#[derive(Debug)]
pub struct ResolveOutcome {
    /// `url -> display name`, in EIN-major then lookup-document order
    pub display_names: UrlDisplayNameMap,
    /// EINs whose lookup failed, in input order
    pub failures: Vec<ResolveFailure>,
}

/// Sequential per-EIN display-name resolver
pub struct DisplayNameResolver<F: FetchLookup> {
    fetcher: F,
    url_template: String,
    show_progress: bool,
}

impl DisplayNameResolver<HttpFetcher> {
    /// Create an HTTP-backed resolver from a job configuration
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        Self::new(HttpFetcher::new()?, config.lookup_url_template.as_str())
            .map(|r| r.with_progress_bar(config.progress))
    }
}

impl<F: FetchLookup> DisplayNameResolver<F> {
    /// Create a resolver over any fetcher and a `{ein}` URL template
    pub fn new(fetcher: F, url_template: impl Into<String>) -> Result<Self> {
        let url_template = url_template.into();
        if !url_template.contains(EIN_PLACEHOLDER) {
            return Err(SieveError::Template {
                template: url_template,
            });
        }
        Ok(Self {
            fetcher,
            url_template,
            show_progress: true,
        })
    }

    /// Enable or disable the progress bar
    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Resolve display names for every EIN in the map.
    ///
    /// Failures do not abort the pass; they are returned in the outcome and
    /// summarized on stderr.
    pub fn resolve(&self, ein_urls: &EinUrlsMap) -> ResolveOutcome {
        let progress = if self.show_progress {
            let pb = ProgressBar::new(ein_urls.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} EINs ({eta})")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut display_names = UrlDisplayNameMap::new();
        let mut failures = Vec::new();

        for (ein, urls) in ein_urls {
            let lookup_url = self.url_template.replace(EIN_PLACEHOLDER, ein);
            match self.fetcher.fetch(&lookup_url) {
                Ok(document) => {
                    for file in document.in_network_files {
                        if urls.contains(&file.url) {
                            display_names.insert(file.url, file.displayname);
                        }
                    }
                }
                Err(error) => {
                    failures.push(ResolveFailure {
                        ein: ein.clone(),
                        url_count: urls.len(),
                        error,
                    });
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();

        if !failures.is_empty() {
            eprintln!(
                "Warning: lookup failed for {} of {} EINs:",
                failures.len(),
                ein_urls.len()
            );
            for failure in &failures {
                eprintln!(
                    "  EIN {} ({} urls skipped): {}",
                    failure.ein, failure.url_count, failure.error
                );
            }
        }

        ResolveOutcome {
            display_names,
            failures,
        }
    }
}
