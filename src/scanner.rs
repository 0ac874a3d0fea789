/*!
 * Streaming scanner for the compressed Table-of-Contents index
 *
 * The index is a single JSON object whose `reporting_structure` key holds an
 * array that can run to tens of gigabytes uncompressed. The scanner walks
 * that array element by element through a `DeserializeSeed` visitor driven
 * directly off the gzip stream, so only one `IndexEntry` is ever held in
 * memory. Other top-level keys are skipped without materializing them.
 *
 * Elements whose in-network file URLs pass the location predicate contribute
 * `url -> EIN` pairs to the output map. An element with a matched URL but no
 * EIN-typed reporting plan is a diagnostic, not an error: the URL is dropped
 * and scanning continues.
 */

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use url::Url;

use crate::config::JobConfig;
use crate::constants::REPORTING_STRUCTURE_KEY;
use crate::data_types::{IndexEntry, UrlEinMap};
use crate::{Result, SieveError};

/// Result of one scan pass over the index
#[derive(Debug)]
pub struct ScanOutcome {
    /// Accumulated `url -> EIN` pairs, in first-seen order
    pub urls: UrlEinMap,
    /// Number of top-level elements processed
    pub elements_scanned: u64,
    /// Number of matched URLs dropped because no EIN-typed plan existed
    pub missing_ein: u64,
}

/// Streaming index scanner
pub struct IndexScanner {
    /// Full path prefix a URL must carry, e.g. `/anthem/NY`
    full_prefix: String,
    /// Element cap; `None` means unlimited
    limit: Option<u64>,
    /// Whether to show a progress spinner
    show_progress: bool,
}

impl IndexScanner {
    /// Create a scanner for a location filter under a path prefix
    pub fn new(location: &str, path_prefix: &str) -> Self {
        Self {
            full_prefix: format!("{}{}", path_prefix, location),
            limit: None,
            show_progress: true,
        }
    }

    /// Create a scanner from a job configuration
    pub fn from_config(config: &JobConfig) -> Self {
        Self::new(&config.location, &config.path_prefix)
            .with_limit(config.first_n)
            .with_progress_bar(config.progress)
    }

    /// Cap the number of top-level elements scanned.
    ///
    /// Exact-count semantics: `3` scans exactly three elements, `0` scans
    /// none. Negative means unlimited.
    pub fn with_limit(mut self, first_n: i64) -> Self {
        self.limit = u64::try_from(first_n).ok();
        self
    }

    /// Enable or disable the progress spinner
    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Scan a gzip-compressed index file
    pub fn scan<P: AsRef<Path>>(&self, path: P) -> Result<ScanOutcome> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SieveError::io_with_path(e, path))?;
        let decoder = MultiGzDecoder::new(BufReader::new(file));
        self.scan_reader(BufReader::new(decoder))
    }

    /// Scan an already-decompressed index stream
    pub fn scan_reader<R: Read>(&self, reader: R) -> Result<ScanOutcome> {
        let mut state = ScanState::new(self);
        let mut deserializer = serde_json::Deserializer::from_reader(reader);
        let parsed = DocumentSeed(&mut state).deserialize(&mut deserializer);

        state.progress.finish_and_clear();

        match parsed {
            Ok(()) => {}
            // The limit interrupt surfaces as a deserializer error; the flag
            // distinguishes it from a genuinely malformed document.
            Err(_) if state.interrupted => {}
            Err(e) => return Err(SieveError::malformed_at(state.elements, e.to_string())),
        }

        if self.show_progress {
            println!(
                "Scanned {} index elements, matched {} urls",
                state.elements,
                state.urls.len()
            );
        }
        if state.missing_ein > 0 {
            eprintln!(
                "Warning: dropped {} matched urls with no EIN-typed reporting plan",
                state.missing_ein
            );
        }

        Ok(ScanOutcome {
            urls: state.urls,
            elements_scanned: state.elements,
            missing_ein: state.missing_ein,
        })
    }

    /// Location predicate: path-segment prefix match.
    ///
    /// The path must start with the full prefix and the character after it
    /// must not extend the segment: `/anthem/NY/f.json` and
    /// `/anthem/NY_2024.json.gz` match `NY`, `/anthem/NYLON/f.json` does not.
    fn location_matches(&self, path: &str) -> bool {
        match path.strip_prefix(&self.full_prefix) {
            Some(rest) => !rest
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric()),
            None => false,
        }
    }
}

/// Mutable scan state threaded through the deserializer visitors
struct ScanState<'a> {
    scanner: &'a IndexScanner,
    urls: UrlEinMap,
    elements: u64,
    missing_ein: u64,
    interrupted: bool,
    progress: ProgressBar,
}

impl<'a> ScanState<'a> {
    fn new(scanner: &'a IndexScanner) -> Self {
        let progress = if scanner.show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] Scanning index: {pos} elements")
                    .unwrap(),
            );
            pb
        } else {
            ProgressBar::hidden()
        };
        Self {
            scanner,
            urls: UrlEinMap::new(),
            elements: 0,
            missing_ein: 0,
            interrupted: false,
            progress,
        }
    }

    fn limit_reached(&self) -> bool {
        self.scanner.limit.is_some_and(|n| self.elements >= n)
    }

    /// Process one index element, then drop it
    fn process(&mut self, entry: IndexEntry) {
        for file in &entry.in_network_files {
            let parsed = match Url::parse(&file.location) {
                Ok(url) => url,
                Err(e) => {
                    let location = file.location.clone();
                    self.progress.suspend(|| {
                        eprintln!("Warning: skipping unparsable url '{}': {}", location, e);
                    });
                    continue;
                }
            };

            if !self.scanner.location_matches(parsed.path()) {
                continue;
            }
            // First EIN found for a URL wins
            if self.urls.contains_key(&file.location) {
                continue;
            }

            match entry.first_ein() {
                Some(ein) => {
                    self.urls.insert(file.location.clone(), ein.to_string());
                }
                None => {
                    self.missing_ein += 1;
                    let plans =
                        serde_json::to_string(&entry.reporting_plans).unwrap_or_default();
                    let location = file.location.clone();
                    self.progress.suspend(|| {
                        eprintln!("{}", plans);
                        eprintln!("Could not find EIN value for {}", location);
                    });
                }
            }
        }

        self.elements += 1;
        self.progress.inc(1);
    }
}

/// Seed over the top-level index object
struct DocumentSeed<'a, 'b>(&'a mut ScanState<'b>);

impl<'de> DeserializeSeed<'de> for DocumentSeed<'_, '_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for DocumentSeed<'_, '_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an index object with a '{}' array", REPORTING_STRUCTURE_KEY)
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut found = false;
        while let Some(key) = map.next_key::<String>()? {
            if key == REPORTING_STRUCTURE_KEY {
                map.next_value_seed(ElementsSeed(&mut *self.0))?;
                found = true;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        if !found {
            return Err(de::Error::missing_field(REPORTING_STRUCTURE_KEY));
        }
        Ok(())
    }
}

/// Seed over the `reporting_structure` array, element by element
struct ElementsSeed<'a, 'b>(&'a mut ScanState<'b>);

impl<'de> DeserializeSeed<'de> for ElementsSeed<'_, '_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for ElementsSeed<'_, '_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an array of reporting-structure elements")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        loop {
            if self.0.limit_reached() {
                // Abort the deserializer so the rest of a huge stream is not
                // decompressed; scan_reader translates this back to success.
                self.0.interrupted = true;
                return Err(de::Error::custom("element limit reached"));
            }
            match seq.next_element::<IndexEntry>()? {
                Some(entry) => self.0.process(entry),
                None => break,
            }
        }
        Ok(())
    }
}
