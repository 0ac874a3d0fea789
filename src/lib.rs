/*!
 * # mrf-sieve — price-transparency index filtering
 *
 * Extracts in-network-rate file URLs from a payer's machine-readable
 * Table-of-Contents index, filtered by location and plan type. Anthem-style
 * indexes run to tens of gigabytes uncompressed, so the scanner streams the
 * gzip'd JSON element by element rather than loading it.
 *
 * ## Pipeline
 *
 * Four stages, strictly sequential:
 *
 * 1. **Scan** — stream the compressed index, collecting `url -> EIN` pairs
 *    for URLs whose path matches the location filter.
 * 2. **Invert** — regroup the pairs as `EIN -> [urls]`.
 * 3. **Resolve** — fetch one small lookup document per EIN and map each
 *    known URL to its display name.
 * 4. **Filter** — keep the URLs whose display name carries the plan type as
 *    an underscore-delimited token.
 *
 * ## Quick Start
 *
 * ```no_run
 * use mrf_sieve::prelude::*;
 *
 * # fn main() -> Result<()> {
 * let config = ConfigBuilder::new("index.json.gz", "NY", "PPO", "urls.txt")
 *     .first_n(-1)
 *     .build()?;
 *
 * let summary = mrf_sieve::pipeline::run(&config)?;
 * println!(
 *     "{} of {} matched urls survived the plan-type filter",
 *     summary.result_urls, summary.urls_matched
 * );
 * # Ok(())
 * # }
 * ```
 *
 * ## Stage-by-stage use
 *
 * Every stage is public, so callers can stop after any of them:
 *
 * ```no_run
 * use mrf_sieve::prelude::*;
 *
 * # fn main() -> Result<()> {
 * let scan = IndexScanner::new("NY", "/anthem/")
 *     .with_limit(1000)
 *     .scan("index.json.gz")?;
 * let by_ein = invert(&scan.urls);
 * println!("{} distinct EINs", by_ein.len());
 * # Ok(())
 * # }
 * ```
 *
 * A run holds no state between invocations: every map is built, handed to
 * the next stage, and dropped.
 */

// Re-export error types from root
pub use error::{Result, SieveError};

// Public modules
pub mod config;
pub mod data_types;
pub mod error;
pub mod export;
pub mod filter;
pub mod invert;
pub mod pipeline;
pub mod resolver;
pub mod scanner;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```
/// use mrf_sieve::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigBuilder, JobConfig};
    pub use crate::data_types::*;
    pub use crate::error::{Result, SieveError};
    pub use crate::export::write_result_list;
    pub use crate::filter::filter_by_plan_type;
    pub use crate::invert::invert;
    pub use crate::pipeline::{run, RunSummary};
    pub use crate::resolver::{DisplayNameResolver, FetchLookup, HttpFetcher, ResolveOutcome};
    pub use crate::scanner::{IndexScanner, ScanOutcome};
}

/// Index format constants
pub mod constants {
    /// Top-level key holding the index's element array
    pub const REPORTING_STRUCTURE_KEY: &str = "reporting_structure";

    /// `plan_id_type` value marking an EIN-keyed reporting plan
    pub const EIN_PLAN_ID_TYPE: &str = "EIN";

    /// Placeholder substituted into the lookup URL template
    pub const EIN_PLACEHOLDER: &str = "{ein}";

    /// Anthem's per-EIN lookup document endpoint
    pub const DEFAULT_LOOKUP_URL_TEMPLATE: &str =
        "https://antm-pt-prod-dataz-nogbd-nophi-us-east1.s3.amazonaws.com/anthem/{ein}.json";

    /// Path prefix carried by Anthem in-network file URLs
    pub const DEFAULT_PATH_PREFIX: &str = "/anthem/";
}
