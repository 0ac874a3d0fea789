/*!
 * Pipeline orchestration
 *
 * Wires the four stages in their fixed order — scan, invert, resolve,
 * filter — and writes the result list. Each stage hands its map to the next
 * by value; nothing is shared or retained across stage boundaries.
 */

use serde::Serialize;

use crate::config::JobConfig;
use crate::export::write_result_list;
use crate::filter::filter_by_plan_type;
use crate::invert::invert;
use crate::resolver::{DisplayNameResolver, FetchLookup};
use crate::scanner::IndexScanner;
use crate::Result;

/// Counters describing a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub elements_scanned: u64,
    pub urls_matched: usize,
    pub missing_ein: u64,
    pub eins: usize,
    pub urls_resolved: usize,
    pub lookup_failures: usize,
    pub result_urls: usize,
}

/// Run the full pipeline with the HTTP-backed resolver.
pub fn run(config: &JobConfig) -> Result<RunSummary> {
    let resolver = DisplayNameResolver::from_config(config)?;
    run_with_resolver(config, &resolver)
}

/// Run the full pipeline with an injected resolver.
///
/// Lets tests drive the whole pipeline without network access.
pub fn run_with_resolver<F: FetchLookup>(
    config: &JobConfig,
    resolver: &DisplayNameResolver<F>,
) -> Result<RunSummary> {
    config.validate()?;

    let scan = IndexScanner::from_config(config).scan(&config.input_file)?;
    if config.verbose {
        dump(&scan.urls);
    }

    let ein_urls = invert(&scan.urls);
    if config.verbose {
        dump(&ein_urls);
    }

    let resolved = resolver.resolve(&ein_urls);

    let results = filter_by_plan_type(&resolved.display_names, &config.plan_type);
    if config.verbose {
        dump(&results);
    }

    write_result_list(&config.output_file, &results)?;

    Ok(RunSummary {
        elements_scanned: scan.elements_scanned,
        urls_matched: scan.urls.len(),
        missing_ein: scan.missing_ein,
        eins: ein_urls.len(),
        urls_resolved: resolved.display_names.len(),
        lookup_failures: resolved.failures.len(),
        result_urls: results.len(),
    })
}

/// Pretty-print an intermediate value to stdout
fn dump<T: Serialize>(value: &T) {
    if let Ok(text) = serde_json::to_string_pretty(value) {
        println!("{}", text);
    }
}
