/*!
 * Index inversion
 *
 * Reshapes the scanner's `url -> EIN` map into `EIN -> [urls]` so the
 * resolver can issue one lookup per distinct EIN.
 */

use crate::data_types::{EinUrlsMap, UrlEinMap};

/// Group URLs by their EIN, preserving first-seen order.
///
/// Pure and total: every `(url, ein)` pair in the input ends up as exactly
/// one entry in exactly one EIN's list, appended in the input's iteration
/// order. Nothing is deduplicated here; the scanner already guarantees URL
/// uniqueness.
pub fn invert(urls_ein: &UrlEinMap) -> EinUrlsMap {
    let mut ein_urls = EinUrlsMap::new();
    for (url, ein) in urls_ein {
        ein_urls
            .entry(ein.clone())
            .or_insert_with(Vec::new)
            .push(url.clone());
    }
    ein_urls
}
