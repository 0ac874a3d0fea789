/*!
 * Data type definitions for price-transparency index records
 *
 * This module contains the typed view of the two document shapes the pipeline
 * consumes (the large Table-of-Contents index and the small per-EIN lookup
 * document) and the intermediate maps handed from stage to stage.
 */

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Mapping from in-network file URL to the EIN recorded for it.
///
/// Built by the scanner. Each URL appears at most once; the first EIN found
/// for a URL wins. Insertion order is first-seen order in the index.
pub type UrlEinMap = IndexMap<String, String>;

/// Mapping from EIN to the ordered, non-empty list of URLs sharing it.
///
/// Built by `invert`, consumed by the resolver. List order is first-seen
/// order from the `UrlEinMap` iteration.
pub type EinUrlsMap = IndexMap<String, Vec<String>>;

/// Mapping from URL to resolved display name.
///
/// Populated only for URLs whose EIN lookup document had a matching entry.
/// URLs with no match are simply absent.
pub type UrlDisplayNameMap = IndexMap<String, String>;

/// Final ordered list of URLs matching the requested plan type.
pub type ResultList = Vec<String>;

/// One element of the index's `reporting_structure` array.
///
/// Read once during scanning and discarded; never retained. Unknown fields
/// (allowed-amount files, version metadata) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexEntry {
    pub in_network_files: Vec<InNetworkFile>,
    pub reporting_plans: Vec<ReportingPlan>,
}

/// An in-network file descriptor inside an index element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InNetworkFile {
    /// Full URL of the negotiated-rates file.
    pub location: String,
}

/// A reporting-plan descriptor inside an index element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingPlan {
    pub plan_id_type: String,
    pub plan_id: String,
}

impl IndexEntry {
    /// Find the first reporting plan keyed by an EIN, if any.
    ///
    /// The index carries plans keyed by other identifier types too; only
    /// `plan_id_type == "EIN"` entries are usable for the lookup stage.
    pub fn first_ein(&self) -> Option<&str> {
        self.reporting_plans
            .iter()
            .find(|plan| plan.plan_id_type == crate::constants::EIN_PLAN_ID_TYPE)
            .map(|plan| plan.plan_id.as_str())
    }
}

/// The per-EIN lookup document shape.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupDocument {
    #[serde(rename = "In-Network Negotiated Rates Files")]
    pub in_network_files: Vec<LookupFile>,
}

/// One entry of a lookup document's negotiated-rates file list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupFile {
    pub url: String,
    pub displayname: String,
}
