/*!
 * Plan-type filtering of resolved display names
 *
 * Display names follow an underscore-delimited naming convention
 * (e.g. `2024-01_NY_PPO_in-network`), so a plan type is matched as the
 * token `_{plan_type}_`, never as a bare substring.
 */

use crate::data_types::{ResultList, UrlDisplayNameMap};

/// Select the URLs whose display name carries the plan type as an
/// underscore-delimited token.
///
/// `PPO` matches `2024-01_PPO_innetwork` but not `2024-01_EPPO_innetwork`.
/// Output order follows the input map's iteration order.
pub fn filter_by_plan_type(display_names: &UrlDisplayNameMap, plan_type: &str) -> ResultList {
    let token = format!("_{}_", plan_type);
    display_names
        .iter()
        .filter(|(_, name)| name.contains(&token))
        .map(|(url, _)| url.clone())
        .collect()
}
