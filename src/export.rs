/*!
 * Result output
 *
 * The pipeline's one artifact: a plain text file with one URL per line.
 */

use std::path::Path;

use crate::data_types::ResultList;
use crate::{Result, SieveError};

/// Write the result list as newline-joined text with no trailing newline.
pub fn write_result_list<P: AsRef<Path>>(path: P, urls: &ResultList) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, urls.join("\n")).map_err(|e| SieveError::io_with_path(e, path))
}
