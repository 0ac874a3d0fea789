/*!
 * Job configuration for a sieve run
 *
 * A run is described by a single TOML file naming the index to scan, the
 * location and plan-type filters, and the output destination. The lookup
 * endpoint template and the index path prefix are configuration too, so the
 * resolver and scanner can be pointed at test endpoints.
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LOOKUP_URL_TEMPLATE, DEFAULT_PATH_PREFIX, EIN_PLACEHOLDER};
use crate::{Result, SieveError};

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Path to the gzip-compressed index document
    pub input_file: PathBuf,

    /// Location filter, matched as a path-segment prefix (e.g. "NY")
    pub location: String,

    /// Plan type matched as an underscore-delimited token in display names
    pub plan_type: String,

    /// Destination for the newline-joined result list
    pub output_file: PathBuf,

    /// Cap on the number of top-level index elements to scan.
    ///
    /// Negative means unlimited. Exact-count semantics: `first_n = 3` scans
    /// exactly three elements, `first_n = 0` scans none.
    #[serde(default = "default_first_n")]
    pub first_n: i64,

    /// When true, the intermediate maps and result list are dumped as
    /// pretty-printed JSON to stdout
    #[serde(default)]
    pub verbose: bool,

    /// URL template for per-EIN lookup documents; must contain `{ein}`
    #[serde(default = "default_lookup_url_template")]
    pub lookup_url_template: String,

    /// Prefix the URL path must carry before the location segment
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    /// Whether to show progress bars during long stages
    #[serde(default = "default_progress")]
    pub progress: bool,
}

// Default value functions for serde
fn default_first_n() -> i64 {
    -1
}

fn default_lookup_url_template() -> String {
    DEFAULT_LOOKUP_URL_TEMPLATE.to_string()
}

fn default_path_prefix() -> String {
    DEFAULT_PATH_PREFIX.to_string()
}

fn default_progress() -> bool {
    true
}

impl JobConfig {
    /// Load a job configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SieveError::io_with_path(e, path))?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field-level constraints that TOML parsing cannot express
    pub fn validate(&self) -> Result<()> {
        if self.location.is_empty() {
            return Err(SieveError::config(
                "'location' must not be empty",
                "Set location to a filter value such as \"NY\"",
            ));
        }
        if self.plan_type.is_empty() {
            return Err(SieveError::config(
                "'plan_type' must not be empty",
                "Set plan_type to a token such as \"PPO\"",
            ));
        }
        if !self.lookup_url_template.contains(EIN_PLACEHOLDER) {
            return Err(SieveError::Template {
                template: self.lookup_url_template.clone(),
            });
        }
        Ok(())
    }
}

/// Builder for constructing a `JobConfig` in code (primarily for tests)
pub struct ConfigBuilder {
    config: JobConfig,
}

impl ConfigBuilder {
    /// Start building with the four required fields
    pub fn new(
        input_file: impl Into<PathBuf>,
        location: impl Into<String>,
        plan_type: impl Into<String>,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config: JobConfig {
                input_file: input_file.into(),
                location: location.into(),
                plan_type: plan_type.into(),
                output_file: output_file.into(),
                first_n: default_first_n(),
                verbose: false,
                lookup_url_template: default_lookup_url_template(),
                path_prefix: default_path_prefix(),
                progress: default_progress(),
            },
        }
    }

    /// Set the element cap
    pub fn first_n(mut self, n: i64) -> Self {
        self.config.first_n = n;
        self
    }

    /// Set verbose dumping
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Set the lookup URL template
    pub fn lookup_url_template(mut self, template: impl Into<String>) -> Self {
        self.config.lookup_url_template = template.into();
        self
    }

    /// Set the index path prefix
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.path_prefix = prefix.into();
        self
    }

    /// Set progress bar visibility
    pub fn progress(mut self, show: bool) -> Self {
        self.config.progress = show;
        self
    }

    /// Finish, validating the assembled configuration
    pub fn build(self) -> Result<JobConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
