use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use crate::data::fetcher::RetryPolicy;
use crate::data::harmonize::RenameMap;

const TORONTO_CKAN: &str = "https://ckan0.cf.opendata.inter.prod-toronto.ca";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Dashboard configuration, read from an optional JSON file.
///
/// Every field has a default, so `{}` is a valid file:
///
/// ```json
/// {
///   "outbreaks": {
///     "catalog_endpoint": "https://ckan0.cf.opendata.inter.prod-toronto.ca",
///     "dataset_id": "outbreaks-in-toronto-healthcare-institutions",
///     "renames": { "version": 1, "renames": { "Causative Agent - 1": "Causative Agent-1" } }
///   },
///   "ltc_summary_path": "covidsummary.csv",
///   "http": { "timeout_secs": 30, "max_attempts": 3, "backoff_ms": 500 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub outbreaks: DatasetSource,
    pub covid_cases: DatasetSource,
    pub ltc_summary_path: PathBuf,
    /// Joined onto the summary when present.
    pub ltc_vaccination_path: Option<PathBuf>,
    pub http: HttpSettings,
}

/// Where a dataset lives and how its columns are harmonized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetSource {
    pub catalog_endpoint: Url,
    pub dataset_id: String,
    #[serde(default)]
    pub renames: RenameMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

impl DatasetSource {
    fn toronto(dataset_id: &str, renames: RenameMap) -> Self {
        Self {
            catalog_endpoint: Url::parse(TORONTO_CKAN).expect("TORONTO_CKAN is a valid URL"),
            dataset_id: dataset_id.to_string(),
            renames,
        }
    }

    pub fn outbreaks_default() -> Self {
        Self::toronto(
            "outbreaks-in-toronto-healthcare-institutions",
            RenameMap::new(
                1,
                &[
                    ("Causative Agent - 1", "Causative Agent-1"),
                    ("Causative Agent - 2", "Causative Agent-2"),
                ],
            ),
        )
    }

    pub fn covid_cases_default() -> Self {
        Self::toronto("covid-19-cases-in-toronto", RenameMap::new(1, &[]))
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            outbreaks: DatasetSource::outbreaks_default(),
            covid_cases: DatasetSource::covid_cases_default(),
            ltc_summary_path: PathBuf::from("covidsummary.csv"),
            ltc_vaccination_path: Some(PathBuf::from("ltc_immunization_data.csv")),
            http: HttpSettings::default(),
        }
    }
}

impl DashboardConfig {
    /// Defaults when `path` is `None`, otherwise the parsed file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        for source in [&config.outbreaks, &config.covid_cases] {
            source
                .renames
                .validate()
                .with_context(|| format!("rename map for '{}'", source.dataset_id))?;
        }
        Ok(config)
    }
}
