//! Secondary report source: a listing of dated report files.
//!
//! Report files follow `<category-prefix><YYYYMMDD>_<HHMMSS>.json`, so the
//! lexicographically greatest name per prefix is the most recent one.

use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use url::Url;

use crate::core::config::FallbackConfig;
use crate::core::fetch::{get_json, FetchError};

/// Report categories that can be recovered from individual files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportCategory {
    DailyCosts,
    ServiceCosts,
    RegionCosts,
    Forecast,
    RiUtilization,
    SavingsPlans,
}

impl ReportCategory {
    pub fn all() -> &'static [ReportCategory] {
        &[
            Self::DailyCosts,
            Self::ServiceCosts,
            Self::RegionCosts,
            Self::Forecast,
            Self::RiUtilization,
            Self::SavingsPlans,
        ]
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::DailyCosts => "daily_costs_",
            Self::ServiceCosts => "monthly_costs_by_service_",
            Self::RegionCosts => "costs_by_region_",
            Self::Forecast => "cost_forecast_",
            Self::RiUtilization => "ri_utilization_",
            Self::SavingsPlans => "savings_plans_",
        }
    }

    /// Category a report file belongs to, by its name prefix.
    pub fn for_file(name: &str) -> Option<ReportCategory> {
        Self::all()
            .iter()
            .copied()
            .find(|category| name.starts_with(category.prefix()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DailyCosts => "daily costs",
            Self::ServiceCosts => "cost by service",
            Self::RegionCosts => "cost by region",
            Self::Forecast => "forecast",
            Self::RiUtilization => "RI utilization",
            Self::SavingsPlans => "savings plans",
        }
    }

    /// Bundle key the category's report is stored under.
    pub fn bundle_key(&self) -> &'static str {
        match self {
            Self::DailyCosts => "dailyCosts",
            Self::ServiceCosts => "serviceCosts",
            Self::RegionCosts => "regionCosts",
            Self::Forecast => "forecast",
            Self::RiUtilization => "riUtilization",
            Self::SavingsPlans => "savingsPlans",
        }
    }
}

/// Most recent file for `prefix`, by descending lexicographic order of the name.
pub fn select_most_recent<'a>(files: &'a [String], prefix: &str) -> Option<&'a str> {
    files
        .iter()
        .map(String::as_str)
        .filter(|name| name.starts_with(prefix) && name.ends_with(".json"))
        .max()
}

/// A bare file name that cannot escape the account directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// `base_url` extended by `segments`, each percent-encoded as one path segment.
fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = Url::parse(base_url).map_err(|_| FetchError::InvalidUrl(base_url.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Deserialize)]
struct FileListing {
    #[serde(default)]
    files: Vec<ListedFile>,
}

#[derive(Deserialize)]
struct ListedFile {
    name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileIndex {
    Http { base_url: String },
    Dir { root: PathBuf },
    Disabled,
}

impl From<&FallbackConfig> for FileIndex {
    fn from(config: &FallbackConfig) -> Self {
        match config {
            FallbackConfig::Http { base_url } => Self::Http {
                base_url: base_url.trim_end_matches('/').to_string(),
            },
            FallbackConfig::Dir { path } => Self::Dir { root: path.clone() },
            FallbackConfig::Disabled => Self::Disabled,
        }
    }
}

impl FileIndex {
    /// Names of the report files available for `account`.
    pub async fn list(
        &self,
        client: &reqwest::Client,
        account: &str,
    ) -> Result<Vec<String>, FetchError> {
        let names = match self {
            Self::Http { base_url } => {
                let mut url = endpoint(base_url, &["api", "files"])?;
                url.query_pairs_mut().append_pair("account", account);
                let value = get_json(client, url.as_str()).await?;
                let listing: FileListing =
                    serde_json::from_value(value).map_err(|source| FetchError::Parse {
                        origin: url.to_string(),
                        source,
                    })?;
                listing.files.into_iter().filter_map(|f| f.name).collect()
            }
            Self::Dir { root } => {
                let dir = root.join(account);
                let mut entries = tokio::fs::read_dir(&dir)
                    .await
                    .map_err(|source| FetchError::Io { path: dir.clone(), source })?;
                let mut names = Vec::new();
                while let Some(entry) = entries
                    .next_entry()
                    .await
                    .map_err(|source| FetchError::Io { path: dir.clone(), source })?
                {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        names.push(name.to_string());
                    }
                }
                names
            }
            Self::Disabled => Vec::new(),
        };
        Ok(names.into_iter().filter(|n| is_plain_file_name(n)).collect())
    }

    /// Raw JSON content of one listed file.
    pub async fn load(
        &self,
        client: &reqwest::Client,
        account: &str,
        name: &str,
    ) -> Result<Value, FetchError> {
        match self {
            Self::Http { base_url } => {
                let url = endpoint(base_url, &["api", "file", account, name])?;
                get_json(client, url.as_str()).await
            }
            Self::Dir { root } => {
                let path = root.join(account).join(name);
                let content = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FetchError::Io { path: path.clone(), source })?;
                serde_json::from_str(&content).map_err(|source| FetchError::Parse {
                    origin: path.display().to_string(),
                    source,
                })
            }
            Self::Disabled => Err(FetchError::FallbackDisabled),
        }
    }
}
