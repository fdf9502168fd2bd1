pub mod fallback;

use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::core::config::SourceConfig;
use crate::core::fetch::fallback::{select_most_recent, FileIndex, ReportCategory};
use crate::core::models::report::CostReportBundle;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Failed to parse JSON from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Report from {0} is not a JSON object")]
    NotAnObject(String),
    #[error("Report from {0} has no cost categories")]
    EmptyBundle(String),
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
    #[error("Fallback source is disabled")]
    FallbackDisabled,
}

/// GET `url` and parse the body as JSON. Non-2xx statuses are errors.
pub(crate) async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value, FetchError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_str(&body).map_err(|source| FetchError::Parse {
        origin: url.to_string(),
        source,
    })
}

/// Obtains a cost-report bundle from the primary endpoint, or from report
/// files when the primary is unavailable.
pub struct Fetcher {
    client: reqwest::Client,
    primary_url: String,
    account: String,
    fallback: FileIndex,
}

impl Fetcher {
    pub fn new(source: &SourceConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(source.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self::with_client(
            client,
            source.primary_url.clone(),
            source.account.clone(),
            FileIndex::from(&source.fallback),
        ))
    }

    pub fn with_client(
        client: reqwest::Client,
        primary_url: String,
        account: String,
        fallback: FileIndex,
    ) -> Self {
        Self {
            client,
            primary_url,
            account,
            fallback,
        }
    }

    /// Primary first, then the fallback. `None` when neither yields data.
    pub async fn fetch_bundle(&self) -> Option<CostReportBundle> {
        match self.fetch_primary().await {
            Ok(bundle) => return Some(bundle),
            Err(e) => {
                tracing::info!(error = %e, "primary cost API unavailable, trying report files");
            }
        }
        self.fetch_fallback().await
    }

    pub async fn fetch_primary(&self) -> Result<CostReportBundle, FetchError> {
        let value = get_json(&self.client, &self.primary_url).await?;
        if !value.is_object() {
            return Err(FetchError::NotAnObject(self.primary_url.clone()));
        }
        let bundle: CostReportBundle =
            serde_json::from_value(value).map_err(|source| FetchError::Parse {
                origin: self.primary_url.clone(),
                source,
            })?;
        if bundle.is_empty() {
            return Err(FetchError::EmptyBundle(self.primary_url.clone()));
        }
        Ok(bundle)
    }

    /// Report files currently offered by the fallback source.
    pub async fn list_files(&self) -> Result<Vec<String>, FetchError> {
        self.fallback.list(&self.client, &self.account).await
    }

    /// Rebuild a bundle from the newest file of each category.
    ///
    /// Categories are loaded one after another; a failed file leaves only its
    /// own category empty.
    pub async fn fetch_fallback(&self) -> Option<CostReportBundle> {
        if self.fallback == FileIndex::Disabled {
            tracing::debug!("fallback source disabled");
            return None;
        }

        let files = match self.fallback.list(&self.client, &self.account).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list report files");
                return None;
            }
        };

        let mut entries = serde_json::Map::new();
        let mut matched = 0usize;
        for category in ReportCategory::all() {
            let Some(name) = select_most_recent(&files, category.prefix()) else {
                continue;
            };
            matched += 1;
            match self.fallback.load(&self.client, &self.account, name).await {
                Ok(value) => {
                    tracing::debug!(file = name, "loaded report file");
                    entries.insert(category.bundle_key().to_string(), value);
                }
                Err(e) => {
                    tracing::warn!(file = name, error = %e, "failed to load report file");
                }
            }
        }

        if matched == 0 {
            tracing::warn!(account = %self.account, "no report files found");
            return None;
        }

        let bundle: CostReportBundle = match serde_json::from_value(Value::Object(entries)) {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(error = %e, "failed to assemble bundle from report files");
                return None;
            }
        };
        if bundle.is_empty() {
            return None;
        }
        Some(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    const DAILY: &str = r#"{"ResultsByTime":[{"TimePeriod":{"Start":"2025-07-16"},"Total":{"BlendedCost":{"Amount":"12.50"}}}]}"#;

    fn fetcher(server: &MockServer) -> Fetcher {
        fetcher_with_client(reqwest::Client::new(), server)
    }

    fn fetcher_with_client(client: reqwest::Client, server: &MockServer) -> Fetcher {
        Fetcher::with_client(
            client,
            server.url("/api/latest-data"),
            "account1".to_string(),
            FileIndex::Http {
                base_url: server.base_url(),
            },
        )
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let server = MockServer::start_async().await;
        let primary = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/latest-data");
                then.status(200).body(format!(r#"{{"daily_costs":{}}}"#, DAILY));
            })
            .await;
        let listing = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/files");
                then.status(200).body(r#"{"files":[]}"#);
            })
            .await;

        let bundle = fetcher(&server).fetch_bundle().await.unwrap();
        assert!(bundle.daily_costs.is_some());
        primary.assert_async().await;
        assert_eq!(listing.hits_async().await, 0);
    }

    #[tokio::test]
    async fn primary_500_falls_back_to_latest_files() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/latest-data");
                then.status(500).body(r#"{"error":"boom"}"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/files")
                    .query_param("account", "account1");
                then.status(200).body(
                    r#"{"files":[
                        {"name":"daily_costs_20250101_000000.json"},
                        {"name":"daily_costs_20250716_100000.json"},
                        {"name":"costs_by_region_20250716_100000.json"}
                    ]}"#,
                );
            })
            .await;
        let latest = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/file/account1/daily_costs_20250716_100000.json");
                then.status(200).body(DAILY);
            })
            .await;
        let stale = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/file/account1/daily_costs_20250101_000000.json");
                then.status(200).body(DAILY);
            })
            .await;
        let region = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/file/account1/costs_by_region_20250716_100000.json");
                then.status(404);
            })
            .await;

        let bundle = fetcher(&server).fetch_bundle().await.unwrap();
        assert_eq!(bundle.daily_costs.unwrap().results_by_time.len(), 1);
        // The region file fails; its category alone stays empty.
        assert!(bundle.region_costs.is_none());

        latest.assert_async().await;
        region.assert_async().await;
        assert_eq!(stale.hits_async().await, 0);
    }

    #[tokio::test]
    async fn primary_500_and_no_files_yields_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/latest-data");
                then.status(500).body("{}");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/files");
                then.status(200).body(r#"{"files":[]}"#);
            })
            .await;
        assert!(fetcher(&server).fetch_bundle().await.is_none());
    }

    #[tokio::test]
    async fn empty_primary_bundle_falls_back() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/latest-data");
                then.status(200).body("{}");
            })
            .await;
        let listing = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/files");
                then.status(200)
                    .body(r#"{"files":[{"name":"daily_costs_20250716_100000.json"}]}"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/file/account1/daily_costs_20250716_100000.json");
                then.status(200).body(DAILY);
            })
            .await;

        let f = fetcher(&server);
        let err = f.fetch_primary().await.unwrap_err();
        assert!(matches!(err, FetchError::EmptyBundle(_)));

        let bundle = f.fetch_bundle().await.unwrap();
        assert!(bundle.daily_costs.is_some());
        assert_eq!(listing.hits_async().await, 1);
    }

    #[tokio::test]
    async fn primary_with_both_key_spellings_is_used() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/latest-data");
                then.status(200)
                    .body(format!(r#"{{"dailyCosts":{},"daily_costs":{}}}"#, DAILY, DAILY));
            })
            .await;
        let bundle = fetcher(&server).fetch_primary().await.unwrap();
        assert!(bundle.daily_costs.is_some());
    }

    #[tokio::test]
    async fn primary_timeout_falls_back() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/latest-data");
                then.status(200)
                    .body(format!(r#"{{"dailyCosts":{}}}"#, DAILY))
                    .delay(Duration::from_secs(3));
            })
            .await;
        let listing = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/files");
                then.status(200)
                    .body(r#"{"files":[{"name":"daily_costs_20250716_100000.json"}]}"#);
            })
            .await;
        let file = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/file/account1/daily_costs_20250716_100000.json");
                then.status(200).body(DAILY);
            })
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap();
        let f = fetcher_with_client(client, &server);

        let err = f.fetch_primary().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));

        let bundle = f.fetch_bundle().await.unwrap();
        assert!(bundle.daily_costs.is_some());
        listing.assert_async().await;
        file.assert_async().await;
    }

    #[tokio::test]
    async fn non_object_primary_body_triggers_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/latest-data");
                then.status(200).body("[1,2,3]");
            })
            .await;
        let f = Fetcher::with_client(
            reqwest::Client::new(),
            server.url("/api/latest-data"),
            "account1".to_string(),
            FileIndex::Disabled,
        );

        let err = f.fetch_primary().await.unwrap_err();
        assert!(matches!(err, FetchError::NotAnObject(_)));
        assert!(f.fetch_bundle().await.is_none());
    }

    #[tokio::test]
    async fn unreachable_primary_uses_dir_fallback() {
        let root = tempfile::tempdir().unwrap();
        let account = root.path().join("account1");
        std::fs::create_dir_all(&account).unwrap();
        std::fs::write(account.join("daily_costs_20250716_100000.json"), DAILY).unwrap();
        std::fs::write(account.join("monthly_costs_by_service_20250716_100000.json"), "not json").unwrap();

        // Bind and drop a listener so the port refuses connections.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let f = Fetcher::with_client(
            reqwest::Client::new(),
            format!("http://127.0.0.1:{}/api/latest-data", port),
            "account1".to_string(),
            FileIndex::Dir {
                root: root.path().to_path_buf(),
            },
        );

        let bundle = f.fetch_bundle().await.unwrap();
        assert!(bundle.daily_costs.is_some());
        assert!(bundle.service_costs.is_none());
    }

    #[tokio::test]
    async fn all_selected_files_failing_yields_none() {
        let root = tempfile::tempdir().unwrap();
        let account = root.path().join("account1");
        std::fs::create_dir_all(&account).unwrap();
        std::fs::write(account.join("daily_costs_20250716_100000.json"), "{broken").unwrap();

        let f = Fetcher::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:9/unused".to_string(),
            "account1".to_string(),
            FileIndex::Dir {
                root: root.path().to_path_buf(),
            },
        );
        assert!(f.fetch_fallback().await.is_none());
    }
}
