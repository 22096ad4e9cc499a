//! Optional JSON sources: the local override document, the remote registry,
//! and the repository metadata API.
//!
//! Every load yields a [`SourceResult`]. Consumers decide explicitly what a
//! failed source contributes (always nothing); no error leaves this layer as
//! a panic or a fatal result.

use crate::config::StatusConfig;
use crate::domain::Target;
use crate::error::{SourceError, SourceResult};
use crate::obs;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("statusboard/", env!("CARGO_PKG_VERSION"));

/// Fetches a JSON document from a location.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch and parse. Non-success HTTP answers are errors.
    async fn fetch_json(&self, location: &str) -> SourceResult<Value>;
}

/// Build the shared HTTP client.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

/// Fetcher for http(s) URLs and local file paths.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Bound every HTTP request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn fetch_http(&self, location: &str) -> SourceResult<Value> {
        let mut request = self
            .client
            .get(location)
            .header(CACHE_CONTROL, "no-store")
            .header(ACCEPT, "application/vnd.github+json, application/json");
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| SourceError::Transport {
            location: location.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| SourceError::Transport {
            location: location.to_string(),
            message: e.to_string(),
        })?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_json(&self, location: &str) -> SourceResult<Value> {
        if is_http(location) {
            self.fetch_http(location).await
        } else {
            let body = tokio::fs::read(location).await?;
            Ok(serde_json::from_slice(&body)?)
        }
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// The operator's local override document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalConfig {
    /// Replacement target list from `checks` or `targets`.
    pub targets: Option<Vec<Target>>,
    /// Raw `repos` object.
    pub repos: Option<Map<String, Value>>,
}

impl LocalConfig {
    pub fn from_value(location: &str, value: Value) -> SourceResult<Self> {
        let Value::Object(mut doc) = value else {
            return Err(SourceError::malformed(location, "expected a JSON object"));
        };

        // `checks` wins over `targets` when both are lists.
        let list = ["checks", "targets"]
            .into_iter()
            .find_map(|key| match doc.remove(key) {
                Some(Value::Array(items)) => Some((key, items)),
                _ => None,
            });

        let targets = match list {
            Some((key, items)) => {
                match serde_json::from_value::<Vec<Target>>(Value::Array(items)) {
                    Ok(targets) => Some(targets),
                    Err(e) => {
                        debug!(location, key, error = %e, "ignoring malformed target list");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(Self {
            targets,
            repos: take_object(&mut doc, "repos"),
        })
    }
}

/// The remote registry document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryDocument {
    /// Raw `items` records.
    pub items: Vec<Value>,
    /// Preferred repository mapping.
    pub repos: Option<Map<String, Value>>,
    /// Older name for the repository mapping, applied after `repos`.
    pub repo_map: Option<Map<String, Value>>,
}

impl RegistryDocument {
    pub fn from_value(location: &str, value: Value) -> SourceResult<Self> {
        let Value::Object(mut doc) = value else {
            return Err(SourceError::malformed(location, "expected a JSON object"));
        };

        let items = match doc.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        Ok(Self {
            items,
            repos: take_object(&mut doc, "repos"),
            repo_map: take_object(&mut doc, "repo_map"),
        })
    }
}

fn take_object(doc: &mut Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    match doc.remove(key) {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Both optional documents, loaded once per pass.
#[derive(Debug)]
pub struct Sources {
    pub local: SourceResult<LocalConfig>,
    pub registry: SourceResult<RegistryDocument>,
}

impl Sources {
    /// Neither document available.
    pub fn unavailable() -> Self {
        Self {
            local: Err(SourceError::malformed("local", "not loaded")),
            registry: Err(SourceError::malformed("registry", "not loaded")),
        }
    }
}

/// Load the local override and the registry concurrently.
pub async fn load_sources(fetcher: &dyn Fetcher, config: &StatusConfig) -> Sources {
    let (local, registry) = tokio::join!(
        load_local_config(fetcher, &config.local_config),
        load_registry(fetcher, &config.registry_url),
    );
    Sources { local, registry }
}

pub async fn load_local_config(fetcher: &dyn Fetcher, location: &str) -> SourceResult<LocalConfig> {
    let result = match fetcher.fetch_json(location).await {
        Ok(value) => LocalConfig::from_value(location, value),
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        obs::emit_source_unavailable("local_config", location, e);
    }
    result
}

pub async fn load_registry(fetcher: &dyn Fetcher, location: &str) -> SourceResult<RegistryDocument> {
    let result = match fetcher.fetch_json(location).await {
        Ok(value) => RegistryDocument::from_value(location, value),
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        obs::emit_source_unavailable("registry", location, e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_local_config_checks_wins_over_targets() {
        let config = LocalConfig::from_value(
            "status.json",
            json!({
                "targets": [{ "name": "a", "url": "https://a.example.org/" }],
                "checks": [{ "name": "b", "url": "https://b.example.org/" }]
            }),
        )
        .unwrap();

        let targets = config.targets.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "b");
    }

    #[test]
    fn test_local_config_targets_when_checks_not_a_list() {
        let config = LocalConfig::from_value(
            "status.json",
            json!({
                "targets": [{ "name": "a", "url": "https://a.example.org/" }],
                "checks": "nope"
            }),
        )
        .unwrap();

        assert_eq!(config.targets.unwrap()[0].name, "a");
    }

    #[test]
    fn test_local_config_malformed_list_is_all_or_nothing() {
        let config = LocalConfig::from_value(
            "status.json",
            json!({
                "targets": [
                    { "name": "a", "url": "https://a.example.org/" },
                    { "name": "missing url" }
                ],
                "repos": { "www": "acme/www" }
            }),
        )
        .unwrap();

        assert!(config.targets.is_none());
        assert!(config.repos.is_some());
    }

    #[test]
    fn test_local_config_empty_list_is_kept() {
        let config = LocalConfig::from_value("status.json", json!({ "checks": [] })).unwrap();
        assert_eq!(config.targets, Some(Vec::new()));
    }

    #[test]
    fn test_local_config_rejects_non_object() {
        let err = LocalConfig::from_value("status.json", json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn test_registry_document_fields() {
        let doc = RegistryDocument::from_value(
            "registry",
            json!({
                "items": [{ "subdomain": "labs" }],
                "repos": { "labs": "acme/labs" },
                "repo_map": ["not", "an", "object"]
            }),
        )
        .unwrap();

        assert_eq!(doc.items.len(), 1);
        assert!(doc.repos.is_some());
        assert!(doc.repo_map.is_none());
    }

    #[test]
    fn test_registry_document_items_default_empty() {
        let doc = RegistryDocument::from_value("registry", json!({ "items": "x" })).unwrap();
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_is_http() {
        assert!(is_http("https://api.buk1t.com/json/buk1t.json"));
        assert!(is_http("HTTP://localhost:8080/status.json"));
        assert!(!is_http("status.json"));
        assert!(!is_http("/etc/statusboard/status.json"));
    }

    #[tokio::test]
    async fn test_http_fetcher_reads_local_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(&path, br#"{"repos": {"www": "acme/www"}}"#).unwrap();

        let fetcher = HttpFetcher::new(http_client().unwrap());
        let location = path.to_string_lossy().to_string();
        let config = load_local_config(&fetcher, &location).await.unwrap();
        assert!(config.targets.is_none());
        assert_eq!(
            config.repos.unwrap().get("www"),
            Some(&Value::String("acme/www".to_string()))
        );
    }

    #[tokio::test]
    async fn test_http_fetcher_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let location = dir.path().join("absent.json").to_string_lossy().to_string();

        let fetcher = HttpFetcher::new(http_client().unwrap());
        let err = fetcher.fetch_json(&location).await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[tokio::test]
    async fn test_http_fetcher_invalid_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let fetcher = HttpFetcher::new(http_client().unwrap());
        let err = fetcher
            .fetch_json(&path.to_string_lossy())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }
}
