//! Status board configuration
//!
//! Every constant the pipeline depends on lives in [`StatusConfig`], which is
//! built once and handed to each component at construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default domain whose services are checked.
pub const DEFAULT_DOMAIN: &str = "buk1t.com";

/// Subdomains that make up the canonical service set.
pub const CANONICAL_SUBDOMAINS: [&str; 6] = ["www", "labs", "search", "status", "about", "api"];

/// Status board configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusConfig {
    /// Domain every default and registry-discovered target lives under
    pub domain: String,
    /// Local override document (file path or http(s) URL)
    pub local_config: String,
    /// Remote registry document URL
    pub registry_url: String,
    /// Probes at or above this latency are classified as slow
    pub warn_ms: u64,
    /// Hard deadline for a single probe
    pub timeout_ms: u64,
    /// Recipient of issue reports
    pub issue_email: String,
    /// Brand used in issue report subjects
    pub brand: String,
    /// Public URL of the status page, quoted in issue reports
    pub status_page_url: String,
    /// Base URL of the repository metadata API
    pub repo_api_base: String,
    /// Registry subdomains outside this set are ignored
    pub canonical_subdomains: Vec<String>,
    /// Baseline subdomain for registry items without one
    pub baseline_subdomain: String,
    /// Service key to repository reference, lowest-precedence layer
    pub fallback_repos: BTreeMap<String, String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            domain: DEFAULT_DOMAIN.to_string(),
            local_config: "status.json".to_string(),
            registry_url: "https://api.buk1t.com/json/buk1t.json".to_string(),
            warn_ms: 900,
            timeout_ms: 5000,
            issue_email: "dev@buk1t.com".to_string(),
            brand: "buk1t".to_string(),
            status_page_url: format!("https://status.{}/", DEFAULT_DOMAIN),
            repo_api_base: "https://api.github.com".to_string(),
            canonical_subdomains: CANONICAL_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            baseline_subdomain: "www".to_string(),
            fallback_repos: default_fallback_repos(),
        }
    }
}

impl StatusConfig {
    /// Set the checked domain
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.trim().to_string();
        self
    }

    /// Set the local override document location
    pub fn with_local_config(mut self, location: &str) -> Self {
        self.local_config = location.to_string();
        self
    }

    /// Set the remote registry URL
    pub fn with_registry_url(mut self, url: &str) -> Self {
        self.registry_url = url.to_string();
        self
    }

    /// Set the slow threshold and probe deadline, both in milliseconds
    pub fn with_thresholds(mut self, warn_ms: u64, timeout_ms: u64) -> Self {
        self.warn_ms = warn_ms;
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the repository metadata API base URL
    pub fn with_repo_api_base(mut self, base: &str) -> Self {
        self.repo_api_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Set the issue report recipient
    pub fn with_issue_email(mut self, email: &str) -> Self {
        self.issue_email = email.to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Canonical URL for a subdomain of the configured domain.
    pub fn service_url(&self, subdomain: &str) -> String {
        format!("https://{}.{}/", subdomain, self.domain)
    }

    pub fn is_canonical(&self, subdomain: &str) -> bool {
        self.canonical_subdomains.iter().any(|s| s == subdomain)
    }
}

fn default_fallback_repos() -> BTreeMap<String, String> {
    [
        ("www", "https://github.com/buk1t/www"),
        ("labs", "https://github.com/buk1t/labs"),
        ("search", "https://github.com/buk1t/search"),
        ("status", "https://github.com/buk1t/status"),
        ("about", "https://github.com/buk1t/about-me"),
        ("api", "https://github.com/buk1t/api"),
        ("wildcard", "https://github.com/buk1t/catch-all"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
