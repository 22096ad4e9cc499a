//! Probe targets.

use serde::{Deserialize, Serialize};

/// A single service endpoint to check.
///
/// Identity is the `url`. Field names follow the camelCase shape of the
/// local configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub hide_url: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_key: Option<String>,
}

impl Target {
    /// Plain named target with its URL shown.
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            hide_url: false,
            subtitle: None,
            repo_key: None,
        }
    }

    /// Lookup key into the repository map: `repoKey` if set, else the name, lowercased.
    pub fn repo_lookup_key(&self) -> String {
        self.repo_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(&self.name)
            .to_lowercase()
    }
}
