//! Repository map resolution.
//!
//! Layers, lowest precedence first: built-in fallback, local `repos`,
//! registry `repos`, registry `repo_map`.

use crate::config::StatusConfig;
use crate::domain::RepoMap;
use crate::error::SourceResult;
use crate::sources::{LocalConfig, RegistryDocument};
use serde_json::{Map, Value};

/// Lowercase/trim keys, trim values, drop empties and non-string values.
pub fn normalize_repos(raw: &Map<String, Value>) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|(k, v)| {
            let key = k.to_lowercase().trim().to_string();
            let val = v.as_str()?.trim().to_string();
            (!key.is_empty() && !val.is_empty()).then_some((key, val))
        })
        .collect()
}

/// Merge every available layer over the fallback mapping.
pub fn resolve_repo_map(
    config: &StatusConfig,
    local: &SourceResult<LocalConfig>,
    registry: &SourceResult<RegistryDocument>,
) -> RepoMap {
    let mut repos = RepoMap::from(config.fallback_repos.clone());

    if let Ok(LocalConfig {
        repos: Some(raw), ..
    }) = local
    {
        repos.overlay(normalize_repos(raw));
    }

    if let Ok(doc) = registry {
        for raw in [&doc.repos, &doc.repo_map].into_iter().flatten() {
            repos.overlay(normalize_repos(raw));
        }
    }

    repos
}
