//! Repository references and freshness metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Freshness metadata for one repository.
///
/// `slug == None` means the reference could not be parsed; nothing else is
/// known and the lookup is not retried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub slug: Option<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub html_url: Option<String>,
}

impl RepoInfo {
    pub fn unparseable() -> Self {
        Self::default()
    }
}

/// Lowercase service key to repository reference (URL or bare slug).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMap(BTreeMap<String, String>);

impl RepoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay entries; later layers win on key collision.
    pub fn overlay<I>(&mut self, layer: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.0.extend(layer);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, String>> for RepoMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        RepoMap(map)
    }
}
