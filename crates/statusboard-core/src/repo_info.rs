//! Repository freshness lookups against a GitHub-compatible API.

use crate::domain::RepoInfo;
use crate::obs;
use crate::slug::{canonical_url, parse_slug};
use crate::sources::Fetcher;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    #[serde(default)]
    pushed_at: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
}

/// Resolves repository references to [`RepoInfo`], tolerating every failure.
#[derive(Clone)]
pub struct RepoInfoFetcher {
    fetcher: Arc<dyn Fetcher>,
    api_base: String,
}

impl RepoInfoFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher>, api_base: &str) -> Self {
        Self {
            fetcher,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Metadata endpoint for a slug.
    pub fn endpoint(&self, slug: &str) -> String {
        format!("{}/repos/{}", self.api_base, slug)
    }

    /// Look up a reference.
    ///
    /// - unparseable reference: empty info, no request made
    /// - failed or non-success request: slug plus derived URL, no push time
    /// - success: reported push time and URL, derived URL if none reported
    pub async fn fetch(&self, reference: &str) -> RepoInfo {
        let Some(slug) = parse_slug(reference) else {
            debug!(reference = %reference, "unparseable repository reference");
            return RepoInfo::unparseable();
        };
        let derived = canonical_url(&slug);

        let metadata = match self.fetcher.fetch_json(&self.endpoint(&slug)).await {
            Ok(value) => serde_json::from_value::<RepoMetadata>(value).ok(),
            Err(e) => {
                debug!(slug = %slug, error = %e, "repository metadata unavailable");
                None
            }
        };

        let info = match metadata {
            Some(meta) => RepoInfo {
                pushed_at: meta.pushed_at.as_deref().and_then(parse_timestamp),
                html_url: Some(
                    meta.html_url
                        .filter(|u| !u.trim().is_empty())
                        .unwrap_or(derived),
                ),
                slug: Some(slug),
            },
            None => RepoInfo {
                slug: Some(slug),
                pushed_at: None,
                html_url: Some(derived),
            },
        };

        if let Some(slug) = &info.slug {
            obs::emit_repo_fetched(slug, info.pushed_at.is_some());
        }
        info
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
