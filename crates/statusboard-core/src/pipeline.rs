//! Status pass orchestration.
//!
//! One pass runs through these phases in order:
//! `resolving-targets → probing → tallying → resolving-repos →
//! rendering-repo-info → done`. Probes fan out together and the pass waits
//! for every one of them before tallying. Repository enrichment runs
//! afterwards and only adds badges.

use crate::clock::{Clock, LabelSource, SystemClock, UuidLabels};
use crate::config::StatusConfig;
use crate::dedup::uniq_by;
use crate::domain::{ProbeResult, RepoInfo, RepoMap, Status, Tally, Target};
use crate::obs;
use crate::probe::{HttpTransport, Prober, Transport};
use crate::repo_info::RepoInfoFetcher;
use crate::repos::resolve_repo_map;
use crate::slug::{canonical_url, parse_slug};
use crate::sources::{self, Fetcher, HttpFetcher, LocalConfig, Sources};
use crate::targets::resolve_targets;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Phases of a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    ResolvingTargets,
    Probing,
    Tallying,
    ResolvingRepos,
    RenderingRepoInfo,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ResolvingTargets => "resolving-targets",
            Phase::Probing => "probing",
            Phase::Tallying => "tallying",
            Phase::ResolvingRepos => "resolving-repos",
            Phase::RenderingRepoInfo => "rendering-repo-info",
            Phase::Done => "done",
        }
    }
}

/// Repository freshness badge for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoBadge {
    /// Where the badge links: reported URL, derived GitHub URL, or the raw reference.
    pub href: String,
    pub slug: Option<String>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Result for one target.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub target: Target,
    pub result: ProbeResult,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<RepoBadge>,
}

/// Everything the presentation layer needs from one pass.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub pass_id: String,
    pub checks: Vec<CheckOutcome>,
    pub tally: Tally,
    pub summary: String,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_push: Option<DateTime<Utc>>,
    pub duration_ms: u64,
}

impl StatusReport {
    /// Extra context line for issue reports, when a push time is known.
    pub fn issue_context(&self) -> Option<String> {
        self.newest_push.map(|ts| {
            format!(
                "Most recent repo push: {}",
                ts.to_rfc3339_opts(SecondsFormat::Millis, true)
            )
        })
    }
}

/// Runs status passes.
pub struct StatusBoard {
    config: StatusConfig,
    fetcher: Arc<dyn Fetcher>,
    prober: Prober,
    repo_info: RepoInfoFetcher,
    clock: Arc<dyn Clock>,
    labels: Arc<dyn LabelSource>,
    enrich_repos: bool,
}

impl StatusBoard {
    /// Assemble a board from explicit capabilities.
    pub fn new(
        config: StatusConfig,
        fetcher: Arc<dyn Fetcher>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        labels: Arc<dyn LabelSource>,
    ) -> Self {
        let prober = Prober::new(transport, clock.clone(), config.timeout());
        let repo_info = RepoInfoFetcher::new(fetcher.clone(), &config.repo_api_base);
        Self {
            config,
            fetcher,
            prober,
            repo_info,
            clock,
            labels,
            enrich_repos: true,
        }
    }

    /// Board backed by real HTTP, the system clock and random labels.
    pub fn from_config(config: StatusConfig) -> Result<Self, reqwest::Error> {
        let client = sources::http_client()?;
        let fetcher = HttpFetcher::new(client.clone()).with_timeout(config.timeout());
        Ok(Self::new(
            config,
            Arc::new(fetcher),
            Arc::new(HttpTransport::new(client)),
            Arc::new(SystemClock),
            Arc::new(UuidLabels),
        ))
    }

    /// Skip repository enrichment.
    pub fn without_repos(mut self) -> Self {
        self.enrich_repos = false;
        self
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    /// Run one complete pass. Never fails.
    pub async fn run(&self) -> StatusReport {
        let pass_id = Uuid::new_v4().to_string();
        self.run_pass(pass_id.clone())
            .instrument(obs::pass_span(&pass_id))
            .await
    }

    async fn run_pass(&self, pass_id: String) -> StatusReport {
        let started = Instant::now();

        obs::emit_phase(Phase::ResolvingTargets.as_str());
        let sources = sources::load_sources(self.fetcher.as_ref(), &self.config).await;
        let targets = self.resolve_targets(&sources);

        obs::emit_phase(Phase::Probing.as_str());
        let results = self.probe_all(&targets).await;

        obs::emit_phase(Phase::Tallying.as_str());
        let mut tally = Tally::default();
        let mut checks: Vec<CheckOutcome> = targets
            .into_iter()
            .zip(results)
            .map(|(target, result)| {
                let status = result.status(self.config.warn_ms);
                tally.record(status);
                CheckOutcome {
                    target,
                    result,
                    status,
                    repo: None,
                }
            })
            .collect();

        let newest_push = if self.enrich_repos {
            obs::emit_phase(Phase::ResolvingRepos.as_str());
            let repo_map = resolve_repo_map(&self.config, &sources.local, &sources.registry);
            let infos = self.fetch_repo_infos(&checks, &repo_map).await;

            obs::emit_phase(Phase::RenderingRepoInfo.as_str());
            attach_repo_badges(&mut checks, &repo_map, &infos)
        } else {
            None
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        obs::emit_phase(Phase::Done.as_str());
        obs::emit_pass_finished(tally.up, tally.slow, tally.down, duration_ms);

        StatusReport {
            pass_id,
            checks,
            summary: tally.summary(),
            tally,
            checked_at: self.clock.now(),
            newest_push,
            duration_ms,
        }
    }

    fn resolve_targets(&self, sources: &Sources) -> Vec<Target> {
        let targets = resolve_targets(
            &self.config,
            &sources.local,
            &sources.registry,
            self.clock.as_ref(),
            self.labels.as_ref(),
        );
        obs::emit_targets_resolved(
            targets.len(),
            matches!(
                &sources.local,
                Ok(LocalConfig {
                    targets: Some(_),
                    ..
                })
            ),
            sources.registry.is_ok(),
        );
        targets
    }

    /// Probe every target concurrently; results come back in target order.
    pub async fn probe_all(&self, targets: &[Target]) -> Vec<ProbeResult> {
        let warn_ms = self.config.warn_ms;
        join_all(
            targets
                .iter()
                .map(|t| self.prober.probe_logged(&t.url, warn_ms)),
        )
        .await
    }

    /// Fetch metadata for every distinct repository the targets reference.
    async fn fetch_repo_infos(
        &self,
        checks: &[CheckOutcome],
        repo_map: &RepoMap,
    ) -> HashMap<String, RepoInfo> {
        let needed = uniq_by(
            checks
                .iter()
                .filter_map(|c| repo_map.get(&c.target.repo_lookup_key())),
            |reference| reference.to_string(),
        );

        let infos = join_all(needed.into_iter().map(|r| self.repo_info.fetch(r))).await;

        infos
            .into_iter()
            .filter_map(|info| info.slug.clone().map(|slug| (slug, info)))
            .collect()
    }
}

/// Attach a badge to every target with a repository; return the newest push.
fn attach_repo_badges(
    checks: &mut [CheckOutcome],
    repo_map: &RepoMap,
    infos: &HashMap<String, RepoInfo>,
) -> Option<DateTime<Utc>> {
    let mut newest_push: Option<DateTime<Utc>> = None;

    for check in checks.iter_mut() {
        let Some(reference) = repo_map.get(&check.target.repo_lookup_key()) else {
            continue;
        };

        let slug = parse_slug(reference);
        let info = slug.as_ref().and_then(|s| infos.get(s));
        let pushed_at = info.and_then(|i| i.pushed_at);

        if let Some(ts) = pushed_at {
            newest_push = Some(newest_push.map_or(ts, |n| n.max(ts)));
        }

        let href = info
            .and_then(|i| i.html_url.clone())
            .or_else(|| slug.as_deref().map(canonical_url))
            .unwrap_or_else(|| reference.to_string());

        check.repo = Some(RepoBadge {
            href,
            slug,
            pushed_at,
        });
    }

    newest_push
}
