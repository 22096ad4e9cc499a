//! End-to-end status pass over in-memory sources and a scripted transport.

use chrono::{TimeZone, Utc};
use serde_json::json;
use statusboard_core::fakes::{FixedClock, FixedLabels, MemoryFetcher, Script, ScriptedTransport};
use statusboard_core::{render_text, Status, StatusBoard, StatusConfig};
use std::sync::Arc;
use std::time::Duration;

const REGISTRY: &str = "https://api.buk1t.com/json/buk1t.json";
const NOW_MS: i64 = 1_760_875_200_000;

fn local_config() -> serde_json::Value {
    json!({
        "targets": [
            { "name": "fast", "url": "https://fast.example.org/" },
            { "name": "sluggish", "url": "https://sluggish.example.org/", "repoKey": "Slow" }
        ],
        "repos": { "fast": "acme/widgets" }
    })
}

fn board(fetcher: Arc<MemoryFetcher>, transport: ScriptedTransport) -> StatusBoard {
    StatusBoard::new(
        StatusConfig::default(),
        fetcher,
        Arc::new(transport),
        Arc::new(FixedClock::at_epoch_ms(NOW_MS)),
        Arc::new(FixedLabels::new("abc123")),
    )
}

fn transport() -> ScriptedTransport {
    ScriptedTransport::new()
        .route("fast.example.org", Script::Reach(Duration::from_millis(100)))
        .route("sluggish.example.org", Script::Reach(Duration::from_millis(950)))
        .otherwise(Script::Hang)
}

#[tokio::test(start_paused = true)]
async fn test_up_slow_down_tally() {
    let fetcher = Arc::new(MemoryFetcher::new().with_json("status.json", local_config()));
    let report = board(fetcher, transport()).run().await;

    assert_eq!(report.checks.len(), 3);
    assert_eq!((report.tally.up, report.tally.slow, report.tally.down), (1, 1, 1));
    assert_eq!(report.summary, "1 up • 1 slow • 1 down");

    let statuses: Vec<Status> = report.checks.iter().map(|c| c.status).collect();
    assert_eq!(statuses, vec![Status::Up, Status::Slow, Status::Down]);

    // the hung wildcard probe is cut off at the deadline
    let wildcard = &report.checks[2];
    assert!(wildcard.target.hide_url);
    assert!((5000..=5001).contains(&wildcard.result.elapsed_ms));
    assert!(report.duration_ms < 5100);
}

#[tokio::test(start_paused = true)]
async fn test_repo_enrichment_is_isolated_per_repository() {
    let pushed = "2026-10-18T08:30:00Z";
    let fetcher = Arc::new(
        MemoryFetcher::new()
            .with_json("status.json", local_config())
            .with_json(REGISTRY, json!({ "repo_map": { "slow": "acme/slow" } }))
            .with_status("https://api.github.com/repos/acme/widgets", 403)
            .with_json(
                "https://api.github.com/repos/acme/slow",
                json!({ "pushed_at": pushed, "html_url": "https://github.com/acme/slow" }),
            ),
    );
    let report = board(fetcher.clone(), transport()).run().await;

    // probe results are untouched by enrichment failures
    assert_eq!(report.summary, "1 up • 1 slow • 1 down");

    let fast = report.checks[0].repo.as_ref().expect("fast has a repo");
    assert_eq!(fast.href, "https://github.com/acme/widgets");
    assert!(fast.pushed_at.is_none());

    let slow = report.checks[1].repo.as_ref().expect("sluggish maps via repoKey");
    assert_eq!(slow.slug.as_deref(), Some("acme/slow"));
    assert!(slow.pushed_at.is_some());

    // wildcard falls back to the built-in mapping; its API call fails
    let wildcard = report.checks[2].repo.as_ref().expect("wildcard has a repo");
    assert_eq!(wildcard.href, "https://github.com/buk1t/catch-all");

    assert_eq!(
        report.newest_push,
        Some(Utc.with_ymd_and_hms(2026, 10, 18, 8, 30, 0).unwrap())
    );
    assert_eq!(
        report.issue_context().as_deref(),
        Some("Most recent repo push: 2026-10-18T08:30:00.000Z")
    );

    // each distinct repository is requested once
    let api_calls: Vec<String> = fetcher
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("https://api.github.com/"))
        .collect();
    assert_eq!(api_calls.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_report_renders_and_serializes() {
    let fetcher = Arc::new(MemoryFetcher::new().with_json("status.json", local_config()));
    let report = board(fetcher, transport()).run().await;

    let now = Utc.timestamp_millis_opt(NOW_MS).unwrap();
    let text = render_text(&report, now);
    assert!(text.starts_with("1 up • 1 slow • 1 down\n"));
    assert!(text.contains("[up • 100ms]") || text.contains("[up • 101ms]"));
    assert!(text.contains("[down • unreachable]"));
    assert!(text.contains("__status-mgxnmo00-abc123.buk1t.com"));
    assert!(text.contains("[repo • unavailable]"));

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["tally"], json!({ "up": 1, "slow": 1, "down": 1 }));
    assert_eq!(value["checks"][0]["target"]["name"], "fast");
    assert_eq!(value["checks"][2]["target"]["hideUrl"], true);
    assert_eq!(value["checks"][1]["status"], "slow");
}

#[tokio::test(start_paused = true)]
async fn test_probes_carry_cache_busting_param() {
    let transport = Arc::new(transport());
    let board = StatusBoard::new(
        StatusConfig::default(),
        Arc::new(MemoryFetcher::new().with_json("status.json", local_config())),
        transport.clone(),
        Arc::new(FixedClock::at_epoch_ms(NOW_MS)),
        Arc::new(FixedLabels::new("abc123")),
    )
    .without_repos();

    board.run().await;

    let requested = transport.requested();
    assert_eq!(requested.len(), 3);
    assert!(requested
        .iter()
        .all(|url| url.ends_with(&format!("?_status={}", NOW_MS))));
}
