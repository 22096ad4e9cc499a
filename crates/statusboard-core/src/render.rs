//! Text presentation of a [`StatusReport`].
//!
//! This is the only module that decides how results look; everything it
//! needs arrives in the report.

use crate::domain::{ProbeResult, Status};
use crate::pipeline::{CheckOutcome, RepoBadge, StatusReport};
use crate::reltime::format_relative;
use chrono::{DateTime, Local, Utc};
use reqwest::Url;
use std::fmt::Write;

/// Text of the live status pill.
pub fn status_pill(result: &ProbeResult, status: Status) -> String {
    match status {
        Status::Up | Status::Slow => format!("{} • {}ms", status, result.elapsed_ms),
        Status::Down => "down • unreachable".to_string(),
    }
}

/// Text of the repository freshness pill.
pub fn repo_pill(badge: &RepoBadge, now: DateTime<Utc>) -> String {
    match badge.pushed_at {
        Some(ts) => format!("repo • {}", format_relative(ts, now)),
        None => "repo • unavailable".to_string(),
    }
}

/// Host plus path/query/fragment, with a bare `/` path omitted.
///
/// Unparseable input falls back to the string minus its `http(s)://` prefix.
pub fn display_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) if u.host_str().is_some() => {
            let mut host = u.host_str().unwrap_or_default().to_string();
            if let Some(port) = u.port() {
                let _ = write!(host, ":{}", port);
            }
            let mut path = u.path().to_string();
            if let Some(q) = u.query() {
                let _ = write!(path, "?{}", q);
            }
            if let Some(f) = u.fragment() {
                let _ = write!(path, "#{}", f);
            }
            if path == "/" {
                host
            } else {
                host + &path
            }
        }
        _ => strip_scheme(url).to_string(),
    }
}

fn strip_scheme(url: &str) -> &str {
    for prefix in ["https://", "http://", "HTTPS://", "HTTP://"] {
        if let Some(rest) = url.strip_prefix(prefix) {
            return rest;
        }
    }
    url
}

/// The line under a card's name: subtitle for hidden targets, URL otherwise.
pub fn url_line(check: &CheckOutcome) -> String {
    if check.target.hide_url {
        check.target.subtitle.clone().unwrap_or_default()
    } else {
        display_url(&check.target.url)
    }
}

/// Footer: check time and, when known, the newest repository push.
pub fn footer(report: &StatusReport, now: DateTime<Utc>) -> String {
    let checked = report
        .checked_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    match report.newest_push {
        Some(ts) => format!(
            "checked: {} • latest repo push: {}",
            checked,
            format_relative(ts, now)
        ),
        None => format!("checked: {}", checked),
    }
}

/// Render one card.
pub fn render_card(check: &CheckOutcome, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", check.target.name);

    let line = url_line(check);
    if !line.is_empty() {
        let _ = writeln!(out, "  {}", line);
    }

    let _ = write!(
        out,
        "  [{}] <{}>",
        status_pill(&check.result, check.status),
        check.target.url
    );
    if let Some(badge) = &check.repo {
        let _ = write!(out, "  [{}] <{}>", repo_pill(badge, now), badge.href);
    }
    out.push('\n');
    out
}

/// Render the whole report: status line, cards, footer.
pub fn render_text(report: &StatusReport, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.summary);
    out.push('\n');
    for check in &report.checks {
        out.push_str(&render_card(check, now));
    }
    out.push('\n');
    let _ = writeln!(out, "{}", footer(report, now));
    out
}
