//! Pre-filled "report an issue" mail link.

use crate::config::StatusConfig;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::fmt::Display;

/// Build a `mailto:` link with subject and body filled in.
///
/// `now` is rendered in its own timezone for the subject and as UTC ISO-8601
/// in the body. `context` is appended as a `Context:` line when present.
pub fn compose_issue_link<Tz>(config: &StatusConfig, now: &DateTime<Tz>, context: Option<&str>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let subject = format!(
        "{} issue report ({})",
        config.brand,
        now.format("%-m/%-d/%Y, %-I:%M:%S %p")
    );
    let body = issue_body(config, &now.with_timezone(&Utc), context);

    format!(
        "mailto:{}?subject={}&body={}",
        config.issue_email,
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

/// Body template. Empty lines are dropped, so an absent context leaves no trace.
pub fn issue_body(config: &StatusConfig, now: &DateTime<Utc>, context: Option<&str>) -> String {
    let time = format!("Time: {}", now.to_rfc3339_opts(SecondsFormat::Millis, true));
    let page = format!("Status page: {}", config.status_page_url);
    let context = context
        .filter(|c| !c.is_empty())
        .map(|c| format!("Context: {}", c))
        .unwrap_or_default();

    [
        "Describe what happened:",
        "",
        "Which URL?",
        "",
        "What did you expect?",
        "",
        "What actually happened?",
        "",
        "—",
        time.as_str(),
        page.as_str(),
        context.as_str(),
    ]
    .into_iter()
    .filter(|line| !line.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}
