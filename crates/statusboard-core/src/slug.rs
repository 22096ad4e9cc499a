//! `owner/repo` extraction from repository references.

use regex::Regex;
use std::sync::OnceLock;

fn github_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^https?://github\.com/([^/]+)/([^/]+?)/?$")
            .expect("static github url pattern")
    })
}

fn bare_slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([^/]+)/([^/]+?)$").expect("static slug pattern"))
}

/// Parse a GitHub HTTPS URL or a bare `owner/repo` slug.
///
/// Returns `None` for anything else; callers treat that as "no repository".
pub fn parse_slug(input: &str) -> Option<String> {
    let s = input.trim();

    [github_url_pattern(), bare_slug_pattern()]
        .into_iter()
        .find_map(|pattern| pattern.captures(s))
        .map(|caps| format!("{}/{}", &caps[1], &caps[2]))
}

/// Best-guess web URL for a slug.
pub fn canonical_url(slug: &str) -> String {
    format!("https://github.com/{}", slug)
}
