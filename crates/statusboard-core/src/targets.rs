//! Target resolution.
//!
//! Layering rules:
//! - a local `targets`/`checks` list replaces the defaults wholesale, even when empty
//! - registry subdomains only ever add targets, and only canonical ones
//! - first occurrence of a URL wins
//! - one wildcard-routing target is always appended

use crate::clock::{to_base36, Clock, LabelSource};
use crate::config::StatusConfig;
use crate::dedup::uniq_by;
use crate::domain::Target;
use crate::error::SourceResult;
use crate::sources::{LocalConfig, RegistryDocument};
use serde_json::Value;

/// Repository-map key of the wildcard target.
pub const WILDCARD_REPO_KEY: &str = "wildcard";

/// Built-in targets: one per canonical subdomain.
pub fn default_targets(config: &StatusConfig) -> Vec<Target> {
    config
        .canonical_subdomains
        .iter()
        .map(|sub| Target::new(sub, &config.service_url(sub)))
        .collect()
}

/// Distinct, normalised subdomains named by registry items, first-seen order.
///
/// Items whose `subdomain` is missing or falsy (`null`, `false`, `""`, `0`)
/// count as the baseline subdomain. Anything else is lowercased and trimmed
/// as given, so a blank string normalises to `""` and matches nothing.
pub fn registry_subdomains(doc: &RegistryDocument, config: &StatusConfig) -> Vec<String> {
    let subs = doc.items.iter().map(|item| {
        let raw = match item.get("subdomain") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v != 0.0) => n.to_string(),
            Some(Value::Bool(true)) => "true".to_string(),
            Some(other @ (Value::Array(_) | Value::Object(_))) => other.to_string(),
            _ => config.baseline_subdomain.clone(),
        };
        raw.to_lowercase().trim().to_string()
    });
    uniq_by(subs, |s| s.clone())
}

/// Synthetic target exercising catch-all routing with a never-seen hostname.
pub fn wildcard_target(config: &StatusConfig, clock: &dyn Clock, labels: &dyn LabelSource) -> Target {
    let stamp = to_base36(clock.epoch_ms().max(0) as u64);
    let label = format!("__status-{}-{}", stamp, labels.suffix());
    let host = format!("{}.{}", label, config.domain);

    Target {
        name: "catch-all routing".to_string(),
        url: format!("https://{}/", host),
        hide_url: true,
        subtitle: Some(host),
        repo_key: Some(WILDCARD_REPO_KEY.to_string()),
    }
}

/// Produce the final ordered, deduplicated target list.
///
/// Failed sources contribute nothing; the result always holds at least the
/// defaults (or the local override) plus the wildcard target.
pub fn resolve_targets(
    config: &StatusConfig,
    local: &SourceResult<LocalConfig>,
    registry: &SourceResult<RegistryDocument>,
    clock: &dyn Clock,
    labels: &dyn LabelSource,
) -> Vec<Target> {
    let mut targets = match local {
        Ok(LocalConfig {
            targets: Some(list),
            ..
        }) => list.clone(),
        _ => default_targets(config),
    };

    if let Ok(doc) = registry {
        let discovered = registry_subdomains(doc, config)
            .into_iter()
            .filter(|sub| config.is_canonical(sub))
            .map(|sub| Target::new(&sub, &config.service_url(&sub)));
        targets.extend(discovered);
    }

    let mut targets = uniq_by(targets, |t| t.url.clone());
    targets.push(wildcard_target(config, clock, labels));
    uniq_by(targets, |t| t.url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::fakes::{FixedClock, FixedLabels};
    use serde_json::json;

    fn failed<T>() -> SourceResult<T> {
        Err(SourceError::malformed("test", "simulated failure"))
    }

    fn registry(value: Value) -> SourceResult<RegistryDocument> {
        RegistryDocument::from_value("registry", value)
    }

    fn resolve(
        local: &SourceResult<LocalConfig>,
        registry: &SourceResult<RegistryDocument>,
    ) -> Vec<Target> {
        resolve_targets(
            &StatusConfig::default(),
            local,
            registry,
            &FixedClock::at_epoch_ms(1_760_875_200_000),
            &FixedLabels::new("abc123"),
        )
    }

    #[test]
    fn test_defaults_plus_wildcard_when_sources_fail() {
        let targets = resolve(&failed(), &failed());
        let defaults = default_targets(&StatusConfig::default());

        assert_eq!(targets.len(), defaults.len() + 1);
        assert_eq!(&targets[..defaults.len()], defaults.as_slice());
        assert_eq!(targets.iter().filter(|t| t.hide_url).count(), 1);
    }

    #[test]
    fn test_wildcard_target_shape() {
        let target = wildcard_target(
            &StatusConfig::default(),
            &FixedClock::at_epoch_ms(1_760_875_200_000),
            &FixedLabels::new("abc123"),
        );

        assert_eq!(target.name, "catch-all routing");
        assert_eq!(target.url, "https://__status-mgxnmo00-abc123.buk1t.com/");
        assert_eq!(
            target.subtitle.as_deref(),
            Some("__status-mgxnmo00-abc123.buk1t.com")
        );
        assert!(target.hide_url);
        assert_eq!(target.repo_lookup_key(), "wildcard");
    }

    #[test]
    fn test_local_override_replaces_defaults() {
        let local = LocalConfig::from_value(
            "status.json",
            json!({ "targets": [{ "name": "blog", "url": "https://blog.example.org/" }] }),
        );
        let targets = resolve(&local, &failed());

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name, "blog");
        assert!(targets[1].hide_url);
    }

    #[test]
    fn test_empty_local_list_leaves_only_registry_and_wildcard() {
        let local = LocalConfig::from_value("status.json", json!({ "targets": [] }));

        let targets = resolve(&local, &failed());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "catch-all routing");

        let registry = registry(json!({ "items": [{ "subdomain": "labs" }] }));
        let names: Vec<_> = resolve(&local, &registry)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["labs", "catch-all routing"]);
    }

    #[test]
    fn test_blank_registry_subdomain_adds_nothing() {
        let local = LocalConfig::from_value(
            "status.json",
            json!({ "targets": [{ "name": "blog", "url": "https://blog.example.org/" }] }),
        );
        let registry = registry(json!({ "items": [{ "subdomain": "   " }] }));

        let names: Vec<_> = resolve(&local, &registry)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["blog", "catch-all routing"]);
    }

    #[test]
    fn test_falsy_registry_subdomains_mean_baseline() {
        let config = StatusConfig::default();
        let doc = registry(json!({
            "items": [
                {},
                { "subdomain": null },
                { "subdomain": false },
                { "subdomain": "" },
                { "subdomain": 0 },
                { "subdomain": 7 }
            ]
        }))
        .unwrap();

        assert_eq!(registry_subdomains(&doc, &config), ["www", "7"]);
    }

    #[test]
    fn test_local_without_targets_keeps_defaults() {
        let local = LocalConfig::from_value("status.json", json!({ "repos": {} }));
        let targets = resolve(&local, &failed());
        assert_eq!(targets.len(), 7);
    }

    #[test]
    fn test_registry_labs_lowercased_unknown_dropped() {
        let local = LocalConfig::from_value(
            "status.json",
            json!({ "targets": [{ "name": "blog", "url": "https://blog.example.org/" }] }),
        );
        let registry = registry(json!({
            "items": [{ "subdomain": "LABS" }, { "subdomain": "unknown" }, { "subdomain": " labs " }]
        }));
        let targets = resolve(&local, &registry);

        let labs: Vec<_> = targets.iter().filter(|t| t.name == "labs").collect();
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].url, "https://labs.buk1t.com/");
        assert!(!targets.iter().any(|t| t.name == "unknown"));
        assert_eq!(targets.len(), 3);
    }

    #[test]
    fn test_registry_never_duplicates_defaults() {
        let registry = registry(json!({
            "items": [{ "subdomain": "www" }, { "subdomain": "API" }]
        }));
        let targets = resolve(&failed(), &registry);
        assert_eq!(targets.len(), 7);

        let mut urls: Vec<_> = targets.iter().map(|t| t.url.clone()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), targets.len());
    }

    #[test]
    fn test_registry_missing_subdomain_defaults_to_baseline() {
        let doc = RegistryDocument::from_value(
            "registry",
            json!({ "items": [{}, { "subdomain": null }, { "subdomain": "" }, { "subdomain": "Search" }] }),
        )
        .unwrap();

        assert_eq!(
            registry_subdomains(&doc, &StatusConfig::default()),
            vec!["www".to_string(), "search".to_string()]
        );
    }

    #[test]
    fn test_local_targets_win_over_registry_duplicates() {
        let local = LocalConfig::from_value(
            "status.json",
            json!({ "targets": [{ "name": "Labs (beta)", "url": "https://labs.buk1t.com/" }] }),
        );
        let registry = registry(json!({ "items": [{ "subdomain": "labs" }] }));
        let targets = resolve(&local, &registry);

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name, "Labs (beta)");
    }

    #[test]
    fn test_local_duplicates_collapse() {
        let local = LocalConfig::from_value(
            "status.json",
            json!({ "checks": [
                { "name": "a", "url": "https://a.example.org/" },
                { "name": "a2", "url": "https://a.example.org/" }
            ] }),
        );
        let targets = resolve(&local, &failed());
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name, "a");
    }
}
