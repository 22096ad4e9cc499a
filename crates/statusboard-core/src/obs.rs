//! Structured observability hooks for status passes.
//!
//! This module provides:
//! - A pass-scoped tracing span via `pass_span`
//! - Emission functions for phase changes, probe completions, degraded
//!   sources, repository lookups and pass completion
//!
//! Events are emitted at `info!`/`debug!` level (filter with `RUST_LOG`).
//! Nothing here writes to the report; logs go to stderr.

use tracing::{debug, info, warn};

/// Span tagging every event of one pass with its id.
///
/// # Example
///
/// ```ignore
/// self.run_pass(pass_id.clone()).instrument(pass_span(&pass_id)).await
/// ```
pub fn pass_span(pass_id: &str) -> tracing::Span {
    tracing::info_span!("statusboard.pass", pass_id = %pass_id)
}

/// Emit event: the pass moved to a new phase.
pub fn emit_phase(phase: &str) {
    debug!(event = "pass.phase", phase = %phase);
}

/// Emit event: targets resolved.
pub fn emit_targets_resolved(count: usize, local_override: bool, registry_loaded: bool) {
    info!(
        event = "targets.resolved",
        count = count,
        local_override = local_override,
        registry_loaded = registry_loaded,
    );
}

/// Emit event: one probe settled.
pub fn emit_probe_finished(url: &str, ok: bool, elapsed_ms: u64, status: &str) {
    debug!(
        event = "probe.finished",
        url = %url,
        ok = ok,
        elapsed_ms = elapsed_ms,
        status = %status,
    );
}

/// Emit event: an optional source could not be used (warning level for
/// remote sources, debug for the local override which is usually absent).
pub fn emit_source_unavailable(source: &str, location: &str, error: &dyn std::fmt::Display) {
    if source == "local_config" {
        debug!(event = "source.unavailable", source = %source, location = %location, error = %error);
    } else {
        warn!(event = "source.unavailable", source = %source, location = %location, error = %error);
    }
}

/// Emit event: repository metadata lookup finished.
pub fn emit_repo_fetched(slug: &str, fresh: bool) {
    debug!(event = "repo.fetched", slug = %slug, fresh = fresh);
}

/// Emit event: pass finished with its tally.
pub fn emit_pass_finished(up: usize, slow: usize, down: usize, duration_ms: u64) {
    info!(
        event = "pass.finished",
        up = up,
        slow = slow,
        down = down,
        duration_ms = duration_ms,
    );
}
