//! Bounded-time reachability probes.
//!
//! "Reachable" means the transport completed a request without error before
//! the deadline. HTTP status codes are never inspected; a 404 counts as up.

use crate::clock::Clock;
use crate::domain::ProbeResult;
use crate::error::ProbeError;
use crate::obs;
use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Query parameter carrying the cache-busting timestamp.
pub const CACHE_BUST_PARAM: &str = "_status";

/// Issues the underlying request for a probe.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Complete one request to `url`. Any answer at all is success.
    async fn reach(&self, url: &Url) -> Result<(), ProbeError>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn reach(&self, url: &Url) -> Result<(), ProbeError> {
        self.client
            .get(url.clone())
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        Ok(())
    }
}

/// Set `_status=<epoch_ms>` on `url`, replacing any previous value.
pub fn cache_busted(url: &str, epoch_ms: i64) -> Result<Url, ProbeError> {
    let mut parsed = Url::parse(url).map_err(|e| ProbeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != CACHE_BUST_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(CACHE_BUST_PARAM, &epoch_ms.to_string());

    Ok(parsed)
}

/// `elapsed` rounded to the nearest millisecond, halves rounding up.
pub fn whole_millis(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

/// Runs single probes with a hard deadline.
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl Prober {
    pub fn new(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            transport,
            clock,
            timeout,
        }
    }

    /// Probe `url`. Never fails; every failure mode is `ok = false`.
    ///
    /// Latency is measured from just before the request to completion or
    /// cancellation.
    pub async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();
        let outcome = self.try_probe(url).await;
        let elapsed_ms = whole_millis(start.elapsed());

        match outcome {
            Ok(()) => ProbeResult::reachable(elapsed_ms),
            Err(e) => {
                debug!(url = %url, error = %e, "probe failed");
                ProbeResult::unreachable(elapsed_ms)
            }
        }
    }

    async fn try_probe(&self, url: &str) -> Result<(), ProbeError> {
        let target = cache_busted(url, self.clock.epoch_ms())?;

        // Dropping the timed-out future aborts the in-flight request.
        tokio::time::timeout(self.timeout, self.transport.reach(&target))
            .await
            .map_err(|_| ProbeError::TimedOut(self.timeout.as_millis() as u64))?
    }

    /// Probe and classify, emitting a `probe.finished` event.
    pub async fn probe_logged(&self, url: &str, warn_ms: u64) -> ProbeResult {
        let result = self.probe(url).await;
        obs::emit_probe_finished(
            url,
            result.ok,
            result.elapsed_ms,
            result.status(warn_ms).as_str(),
        );
        result
    }
}
