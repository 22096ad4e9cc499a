//! In-memory fakes for the pipeline's capabilities (testing only)
//!
//! Provides `MemoryFetcher`, `ScriptedTransport`, `FixedClock` and
//! `FixedLabels` that satisfy the trait contracts without touching the
//! network or the wall clock.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Url;
use serde_json::Value;

use crate::clock::{Clock, LabelSource};
use crate::error::{ProbeError, SourceError, SourceResult};
use crate::probe::Transport;
use crate::sources::Fetcher;

// ---------------------------------------------------------------------------
// Clock and labels
// ---------------------------------------------------------------------------

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at_epoch_ms(ms: i64) -> Self {
        FixedClock(Utc.timestamp_millis_opt(ms).single().unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Label source that always returns the same suffix.
#[derive(Debug, Clone)]
pub struct FixedLabels(pub String);

impl FixedLabels {
    pub fn new(suffix: &str) -> Self {
        FixedLabels(suffix.to_string())
    }
}

impl LabelSource for FixedLabels {
    fn suffix(&self) -> String {
        self.0.clone()
    }
}

// ---------------------------------------------------------------------------
// MemoryFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum FakeResponse {
    Json(Value),
    Status(u16),
    Unreachable,
}

/// In-memory document source keyed by location.
///
/// Unknown locations behave like an unreachable host.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: Mutex<HashMap<String, FakeResponse>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` at `location`.
    pub fn with_json(self, location: &str, value: Value) -> Self {
        self.insert(location, FakeResponse::Json(value));
        self
    }

    /// Answer `location` with a non-success HTTP status.
    pub fn with_status(self, location: &str, status: u16) -> Self {
        self.insert(location, FakeResponse::Status(status));
        self
    }

    /// Fail `location` at the transport level.
    pub fn with_unreachable(self, location: &str) -> Self {
        self.insert(location, FakeResponse::Unreachable);
        self
    }

    /// Locations requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn insert(&self, location: &str, response: FakeResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(location.to_string(), response);
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch_json(&self, location: &str) -> SourceResult<Value> {
        self.calls.lock().unwrap().push(location.to_string());
        let response = self.responses.lock().unwrap().get(location).cloned();

        match response {
            Some(FakeResponse::Json(value)) => Ok(value),
            Some(FakeResponse::Status(status)) => Err(SourceError::HttpStatus {
                location: location.to_string(),
                status,
            }),
            Some(FakeResponse::Unreachable) | None => Err(SourceError::Transport {
                location: location.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// Scripted behaviour for one host.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Complete successfully after the delay.
    Reach(Duration),
    /// Fail at the transport level after the delay.
    Fail(Duration),
    /// Never complete.
    Hang,
}

/// Probe transport whose behaviour is scripted per host.
///
/// Delays use `tokio::time::sleep`, so tests should run with paused time.
/// Hosts without a script fail immediately.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, Script>,
    fallback: Option<Script>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, host: &str, script: Script) -> Self {
        self.routes.insert(host.to_string(), script);
        self
    }

    /// Script for hosts without their own route.
    pub fn otherwise(mut self, script: Script) -> Self {
        self.fallback = Some(script);
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn reach(&self, url: &Url) -> Result<(), ProbeError> {
        self.requested.lock().unwrap().push(url.to_string());

        let script = url
            .host_str()
            .and_then(|host| self.routes.get(host).copied())
            .or(self.fallback);

        match script {
            Some(Script::Reach(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Some(Script::Fail(delay)) => {
                tokio::time::sleep(delay).await;
                Err(ProbeError::Transport("connection refused".to_string()))
            }
            Some(Script::Hang) => std::future::pending().await,
            None => Err(ProbeError::Transport("no route to host".to_string())),
        }
    }
}
