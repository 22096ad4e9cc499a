//! Probe results and their classification.

use serde::{Deserialize, Serialize};

/// Outcome of one reachability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub ok: bool,
    pub elapsed_ms: u64,
}

impl ProbeResult {
    pub fn reachable(elapsed_ms: u64) -> Self {
        Self {
            ok: true,
            elapsed_ms,
        }
    }

    pub fn unreachable(elapsed_ms: u64) -> Self {
        Self {
            ok: false,
            elapsed_ms,
        }
    }

    /// Classify against the slow threshold.
    pub fn status(&self, warn_ms: u64) -> Status {
        Status::classify(self, warn_ms)
    }
}

/// Derived service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Up,
    Slow,
    Down,
}

impl Status {
    pub fn classify(result: &ProbeResult, warn_ms: u64) -> Self {
        if !result.ok {
            Status::Down
        } else if result.elapsed_ms >= warn_ms {
            Status::Slow
        } else {
            Status::Up
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "up",
            Status::Slow => "slow",
            Status::Down => "down",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running up/slow/down counts for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub up: usize,
    pub slow: usize,
    pub down: usize,
}

impl Tally {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Up => self.up += 1,
            Status::Slow => self.slow += 1,
            Status::Down => self.down += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.up + self.slow + self.down
    }

    pub fn all_good(&self) -> bool {
        self.slow == 0 && self.down == 0
    }

    /// One-line summary shown as the report subtitle.
    pub fn summary(&self) -> String {
        if self.all_good() {
            format!("All good — {} up", self.up)
        } else {
            format!("{} up • {} slow • {} down", self.up, self.slow, self.down)
        }
    }
}
