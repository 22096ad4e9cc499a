//! Injectable wall clock and random label source.
//!
//! Probe latency and deadlines use Tokio's clock instead, so tests control
//! them with `tokio::time::pause`.

use chrono::{DateTime, Utc};

/// Source of "now" for cache-busting, wildcard labels and report timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn epoch_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of random label suffixes for the wildcard probe.
pub trait LabelSource: Send + Sync {
    /// Six lowercase base-36 characters.
    fn suffix(&self) -> String;
}

/// Random suffixes taken from a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidLabels;

impl LabelSource for UuidLabels {
    fn suffix(&self) -> String {
        let n = (uuid::Uuid::new_v4().as_u128() as u64) % 36u64.pow(6);
        format!("{:0>6}", to_base36(n))
    }
}

/// Lowercase base-36 rendering of an unsigned integer.
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
