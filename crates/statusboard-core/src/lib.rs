//! statusboard core library
//!
//! The data pipeline behind the status board:
//! - resolve the targets to check from built-in defaults, an optional local
//!   override and an optional remote registry
//! - probe every target concurrently with a hard deadline
//! - tally up/slow/down and attach best-effort repository freshness
//!
//! Every optional source can fail without affecting the report beyond the
//! data it would have contributed. Rendering lives in [`render`]; nothing
//! else produces presentation output.

pub mod clock;
pub mod config;
pub mod dedup;
pub mod domain;
pub mod error;
pub mod fakes;
pub mod issue;
pub mod obs;
pub mod pipeline;
pub mod probe;
pub mod reltime;
pub mod render;
pub mod repo_info;
pub mod repos;
pub mod slug;
pub mod sources;
pub mod targets;
pub mod telemetry;

pub use clock::{Clock, LabelSource, SystemClock, UuidLabels};
pub use config::StatusConfig;
pub use dedup::uniq_by;
pub use domain::{ProbeResult, RepoInfo, RepoMap, Status, Tally, Target};
pub use error::{ProbeError, SourceError, SourceResult};
pub use issue::compose_issue_link;
pub use pipeline::{CheckOutcome, Phase, RepoBadge, StatusBoard, StatusReport};
pub use probe::{HttpTransport, Prober, Transport};
pub use reltime::format_relative;
pub use render::render_text;
pub use repo_info::RepoInfoFetcher;
pub use repos::resolve_repo_map;
pub use slug::parse_slug;
pub use sources::{load_sources, Fetcher, HttpFetcher, LocalConfig, RegistryDocument, Sources};
pub use targets::resolve_targets;
pub use telemetry::init_tracing;

/// statusboard version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
