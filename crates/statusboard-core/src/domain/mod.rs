//! Plain data types shared by every stage of a status pass.

pub mod repo;
pub mod status;
pub mod target;

pub use repo::{RepoInfo, RepoMap};
pub use status::{ProbeResult, Status, Tally};
pub use target::Target;
