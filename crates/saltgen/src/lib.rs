//! saltgen: Rundeck resource model source backed by the Salt Mine
//!
//! Fetches grains for a set of targeted minions and turns them into
//! Rundeck node definitions:
//!
//! - [`fetch`]: grain sources (`salt-call` adapter and the [`fetch::FactSource`] seam)
//! - [`builder`]: per-node record construction
//! - [`output`]: YAML rendering of the result

pub mod builder;
pub mod config;
pub mod error;
pub mod fetch;
pub mod mapping;
pub mod output;
pub mod record;
pub mod request;
pub mod statics;

pub use builder::{BuilderConfig, ResourceBuilder};
pub use config::MinionConfig;
pub use error::{Result, SaltgenError};
pub use fetch::{FactSource, MineQuery, SaltCall, Target, TargetMode};
pub use record::{NodeKind, Resource, Resources};
