//! Grain sources
//!
//! The resource builder only sees [`FactSource`]. How grains are fetched
//! (and which Salt calling convention is used) is an adapter detail.

pub mod salt_call;
pub mod version;

pub use salt_call::SaltCall;
pub use version::{SaltVersion, TargetingApi};

use crate::error::Result;
use saltgen_grains::FactTree;
use std::collections::BTreeMap;
use std::fmt;

/// Minion id as reported by the Salt Mine.
pub type HostId = String;

/// Supplies grains for targeted minions and for the local node.
pub trait FactSource {
    /// Fetch grains for every minion matched by `query`.
    fn fetch_facts(&self, query: &MineQuery) -> Result<BTreeMap<HostId, FactTree>>;

    /// Grains of the node this process runs on.
    fn local_facts(&self) -> Result<FactTree>;
}

/// Salt targeting modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    #[default]
    Glob,
    Pcre,
    List,
    Grain,
    GrainPcre,
    Nodegroup,
    Range,
    Compound,
    Pillar,
    PillarPcre,
    Ipcidr,
}

impl TargetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMode::Glob => "glob",
            TargetMode::Pcre => "pcre",
            TargetMode::List => "list",
            TargetMode::Grain => "grain",
            TargetMode::GrainPcre => "grain_pcre",
            TargetMode::Nodegroup => "nodegroup",
            TargetMode::Range => "range",
            TargetMode::Compound => "compound",
            TargetMode::Pillar => "pillar",
            TargetMode::PillarPcre => "pillar_pcre",
            TargetMode::Ipcidr => "ipcidr",
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A targeting expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Expression(String),
    List(Vec<String>),
}

impl Target {
    /// Interpret the raw target argument for `mode`.
    ///
    /// List targets are split on commas (spaces removed) or, when there is
    /// no comma, on whitespace.
    pub fn parse(raw: &str, mode: TargetMode) -> Self {
        if mode != TargetMode::List {
            return Target::Expression(raw.to_string());
        }
        let names: Vec<String> = if raw.contains(',') {
            raw.replace(' ', "")
                .split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            raw.split_whitespace().map(str::to_string).collect()
        };
        Target::List(names)
    }

    /// Form passed on the salt-call command line.
    pub fn as_arg(&self) -> String {
        match self {
            Target::Expression(expr) => expr.clone(),
            Target::List(names) => names.join(","),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_arg())
    }
}

/// One Salt Mine request.
#[derive(Debug, Clone)]
pub struct MineQuery {
    pub target: Target,
    pub mode: TargetMode,
    /// Mine function (or alias) holding the grains, e.g. `grains.items`
    pub function: String,
    /// Leave the local minion out of the results
    pub exclude_local: bool,
}
