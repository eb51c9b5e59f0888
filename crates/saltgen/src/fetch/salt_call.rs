//! `salt-call` backed grain source
//!
//! Runs `salt-call --out=json` synchronously. Salt wraps every return in
//! `{"local": <payload>}`.

use super::version::{SaltVersion, TargetingApi};
use super::{FactSource, HostId, MineQuery};
use crate::error::{Result, SaltgenError};
use saltgen_grains::{FactTree, Grain};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

const MINE_GET: &str = "mine.get";
const GRAINS_ITEMS: &str = "grains.items";

/// Locate the salt-call executable: an explicit path wins, then `PATH`.
pub fn locate(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => which::which("salt-call").map_err(|_| SaltgenError::SaltCallNotFound),
    }
}

/// Grain source that shells out to `salt-call`.
#[derive(Debug, Clone)]
pub struct SaltCall {
    program: PathBuf,
    config_dir: PathBuf,
    api: TargetingApi,
}

impl SaltCall {
    /// Create a source. Without a `version` the installed release is
    /// probed with `salt-call --version`.
    pub fn new(program: PathBuf, config_dir: PathBuf, version: Option<SaltVersion>) -> Self {
        let api = match version {
            Some(version) => TargetingApi::for_version(version),
            None => detect_api(&program),
        };
        debug!(
            "Using {} for Salt targeting ({})",
            api.param_name(),
            program.display()
        );
        Self {
            program,
            config_dir,
            api,
        }
    }

    pub fn api(&self) -> TargetingApi {
        self.api
    }

    /// Arguments for a `mine.get` call.
    pub fn mine_args(&self, query: &MineQuery) -> Vec<String> {
        let mut args = self.base_args();
        args.push(MINE_GET.to_string());
        // Keyword form keeps targets containing `=` from being read as kwargs
        args.push(format!("tgt={}", query.target.as_arg()));
        args.push(format!("fun={}", query.function));
        args.push(format!("{}={}", self.api.param_name(), query.mode.as_str()));
        args.push(format!(
            "exclude_minion={}",
            if query.exclude_local { "True" } else { "False" }
        ));
        args
    }

    fn base_args(&self) -> Vec<String> {
        vec![
            "--out=json".to_string(),
            "--log-level=quiet".to_string(),
            format!("--config-dir={}", self.config_dir.display()),
        ]
    }

    fn call(&self, function: &str, args: &[String]) -> Result<Grain> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| {
                SaltgenError::fetch(
                    function,
                    format!("failed to run {}: {}", self.program.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SaltgenError::fetch(
                function,
                format!("salt-call exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        parse_local_return(function, &output.stdout)
    }
}

impl FactSource for SaltCall {
    fn fetch_facts(&self, query: &MineQuery) -> Result<BTreeMap<HostId, FactTree>> {
        debug!(
            "Calling {} with target: '{}' type: '{}'",
            MINE_GET, query.target, query.mode
        );
        let payload = self.call(MINE_GET, &self.mine_args(query))?;
        mine_payload_to_hosts(payload)
    }

    fn local_facts(&self) -> Result<FactTree> {
        let mut args = self.base_args();
        args.push(GRAINS_ITEMS.to_string());
        match self.call(GRAINS_ITEMS, &args)? {
            Grain::Map(grains) => Ok(grains),
            other => Err(SaltgenError::fetch(
                GRAINS_ITEMS,
                format!("expected a mapping of grains, got {}", other.kind()),
            )),
        }
    }
}

fn detect_api(program: &Path) -> TargetingApi {
    let output = match Command::new(program).arg("--version").output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            warn!(
                "salt-call --version exited with {}; assuming tgt_type targeting",
                output.status
            );
            return TargetingApi::default();
        }
        Err(e) => {
            warn!("Could not run salt-call --version ({}); assuming tgt_type targeting", e);
            return TargetingApi::default();
        }
    };

    let text = String::from_utf8_lossy(&output.stdout);
    match SaltVersion::from_version_output(&text) {
        Ok(version) => {
            debug!("Detected Salt version {}", version);
            TargetingApi::for_version(version)
        }
        Err(e) => {
            warn!("{}; assuming tgt_type targeting", e);
            TargetingApi::default()
        }
    }
}

/// Extract the payload from `salt-call --out=json` output.
pub fn parse_local_return(function: &str, stdout: &[u8]) -> Result<Grain> {
    let mut wrapper: BTreeMap<String, Grain> =
        serde_json::from_slice(stdout).map_err(|source| SaltgenError::InvalidOutput {
            function: function.to_string(),
            source,
        })?;
    wrapper
        .remove("local")
        .ok_or_else(|| SaltgenError::fetch(function, "no 'local' key in salt-call output"))
}

/// Split a `mine.get` payload into per-minion grain trees.
///
/// A payload that is not a mapping (Salt reports errors as strings) is a
/// fetch failure. Minions whose entry is not a mapping are skipped.
pub fn mine_payload_to_hosts(payload: Grain) -> Result<BTreeMap<HostId, FactTree>> {
    let minions = match payload {
        Grain::Map(minions) => minions,
        Grain::String(message) => return Err(SaltgenError::fetch(MINE_GET, message)),
        other => {
            return Err(SaltgenError::fetch(
                MINE_GET,
                format!("expected a mapping of minions, got {}", other.kind()),
            ))
        }
    };

    let mut hosts = BTreeMap::new();
    for (minion, grains) in minions {
        match grains {
            Grain::Map(grains) => {
                hosts.insert(minion, grains);
            }
            other => warn!(
                "Minion '{}' skipped: mine data is {} instead of a grain mapping",
                minion,
                other.kind()
            ),
        }
    }
    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Target, TargetMode};

    fn query(exclude_local: bool) -> MineQuery {
        MineQuery {
            target: Target::parse("web01,web02", TargetMode::List),
            mode: TargetMode::List,
            function: "grains.items".to_string(),
            exclude_local,
        }
    }

    fn source(version: SaltVersion) -> SaltCall {
        SaltCall::new(
            PathBuf::from("/usr/bin/salt-call"),
            PathBuf::from("/etc/salt"),
            Some(version),
        )
    }

    #[test]
    fn test_mine_args_modern() {
        let salt = source(SaltVersion::new(3006, 1));
        assert_eq!(
            salt.mine_args(&query(true)),
            vec![
                "--out=json",
                "--log-level=quiet",
                "--config-dir=/etc/salt",
                "mine.get",
                "tgt=web01,web02",
                "fun=grains.items",
                "tgt_type=list",
                "exclude_minion=True",
            ]
        );
    }

    #[test]
    fn test_mine_args_legacy() {
        let salt = source(SaltVersion::new(2016, 11));
        assert_eq!(salt.api(), TargetingApi::ExprForm);
        let args = salt.mine_args(&query(false));
        assert!(args.contains(&"expr_form=list".to_string()));
        assert!(args.contains(&"exclude_minion=False".to_string()));
    }

    #[test]
    fn test_mine_args_target_with_equals() {
        let salt = source(SaltVersion::new(3006, 1));
        let query = MineQuery {
            target: Target::parse("I@role=web", TargetMode::Compound),
            mode: TargetMode::Compound,
            function: "grains.items".to_string(),
            exclude_local: false,
        };
        let args = salt.mine_args(&query);
        assert!(args.contains(&"tgt=I@role=web".to_string()));
        assert!(args.contains(&"fun=grains.items".to_string()));
        assert!(!args.contains(&"I@role=web".to_string()));
    }

    #[test]
    fn test_parse_local_return() {
        let payload = parse_local_return("grains.items", br#"{"local": {"os": "RedHat"}}"#).unwrap();
        assert_eq!(payload.kind(), "mapping");

        let err = parse_local_return("grains.items", br#"{"web01": {}}"#).unwrap_err();
        assert!(matches!(err, SaltgenError::Fetch { .. }));

        let err = parse_local_return("grains.items", b"not json").unwrap_err();
        assert!(matches!(err, SaltgenError::InvalidOutput { .. }));
    }

    #[test]
    fn test_mine_payload_split() {
        let payload: Grain = serde_json::from_str(
            r#"{"web01": {"fqdn": "web01.example.com"}, "broken": "mine function not found"}"#,
        )
        .unwrap();
        let hosts = mine_payload_to_hosts(payload).unwrap();
        assert_eq!(hosts.len(), 1);
        assert!(hosts.contains_key("web01"));
    }

    #[test]
    fn test_mine_payload_error_string() {
        let err = mine_payload_to_hosts(Grain::from("'mine.get' is not available.")).unwrap_err();
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn test_empty_mine_is_ok() {
        let hosts = mine_payload_to_hosts(Grain::Map(BTreeMap::new())).unwrap();
        assert!(hosts.is_empty());
    }
}
