//! Minion configuration
//!
//! saltgen runs next to a Salt minion and reads a few keys from its
//! configuration file (`<config-dir>/minion`). Every other key is ignored.

use crate::error::{Result, SaltgenError};
use saltgen_logging::LogLevel;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default Salt configuration directory.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/salt";

/// Name of the minion configuration file inside the config directory.
pub const MINION_CONFIG_FILE: &str = "minion";

/// Log file used when the configuration does not name one.
pub const DEFAULT_LOGFILE: &str = "/var/log/salt/resource-generator";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MinionConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    #[serde(default)]
    pub resource_generator_logfile: Option<PathBuf>,

    #[serde(default)]
    pub resource_generator_log_level_logfile: Option<String>,

    #[serde(skip)]
    source: PathBuf,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("/")
}

impl Default for MinionConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            resource_generator_logfile: None,
            resource_generator_log_level_logfile: None,
            source: PathBuf::new(),
        }
    }
}

impl MinionConfig {
    /// Path of the minion configuration file inside `config_dir`.
    pub fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(MINION_CONFIG_FILE)
    }

    /// Load `<config_dir>/minion`. The file must exist; it may be empty.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = Self::path_in(config_dir);
        if !path.is_file() {
            return Err(SaltgenError::ConfigurationMissing { path });
        }
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::parse(&content).map_err(|e| SaltgenError::InvalidConfig {
            path: path.clone(),
            message: e.to_string(),
        })?;
        config.source = path;
        Ok(config)
    }

    /// Parse minion configuration YAML. A document with no keys yields
    /// the defaults.
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    /// Log file path with `root_dir` applied.
    pub fn log_file(&self) -> PathBuf {
        let configured = self
            .resource_generator_logfile
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGFILE));
        prepend_root_dir(&self.root_dir, &configured)
    }

    /// Log file level from `resource_generator_log_level_logfile`.
    pub fn log_file_level(&self) -> Result<Option<LogLevel>> {
        self.resource_generator_log_level_logfile
            .as_deref()
            .map(|raw| {
                raw.parse::<LogLevel>()
                    .map_err(|e| SaltgenError::InvalidConfig {
                        path: self.source.clone(),
                        message: e.to_string(),
                    })
            })
            .transpose()
    }
}

/// Re-root `path` under `root_dir` unless it is already inside it.
fn prepend_root_dir(root_dir: &Path, path: &Path) -> PathBuf {
    if path.starts_with(root_dir) {
        return path.to_path_buf();
    }
    let relative = path.strip_prefix("/").unwrap_or(path);
    root_dir.join(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = MinionConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, SaltgenError::ConfigurationMissing { .. }));
        assert_eq!(err.exit_code(), 255);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("minion"), "# master: salt\n").unwrap();
        let config = MinionConfig::load(dir.path()).unwrap();
        assert_eq!(config.root_dir, PathBuf::from("/"));
        assert_eq!(config.log_file(), PathBuf::from(DEFAULT_LOGFILE));
        assert_eq!(config.log_file_level().unwrap(), None);
    }

    #[test]
    fn test_generator_keys() {
        let config = MinionConfig::parse(
            "master: salt.example.com\n\
             id: rundeck01\n\
             resource_generator_logfile: /var/log/rundeck/saltgen.log\n\
             resource_generator_log_level_logfile: debug\n",
        )
        .unwrap();
        assert_eq!(config.log_file(), PathBuf::from("/var/log/rundeck/saltgen.log"));
        assert_eq!(config.log_file_level().unwrap(), Some(LogLevel::Debug));
    }

    #[test]
    fn test_root_dir_prepended() {
        let config = MinionConfig::parse("root_dir: /srv/salt-root\n").unwrap();
        assert_eq!(
            config.log_file(),
            PathBuf::from("/srv/salt-root/var/log/salt/resource-generator")
        );

        let config = MinionConfig::parse(
            "root_dir: /srv/salt-root\nresource_generator_logfile: /srv/salt-root/logs/gen\n",
        )
        .unwrap();
        assert_eq!(config.log_file(), PathBuf::from("/srv/salt-root/logs/gen"));
    }

    #[test]
    fn test_invalid_level() {
        let config = MinionConfig::parse("resource_generator_log_level_logfile: loud\n").unwrap();
        assert!(matches!(
            config.log_file_level(),
            Err(SaltgenError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("minion"), "root_dir: [unterminated\n").unwrap();
        let err = MinionConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, SaltgenError::InvalidConfig { .. }));
    }
}
