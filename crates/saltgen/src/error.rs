//! Error types for saltgen

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status when no targeting expression was given.
pub const EXIT_NO_TARGET: u8 = 42;
/// Exit status when the minion configuration file is missing.
pub const EXIT_CONFIG_MISSING: u8 = 255;
/// Exit status for every other fatal error.
pub const EXIT_FAILURE: u8 = 1;

/// Run-level errors. Per-host grain problems never surface here; they are
/// logged by the resource builder and the field is omitted.
#[derive(Error, Debug)]
pub enum SaltgenError {
    #[error("Cannot execute command without defining a target.")]
    NoTarget,

    #[error("Configuration file not found: {}", path.display())]
    ConfigurationMissing { path: PathBuf },

    #[error("Invalid configuration in {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("salt-call executable not found in PATH (use --salt-call to point at it)")]
    SaltCallNotFound,

    #[error("Salt function '{function}' failed: {message}")]
    Fetch { function: String, message: String },

    #[error("Salt function '{function}' returned unreadable output: {source}")]
    InvalidOutput {
        function: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SaltgenError {
    pub fn fetch(function: impl Into<String>, message: impl Into<String>) -> Self {
        SaltgenError::Fetch {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SaltgenError::NoTarget => EXIT_NO_TARGET,
            SaltgenError::ConfigurationMissing { .. } => EXIT_CONFIG_MISSING,
            _ => EXIT_FAILURE,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SaltgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(SaltgenError::NoTarget.exit_code(), 42);
        let missing = SaltgenError::ConfigurationMissing {
            path: PathBuf::from("/etc/salt/minion"),
        };
        assert_eq!(missing.exit_code(), 255);
        assert_eq!(SaltgenError::fetch("mine.get", "boom").exit_code(), 1);
    }

    #[test]
    fn test_display() {
        let err = SaltgenError::fetch("mine.get", "Minion did not return");
        assert_eq!(
            err.to_string(),
            "Salt function 'mine.get' failed: Minion did not return"
        );
        let missing = SaltgenError::ConfigurationMissing {
            path: PathBuf::from("/etc/salt/minion"),
        };
        assert!(missing.to_string().contains("/etc/salt/minion"));
    }
}
