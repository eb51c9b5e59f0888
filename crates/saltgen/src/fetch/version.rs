//! Salt release numbers and the targeting keyword they expect
//!
//! Salt renamed the `expr_form` keyword to `tgt_type` in the Nitrogen
//! release (2017.7).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SaltVersion {
    pub major: u32,
    pub minor: u32,
}

impl SaltVersion {
    /// First release that accepts `tgt_type`.
    pub const NITROGEN: SaltVersion = SaltVersion::new(2017, 7);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse the output of `salt-call --version`,
    /// e.g. `salt-call 3006.1 (Sulfur)`.
    pub fn from_version_output(output: &str) -> Result<Self, SaltVersionParseError> {
        output
            .split_whitespace()
            .find(|word| word.starts_with(|c: char| c.is_ascii_digit()))
            .ok_or_else(|| SaltVersionParseError(output.trim().to_string()))?
            .parse()
    }
}

impl fmt::Display for SaltVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized Salt version '{0}'")]
pub struct SaltVersionParseError(String);

impl FromStr for SaltVersion {
    type Err = SaltVersionParseError;

    /// Accepts `3006`, `3006.1`, `2016.11.10` and release candidates such
    /// as `3007.0rc1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SaltVersionParseError(s.to_string());
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(err)?;
        let minor = match parts.next() {
            None => 0,
            Some(part) => {
                let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u32>().map_err(|_| err())?
            }
        };
        Ok(SaltVersion::new(major, minor))
    }
}

/// Keyword used to pass the targeting mode to `mine.get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetingApi {
    #[default]
    TgtType,
    ExprForm,
}

impl TargetingApi {
    pub fn for_version(version: SaltVersion) -> Self {
        if version >= SaltVersion::NITROGEN {
            TargetingApi::TgtType
        } else {
            TargetingApi::ExprForm
        }
    }

    pub fn param_name(&self) -> &'static str {
        match self {
            TargetingApi::TgtType => "tgt_type",
            TargetingApi::ExprForm => "expr_form",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!("3006.1".parse::<SaltVersion>().unwrap(), SaltVersion::new(3006, 1));
        assert_eq!("3006".parse::<SaltVersion>().unwrap(), SaltVersion::new(3006, 0));
        assert_eq!(
            "2016.11.10".parse::<SaltVersion>().unwrap(),
            SaltVersion::new(2016, 11)
        );
        assert_eq!(
            "3007.0rc1".parse::<SaltVersion>().unwrap(),
            SaltVersion::new(3007, 0)
        );
        assert!("Sulfur".parse::<SaltVersion>().is_err());
        assert!("".parse::<SaltVersion>().is_err());
    }

    #[test]
    fn test_version_output() {
        assert_eq!(
            SaltVersion::from_version_output("salt-call 3006.1 (Sulfur)\n").unwrap(),
            SaltVersion::new(3006, 1)
        );
        assert_eq!(
            SaltVersion::from_version_output("salt-call 2016.11.10 (Carbon)").unwrap(),
            SaltVersion::new(2016, 11)
        );
        assert!(SaltVersion::from_version_output("salt-call").is_err());
    }

    #[test]
    fn test_api_selection() {
        assert_eq!(
            TargetingApi::for_version(SaltVersion::new(2017, 7)),
            TargetingApi::TgtType
        );
        assert_eq!(
            TargetingApi::for_version(SaltVersion::new(3006, 1)),
            TargetingApi::TgtType
        );
        assert_eq!(
            TargetingApi::for_version(SaltVersion::new(2016, 11)),
            TargetingApi::ExprForm
        );
        assert_eq!(TargetingApi::ExprForm.param_name(), "expr_form");
    }
}
