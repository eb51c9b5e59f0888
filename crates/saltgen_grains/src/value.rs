//! The grain value tree

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All grains reported by one minion, keyed by top-level grain name.
pub type FactTree = BTreeMap<String, Grain>;

/// A single grain value.
///
/// Deserializes from the JSON emitted by `salt-call --out=json` (or any
/// other self-describing format) without a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Grain {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Grain>),
    Map(BTreeMap<String, Grain>),
}

impl Grain {
    /// Short type name used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Grain::Null => "null",
            Grain::Bool(_) => "boolean",
            Grain::Int(_) => "integer",
            Grain::Float(_) => "float",
            Grain::String(_) => "string",
            Grain::List(_) => "sequence",
            Grain::Map(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Grain::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Grain::Null)
    }
}

impl From<&str> for Grain {
    fn from(value: &str) -> Self {
        Grain::String(value.to_string())
    }
}

impl From<String> for Grain {
    fn from(value: String) -> Self {
        Grain::String(value)
    }
}

impl From<bool> for Grain {
    fn from(value: bool) -> Self {
        Grain::Bool(value)
    }
}

impl From<i64> for Grain {
    fn from(value: i64) -> Self {
        Grain::Int(value)
    }
}

impl From<f64> for Grain {
    fn from(value: f64) -> Self {
        Grain::Float(value)
    }
}

impl<T: Into<Grain>> From<Vec<T>> for Grain {
    fn from(values: Vec<T>) -> Self {
        Grain::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_salt_json() {
        let json = r#"{
            "fqdn": "web01.example.com",
            "num_cpus": 4,
            "mem_total": 1.5,
            "virtual": false,
            "master": null,
            "ipv4": ["10.0.0.1", "127.0.0.1"],
            "os_info": {"family": "RedHat", "release": 9}
        }"#;
        let tree: FactTree = serde_json::from_str(json).unwrap();

        assert_eq!(tree["fqdn"], Grain::from("web01.example.com"));
        assert_eq!(tree["num_cpus"], Grain::Int(4));
        assert_eq!(tree["mem_total"], Grain::Float(1.5));
        assert_eq!(tree["virtual"], Grain::Bool(false));
        assert!(tree["master"].is_null());
        assert_eq!(tree["ipv4"], Grain::from(vec!["10.0.0.1", "127.0.0.1"]));
        match &tree["os_info"] {
            Grain::Map(map) => assert_eq!(map["release"], Grain::Int(9)),
            other => panic!("expected mapping, got {}", other.kind()),
        }
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = "colors:\n  - red\n  - blue\nnested:\n  - [oboe, flute]\n  - violin\n";
        let tree: FactTree = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(tree["colors"].kind(), "sequence");
        match &tree["nested"] {
            Grain::List(items) => assert_eq!(items[0], Grain::from(vec!["oboe", "flute"])),
            other => panic!("expected sequence, got {}", other.kind()),
        }
    }

    #[test]
    fn test_large_unsigned_falls_back_to_float() {
        let tree: FactTree = serde_json::from_str(r#"{"big": 18446744073709551615}"#).unwrap();
        assert_eq!(tree["big"].kind(), "float");
    }
}
