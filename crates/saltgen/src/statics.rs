//! Static attributes from `<attr>=<value>` command arguments

use crate::record::is_reserved;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Static attribute name to literal value.
pub type StaticOverrides = BTreeMap<String, String>;

static KWARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([^\d\W][\w.-]*)=(.*)$").expect("static attribute pattern is valid")
});

/// Parse `key=value` tokens into static attributes.
///
/// Tokens that are not `key=value` are skipped with a warning. A value
/// wrapped in matching quotes is unquoted. Keys naming reserved fields are
/// dropped. A later token for the same key wins.
pub fn parse_static_args<S: AsRef<str>>(tokens: &[S]) -> StaticOverrides {
    let mut statics = StaticOverrides::new();
    for token in tokens {
        let token = token.as_ref();
        let Some((key, value)) = split_kwarg(token) else {
            warn!("Ignoring argument '{}': expected <attr>=<value>", token);
            continue;
        };
        if is_reserved(key) {
            debug!("Ignoring static attribute for reserved field '{}'", key);
            continue;
        }
        statics.insert(key.to_string(), unquote(value).to_string());
    }
    statics
}

fn split_kwarg(token: &str) -> Option<(&str, &str)> {
    let captures = KWARG.captures(token)?;
    let key = captures.get(1)?.as_str();
    let value = captures.get(2)?.as_str();
    // `a==b` is a comparison, not an assignment
    if value.starts_with('=') {
        return None;
    }
    Some((key, value))
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_pairs() {
        let statics = parse_static_args(&["color=yellow", "env=prod"]);
        assert_eq!(statics.get("color").map(String::as_str), Some("yellow"));
        assert_eq!(statics.get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn test_quoted_value() {
        let statics = parse_static_args(&["pattern='polka dot'", "shape=\"round square\""]);
        assert_eq!(statics["pattern"], "polka dot");
        assert_eq!(statics["shape"], "round square");
    }

    #[test]
    fn test_mismatched_quotes_kept() {
        let statics = parse_static_args(&["note='half"]);
        assert_eq!(statics["note"], "'half");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let statics = parse_static_args(&["query=a=b"]);
        assert_eq!(statics["query"], "a=b");
    }

    #[test]
    fn test_unicode_value() {
        let statics = parse_static_args(&["color=⋐⊮⊰⟒"]);
        assert_eq!(statics["color"], "⋐⊮⊰⟒");
    }

    #[test]
    fn test_invalid_tokens_skipped() {
        let statics = parse_static_args(&["positional", "1abc=x", "a==b", "=x", "ok.key-1=v"]);
        assert_eq!(statics.len(), 1);
        assert_eq!(statics["ok.key-1"], "v");
    }

    #[test]
    fn test_reserved_keys_dropped() {
        let statics = parse_static_args(&["hostname=evil", "tags=x", "username=root"]);
        assert!(!statics.contains_key("hostname"));
        assert!(!statics.contains_key("tags"));
        assert_eq!(statics["username"], "root");
    }

    #[test]
    fn test_empty_value_allowed() {
        let statics = parse_static_args(&["blank="]);
        assert_eq!(statics["blank"], "");
    }
}
