//! Resource document serialization

use crate::error::Result;
use crate::record::Resources;

/// Render resources as a block-style YAML document.
///
/// An empty set renders as `{}`.
pub fn to_yaml(resources: &Resources) -> Result<String> {
    Ok(serde_yaml::to_string(resources)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldValue, Resource, HOSTNAME, TAGS};
    use saltgen_grains::Scalar;

    #[test]
    fn test_empty_document() {
        assert_eq!(to_yaml(&Resources::new()).unwrap(), "{}\n");
    }

    #[test]
    fn test_document_layout() {
        let mut resources = Resources::new();
        resources.insert(
            "web01".into(),
            Resource::new()
                .with(HOSTNAME, "web01.example.com")
                .with("num_cpus", Scalar::Int(4))
                .with(TAGS, FieldValue::Tags(vec!["blue".into(), "red".into()])),
        );

        assert_eq!(
            to_yaml(&resources).unwrap(),
            "web01:\n  hostname: web01.example.com\n  num_cpus: 4\n  tags:\n  - blue\n  - red\n"
        );
    }

    #[test]
    fn test_unicode_values_are_plain() {
        let mut resources = Resources::new();
        resources.insert(
            "web01".into(),
            Resource::new().with("unicode", "⋐⊮⊰⟒").with("quoted", "yes"),
        );

        let yaml = to_yaml(&resources).unwrap();
        assert!(!yaml.contains("!!"));
        assert!(yaml.contains("⋐⊮⊰⟒"));

        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["web01"]["unicode"].as_str(), Some("⋐⊮⊰⟒"));
        assert_eq!(parsed["web01"]["quoted"].as_str(), Some("yes"));
    }
}
