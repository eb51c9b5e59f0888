//! Attribute and tag coercion
//!
//! Attributes are single-valued: a sequence contributes its first element,
//! descending through nested sequences until a scalar is found.
//!
//! Tags are multi-valued: a sequence is flattened exactly one level.
//! Elements that are themselves sequences or mappings are skipped, not
//! descended into.

use crate::error::{GrainError, Result};
use crate::value::Grain;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// A scalar attribute value. Keeps the grain's native type so `false`
/// and `0` survive serialization as booleans and numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(x) => serializer.serialize_f64(*x),
        }
    }
}

/// Result of attribute coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    pub value: Scalar,
    /// The grain was a sequence and only its first element was used.
    pub from_sequence: bool,
}

/// Coerce a grain into a single attribute value.
///
/// Mappings and empty sequences are unsupported. Null and the empty
/// string are reported as missing; every other scalar is returned as-is.
pub fn to_attribute_value(value: &Grain) -> Result<AttributeValue> {
    let from_sequence = matches!(value, Grain::List(_));
    first_scalar(value).map(|value| AttributeValue {
        value,
        from_sequence,
    })
}

fn first_scalar(value: &Grain) -> Result<Scalar> {
    match value {
        Grain::Map(_) => Err(GrainError::unsupported("mapping")),
        Grain::List(items) => match items.first() {
            Some(first) => first_scalar(first),
            None => Err(GrainError::unsupported("empty sequence")),
        },
        Grain::String(s) if s.is_empty() => Err(GrainError::Missing),
        Grain::String(s) => Ok(Scalar::String(s.clone())),
        Grain::Null => Err(GrainError::Missing),
        Grain::Bool(b) => Ok(Scalar::Bool(*b)),
        Grain::Int(i) => Ok(Scalar::Int(*i)),
        Grain::Float(x) => Ok(Scalar::Float(*x)),
    }
}

/// Coerce a grain into a set of tags.
///
/// Null yields an empty set. Mappings are unsupported.
pub fn to_tag_set(value: &Grain) -> Result<BTreeSet<String>> {
    let mut tags = BTreeSet::new();
    match value {
        Grain::Null => {}
        Grain::Map(_) => return Err(GrainError::unsupported("mapping")),
        Grain::List(items) => {
            for item in items {
                if let Some(tag) = scalar_tag(item) {
                    tags.insert(tag);
                }
            }
        }
        other => {
            if let Some(tag) = scalar_tag(other) {
                tags.insert(tag);
            }
        }
    }
    Ok(tags)
}

fn scalar_tag(value: &Grain) -> Option<String> {
    match value {
        Grain::List(_) | Grain::Map(_) | Grain::Null => None,
        Grain::String(s) => Some(s.clone()),
        Grain::Bool(b) => Some(Scalar::Bool(*b).to_string()),
        Grain::Int(i) => Some(Scalar::Int(*i).to_string()),
        Grain::Float(x) => Some(Scalar::Float(*x).to_string()),
    }
}
