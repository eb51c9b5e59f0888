//! Rundeck resource records
//!
//! A record is a flat mapping of field name to value. A handful of names
//! are reserved: they are always derived from required grains and never
//! overwritten by requested grains or static attributes.

use saltgen_grains::Scalar;
use serde::Serialize;
use std::collections::BTreeMap;

pub const HOSTNAME: &str = "hostname";
pub const OS_NAME: &str = "osName";
pub const OS_VERSION: &str = "osVersion";
pub const OS_FAMILY: &str = "osFamily";
pub const OS_ARCH: &str = "osArch";
pub const TAGS: &str = "tags";
pub const USERNAME: &str = "username";
pub const DESCRIPTION: &str = "description";

/// Fields every record carries.
pub const REQUIRED_FIELDS: [&str; 5] = [HOSTNAME, OS_NAME, OS_VERSION, OS_FAMILY, OS_ARCH];

/// Fields that grain requests and static attributes may never set.
pub const RESERVED_FIELDS: [&str; 6] = [HOSTNAME, OS_NAME, OS_VERSION, OS_FAMILY, OS_ARCH, TAGS];

/// Additional fields reserved on the server node record.
pub const SERVER_NODE_RESERVED_FIELDS: [&str; 2] = [USERNAME, DESCRIPTION];

/// Node name of the synthetic server node record.
pub const SERVER_NODE_NAME: &str = "localhost";
pub const SERVER_NODE_DESCRIPTION: &str = "Rundeck server node";

/// Which kind of node a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A minion returned by the Salt Mine
    Minion,
    /// The Rundeck server itself, built from local grains
    ServerNode,
}

impl NodeKind {
    pub fn is_reserved(&self, field: &str) -> bool {
        is_reserved(field)
            || (*self == NodeKind::ServerNode && SERVER_NODE_RESERVED_FIELDS.contains(&field))
    }
}

/// True for names in [`RESERVED_FIELDS`].
pub fn is_reserved(field: &str) -> bool {
    RESERVED_FIELDS.contains(&field)
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Scalar),
    Tags(Vec<String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(Scalar::String(value))
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        FieldValue::Scalar(value)
    }
}

/// One Rundeck node definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Resource {
    fields: BTreeMap<String, FieldValue>,
}

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn tags(&self) -> Option<&[String]> {
        match self.fields.get(TAGS) {
            Some(FieldValue::Tags(tags)) => Some(tags),
            _ => None,
        }
    }
}

/// All generated records keyed by node name.
pub type Resources = BTreeMap<String, Resource>;
