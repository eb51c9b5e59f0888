//! Resource builder
//!
//! Turns grain trees into Rundeck node records. For every node:
//!
//! 1. required fields are derived from fixed grains
//! 2. each requested attribute grain becomes one field (`os:family` -> `os_family`)
//! 3. requested tag grains are merged into one sorted `tags` list
//! 4. static attributes are applied on top, never touching reserved fields
//!
//! Problems with a single grain are logged and the field is left out; they
//! never abort the run.

use crate::error::Result;
use crate::fetch::{FactSource, HostId, MineQuery};
use crate::mapping::{map_arch, map_family};
use crate::record::{
    FieldValue, NodeKind, Resource, Resources, DESCRIPTION, HOSTNAME, OS_ARCH, OS_FAMILY,
    OS_NAME, OS_VERSION, SERVER_NODE_DESCRIPTION, SERVER_NODE_NAME, TAGS, USERNAME,
};
use crate::request::without_reserved;
use crate::statics::StaticOverrides;
use saltgen_grains::{
    lookup, lookup_or, to_attribute_value, to_tag_set, FactTree, Grain, GrainError,
    DEFAULT_DELIMITER,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Default user for jobs run on the server node.
pub const DEFAULT_SERVER_NODE_USER: &str = "rundeck";

/// Everything the builder needs for one run.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    delimiter: String,
    attributes: Vec<String>,
    tags: Vec<String>,
    statics: StaticOverrides,
    server_node_user: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            attributes: Vec::new(),
            tags: Vec::new(),
            statics: StaticOverrides::new(),
            server_node_user: DEFAULT_SERVER_NODE_USER.to_string(),
        }
    }
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Grain paths to turn into attributes. Reserved names are dropped.
    pub fn with_attributes(mut self, paths: Vec<String>) -> Self {
        self.attributes = without_reserved(paths);
        self
    }

    /// Grain paths to turn into tags. Reserved names are dropped.
    pub fn with_tags(mut self, paths: Vec<String>) -> Self {
        self.tags = without_reserved(paths);
        self
    }

    /// Static attributes. Reserved names are dropped.
    pub fn with_statics(mut self, statics: StaticOverrides) -> Self {
        self.statics = statics
            .into_iter()
            .filter(|(key, _)| !crate::record::is_reserved(key))
            .collect();
        self
    }

    pub fn with_server_node_user(mut self, user: impl Into<String>) -> Self {
        self.server_node_user = user.into();
        self
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn statics(&self) -> &StaticOverrides {
        &self.statics
    }

    /// Field name for an attribute path: delimiters become underscores.
    pub fn field_name(&self, path: &str) -> String {
        if self.delimiter.is_empty() {
            path.to_string()
        } else {
            path.replace(self.delimiter.as_str(), "_")
        }
    }
}

/// Builds resource records from grains.
#[derive(Debug, Clone, Default)]
pub struct ResourceBuilder {
    config: BuilderConfig,
}

impl ResourceBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Fetch grains from `source` and build every record.
    ///
    /// The server node record is added when `include_server_node` is set.
    /// Fetch failures are fatal; grain problems are not.
    pub fn generate(
        &self,
        source: &dyn FactSource,
        query: &MineQuery,
        include_server_node: bool,
    ) -> Result<Resources> {
        let mine = source.fetch_facts(query)?;
        debug!(
            "Salt Mine function 'mine.get' returned {} minion{}",
            mine.len(),
            if mine.len() == 1 { "" } else { "s" }
        );

        let local = if include_server_node {
            Some(source.local_facts()?)
        } else {
            None
        };

        Ok(self.build(&mine, local.as_ref()))
    }

    /// Build records for fetched minions plus the optional server node.
    pub fn build(
        &self,
        mine: &BTreeMap<HostId, FactTree>,
        local: Option<&FactTree>,
    ) -> Resources {
        let mut resources = Resources::new();

        if let Some(local_grains) = local {
            let user = self.config.server_node_user.as_str();
            let record = self.build_record(
                SERVER_NODE_NAME,
                local_grains,
                NodeKind::ServerNode,
                |grains| server_node_required_fields(user, grains),
            );
            resources.insert(SERVER_NODE_NAME.to_string(), record);
        }

        for (minion, grains) in mine {
            let record = self.build_record(minion, grains, NodeKind::Minion, |grains| {
                minion_required_fields(minion, grains)
            });
            resources.insert(minion.clone(), record);
        }

        if resources.is_empty() {
            warn!("No resources returned.");
        }

        resources
    }

    /// Build a single record.
    ///
    /// `required` derives the reserved fields; nothing later in the
    /// pipeline may overwrite them.
    pub fn build_record<F>(
        &self,
        node: &str,
        grains: &FactTree,
        kind: NodeKind,
        required: F,
    ) -> Resource
    where
        F: FnOnce(&FactTree) -> Resource,
    {
        let mut record = required(grains);

        for (name, value) in self.attributes_for(node, grains, kind) {
            record.set(name, value);
        }

        let tags = self.tags_for(node, grains);
        if !tags.is_empty() {
            record.set(TAGS, FieldValue::Tags(tags.into_iter().collect()));
        }

        for (key, value) in &self.config.statics {
            if kind.is_reserved(key) {
                continue;
            }
            record.set(key.as_str(), value.as_str());
        }

        record
    }

    fn attributes_for(&self, node: &str, grains: &FactTree, kind: NodeKind) -> Vec<(String, FieldValue)> {
        let missing = Grain::String(String::new());
        let mut attributes = Vec::new();

        for path in &self.config.attributes {
            let name = self.config.field_name(path);
            if kind.is_reserved(&name) || kind.is_reserved(path) {
                debug!("Attribute '{}' skipped on {}: reserved field", path, node);
                continue;
            }

            let value = lookup_or(grains, path, &missing, &self.config.delimiter);
            match to_attribute_value(value) {
                Ok(attribute) => {
                    if attribute.from_sequence {
                        warn!(
                            "Minion '{}' grain '{}' is a list. First item will be selected by default.",
                            node, path
                        );
                    }
                    debug!(
                        "Adding attribute for minion: '{}' grain: '{}', attribute: '{}', value: '{}'",
                        node, path, name, attribute.value
                    );
                    attributes.push((name, FieldValue::Scalar(attribute.value)));
                }
                Err(GrainError::Missing) => {
                    warn!(
                        "Requested grain '{}' is not available on minion: {}",
                        path, node
                    );
                }
                Err(GrainError::UnsupportedType { kind }) => {
                    warn!(
                        "Minion '{}' grain '{}' ignored because grain type is unsupported ({}).",
                        node, path, kind
                    );
                }
            }
        }

        attributes
    }

    fn tags_for(&self, node: &str, grains: &FactTree) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();

        for path in &self.config.tags {
            let value = lookup_or(grains, path, &Grain::Null, &self.config.delimiter);
            match to_tag_set(value) {
                Ok(new_tags) if new_tags.is_empty() => {
                    warn!(
                        "Requested grain '{}' is not available on minion: {}",
                        path, node
                    );
                }
                Ok(new_tags) => {
                    for tag in new_tags {
                        debug!(
                            "Adding tag for minion: '{}', grain: '{}', tag: '{}'",
                            node, path, tag
                        );
                        tags.insert(tag);
                    }
                }
                // to_tag_set reports absence as an empty set, so only
                // unsupported types land here
                Err(err) => {
                    warn!(
                        "Tag not added for minion: '{}', grain: '{}' because its data type is not supported ({}).",
                        node, path, err
                    );
                }
            }
        }

        tags
    }
}

/// Required fields of a Salt minion.
///
/// `hostname` comes from `fqdn`, falling back to the minion id.
pub fn minion_required_fields(minion: &str, grains: &FactTree) -> Resource {
    let hostname = match scalar_grain(grains, "fqdn") {
        Some(fqdn) => fqdn,
        None => {
            warn!(
                "Grain 'fqdn' is not available on minion: {}; using the minion id as hostname",
                minion
            );
            minion.to_string()
        }
    };
    os_fields(minion, grains).with(HOSTNAME, hostname)
}

/// Required fields of the synthetic server node.
pub fn server_node_required_fields(user: &str, grains: &FactTree) -> Resource {
    os_fields(SERVER_NODE_NAME, grains)
        .with(HOSTNAME, SERVER_NODE_NAME)
        .with(DESCRIPTION, SERVER_NODE_DESCRIPTION)
        .with(USERNAME, user)
}

fn os_fields(node: &str, grains: &FactTree) -> Resource {
    let kernel = required_grain(node, grains, "kernel");
    let kernel_release = required_grain(node, grains, "kernelrelease");
    let cpuarch = required_grain(node, grains, "cpuarch");

    Resource::new()
        .with(OS_NAME, kernel.as_str())
        .with(OS_VERSION, kernel_release)
        .with(OS_FAMILY, map_family(&kernel))
        .with(OS_ARCH, map_arch(&cpuarch))
}

fn required_grain(node: &str, grains: &FactTree, name: &str) -> String {
    scalar_grain(grains, name).unwrap_or_else(|| {
        warn!(
            "Required grain '{}' is not available on minion: {}",
            name, node
        );
        String::new()
    })
}

fn scalar_grain(grains: &FactTree, name: &str) -> Option<String> {
    let value = lookup(grains, name, DEFAULT_DELIMITER)?;
    to_attribute_value(value)
        .ok()
        .map(|attribute| attribute.value.to_string())
}
