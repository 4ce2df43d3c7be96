//! Snapshot serialization formats

use crate::error::WatchError;
use crate::tree::{Mapping, Node};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Encoding used for the snapshot handed to the command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Bincode,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Bincode => "bincode",
        }
    }

    /// Serialize a tree mapping
    pub fn encode(&self, root: &Mapping) -> Result<Vec<u8>, WatchError> {
        match self {
            OutputFormat::Json => serde_json::to_vec(root)
                .map_err(|e| WatchError::OutputError(format!("JSON encoding failed: {}", e))),
            OutputFormat::Yaml => serde_yaml::to_string(root)
                .map(String::into_bytes)
                .map_err(|e| WatchError::OutputError(format!("YAML encoding failed: {}", e))),
            OutputFormat::Bincode => bincode::serialize(&tagged(root))
                .map_err(|e| WatchError::OutputError(format!("bincode encoding failed: {}", e))),
        }
    }
}

/// Node with an explicit variant tag.
///
/// bincode is not self-describing, so the untagged tree form would encode an
/// empty value and an empty mapping identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum TaggedNode {
    Value(String),
    Branch(BTreeMap<String, TaggedNode>),
}

impl From<&Node> for TaggedNode {
    fn from(node: &Node) -> Self {
        match node {
            Node::Value(value) => TaggedNode::Value(value.clone()),
            Node::Branch(children) => TaggedNode::Branch(tagged(children)),
        }
    }
}

#[cfg(test)]
impl TaggedNode {
    fn into_node(self) -> Node {
        match self {
            TaggedNode::Value(value) => Node::Value(value),
            TaggedNode::Branch(children) => Node::Branch(
                children
                    .into_iter()
                    .map(|(key, child)| (key, child.into_node()))
                    .collect(),
            ),
        }
    }
}

fn tagged(mapping: &Mapping) -> BTreeMap<String, TaggedNode> {
    mapping
        .iter()
        .map(|(key, node)| (key.clone(), TaggedNode::from(node)))
        .collect()
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "bincode" => Ok(OutputFormat::Bincode),
            other => Err(WatchError::ConfigError(format!(
                "Invalid output format: {} (must be 'json', 'yaml' or 'bincode')",
                other
            ))),
        }
    }
}
