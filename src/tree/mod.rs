//! Registry Tree
//!
//! In-memory reconstruction of a store subtree as a nested mapping. Change
//! events are merged one at a time; the tree tracks the highest store version
//! it has seen so a watch can resume right after it.

pub mod event;
pub mod path;

pub use event::ChangeEvent;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use path::split_key;

/// Children of a tree node, keyed by path segment.
pub type Mapping = BTreeMap<String, Node>;

/// A tree entry: either a leaf value or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Value(String),
    Branch(Mapping),
}

impl Node {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Node::Value(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Mapping> {
        match self {
            Node::Branch(mapping) => Some(mapping),
            Node::Value(_) => None,
        }
    }
}

/// Registry tree plus the highest version merged into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    root: Mapping,
    version: Option<u64>,
}

impl Tree {
    /// Empty tree with no known version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty tree seeded with a resume version.
    pub fn with_version(version: Option<u64>) -> Self {
        Self {
            root: Mapping::new(),
            version,
        }
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Highest version seen so far, or the seeded version.
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn into_root(self) -> Mapping {
        self.root
    }

    /// Look up the node stored at a key path.
    pub fn get(&self, key: &str) -> Option<&Node> {
        let segments = split_key(key);
        let (last, parents) = segments.split_last()?;

        let mut cursor = &self.root;
        for segment in parents {
            cursor = cursor.get(*segment)?.as_branch()?;
        }
        cursor.get(*last)
    }

    /// Merge one event. Returns true when the mapping changed.
    ///
    /// The tracked version becomes `max(current, event.version)`; events
    /// without a version leave it untouched.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        if let Some(version) = event.version() {
            self.version = Some(self.version.map_or(version, |current| current.max(version)));
        }

        match event {
            ChangeEvent::Set { path, value, .. } => self.set(path, value),
            ChangeEvent::Delete { path, .. } => self.delete(path),
            ChangeEvent::Directory { .. } => false,
        }
    }

    /// Merge a batch left to right. Returns the number of events that changed
    /// the mapping.
    pub fn apply_all<'a, I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = &'a ChangeEvent>,
    {
        events
            .into_iter()
            .filter(|event| self.apply(event))
            .count()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        let segments = split_key(key);
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };

        let mut cursor = &mut self.root;
        for segment in parents {
            let entry = cursor
                .entry((*segment).to_string())
                .or_insert_with(|| Node::Branch(Mapping::new()));
            // A scalar in the middle of a path is promoted to a mapping.
            if let Node::Value(_) = entry {
                *entry = Node::Branch(Mapping::new());
            }
            let Node::Branch(next) = entry else {
                return false;
            };
            cursor = next;
        }

        cursor.insert((*last).to_string(), Node::Value(value.to_string()));
        true
    }

    fn delete(&mut self, key: &str) -> bool {
        let segments = split_key(key);
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };

        let mut cursor = &mut self.root;
        for segment in parents {
            match cursor.get_mut(*segment) {
                Some(Node::Branch(next)) => cursor = next,
                _ => return false,
            }
        }

        cursor.remove(*last).is_some()
    }
}
