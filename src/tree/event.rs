//! Change events applied to the registry tree

use serde::{Deserialize, Serialize};

/// A single change reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// Leaf value written at `path`.
    Set {
        path: String,
        value: String,
        version: Option<u64>,
    },
    /// Key or subtree removed at `path`.
    Delete { path: String, version: Option<u64> },
    /// Directory node without a value. Only its version is tracked.
    Directory { path: String, version: Option<u64> },
}

impl ChangeEvent {
    pub fn set(path: impl Into<String>, value: impl Into<String>, version: Option<u64>) -> Self {
        ChangeEvent::Set {
            path: path.into(),
            value: value.into(),
            version,
        }
    }

    pub fn delete(path: impl Into<String>, version: Option<u64>) -> Self {
        ChangeEvent::Delete {
            path: path.into(),
            version,
        }
    }

    pub fn directory(path: impl Into<String>, version: Option<u64>) -> Self {
        ChangeEvent::Directory {
            path: path.into(),
            version,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ChangeEvent::Set { path, .. }
            | ChangeEvent::Delete { path, .. }
            | ChangeEvent::Directory { path, .. } => path,
        }
    }

    pub fn version(&self) -> Option<u64> {
        match self {
            ChangeEvent::Set { version, .. }
            | ChangeEvent::Delete { version, .. }
            | ChangeEvent::Directory { version, .. } => *version,
        }
    }
}
