//! Store Connection
//!
//! Interface to the remote registry. A connection answers "what changed under
//! this path since version V", either immediately (baseline read) or as a
//! long-poll bounded by a timeout.

pub mod etcd;
pub mod scripted;

pub use etcd::{EtcdClient, EtcdConnector};
pub use scripted::{ScriptedConnector, ScriptedStore};

use crate::error::StoreError;
use crate::tree::ChangeEvent;
use async_trait::async_trait;
use std::time::Duration;

/// Action reported by the store for a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeAction {
    Get,
    Set,
    Create,
    Update,
    CompareAndSwap,
    Delete,
    Expire,
    CompareAndDelete,
    Other(String),
}

impl NodeAction {
    pub fn parse(action: &str) -> Self {
        match action {
            "get" => NodeAction::Get,
            "set" => NodeAction::Set,
            "create" => NodeAction::Create,
            "update" => NodeAction::Update,
            "compareAndSwap" => NodeAction::CompareAndSwap,
            "delete" => NodeAction::Delete,
            "expire" => NodeAction::Expire,
            "compareAndDelete" => NodeAction::CompareAndDelete,
            other => NodeAction::Other(other.to_string()),
        }
    }

    /// True for every action that makes the key disappear.
    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            NodeAction::Delete | NodeAction::Expire | NodeAction::CompareAndDelete
        )
    }
}

/// One node of a read result, already flattened to a leaf or an empty directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNode {
    pub key: String,
    pub value: Option<String>,
    pub dir: bool,
    pub action: NodeAction,
    pub modified_index: Option<u64>,
}

impl StoreNode {
    /// Leaf written with `set`.
    pub fn leaf(key: impl Into<String>, value: impl Into<String>, modified_index: u64) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            dir: false,
            action: NodeAction::Set,
            modified_index: Some(modified_index),
        }
    }

    /// Key removed with `delete`.
    pub fn removed(key: impl Into<String>, modified_index: u64) -> Self {
        Self {
            key: key.into(),
            value: None,
            dir: false,
            action: NodeAction::Delete,
            modified_index: Some(modified_index),
        }
    }

    /// Convert to the change event merged into the tree.
    pub fn to_event(&self) -> ChangeEvent {
        if self.action.is_removal() {
            return ChangeEvent::delete(self.key.clone(), self.modified_index);
        }

        match (&self.value, self.dir) {
            (Some(value), false) => {
                ChangeEvent::set(self.key.clone(), value.clone(), self.modified_index)
            }
            _ => ChangeEvent::directory(self.key.clone(), self.modified_index),
        }
    }
}

/// Parameters of a single read against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    /// Registry path to read or watch
    pub path: String,
    /// Include the whole subtree
    pub recursive: bool,
    /// Long-poll for the next change instead of reading current state
    pub wait: bool,
    /// First version the long-poll is interested in
    pub wait_version: Option<u64>,
    /// Upper bound on how long the request may take
    pub timeout: Duration,
}

/// A live connection to the registry
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Read current state or wait for the next change.
    async fn read(&self, request: &ReadRequest) -> Result<Vec<StoreNode>, StoreError>;

    /// Human readable endpoint for logging
    fn endpoint(&self) -> String;
}

/// Factory for fresh connections, used on start and on every reconnect
pub trait Connect: Send + Sync {
    type Client: StoreClient;

    fn connect(&self) -> Result<Self::Client, StoreError>;
}
