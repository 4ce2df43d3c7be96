//! Stability loop
//!
//! Pulls change batches from one store connection, merges them into the tree
//! and reports the tree each time the change stream goes quiet. A burst of
//! changes is coalesced into a single snapshot: after the first update the
//! poll timeout shrinks to the stability window, and the first timeout after
//! that commits the accumulated state.

use crate::error::StoreError;
use crate::store::{ReadRequest, StoreClient, StoreNode};
use crate::tree::Tree;
use futures::Stream;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Options for one tracked path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOptions {
    /// Registry path to read and watch
    pub path: String,
    /// Track the whole subtree below `path`
    pub recursive: bool,
    /// Quiet period that commits pending updates. `None` commits after every
    /// successful read.
    pub stable_window: Option<Duration>,
    /// Poll timeout used until the first update of an iteration arrives
    pub initial_timeout: Duration,
    /// Pause before retrying a read of a missing key
    pub not_found_backoff: Duration,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            recursive: true,
            stable_window: Some(Duration::from_secs(1)),
            initial_timeout: Duration::from_secs(30),
            not_found_backoff: Duration::from_secs(5),
        }
    }
}

/// Where the loop goes after one read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Polling,
    Stable,
    Lost,
}

/// Per-iteration polling state
struct PollCycle {
    updated: bool,
    timeout: Duration,
}

/// Watch-merge-stabilize loop over a single connection
pub struct StabilityTracker<C: StoreClient> {
    client: C,
    options: TrackOptions,
    tree: Tree,
    wait: bool,
    finished: bool,
}

impl<C: StoreClient> StabilityTracker<C> {
    /// Start a session on `client`. The first read is a non-blocking baseline.
    pub fn new(client: C, options: TrackOptions, tree: Tree) -> Self {
        debug!(
            path = %options.path,
            recursive = options.recursive,
            version = ?tree.version(),
            endpoint = %client.endpoint(),
            "Starting stability tracker"
        );
        Self {
            client,
            options,
            tree,
            wait: false,
            finished: false,
        }
    }

    pub fn version(&self) -> Option<u64> {
        self.tree.version()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// True once the connection has been given up
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Poll until the tree is stable and return a copy of it.
    ///
    /// Returns `None` once the connection is lost; every later call returns
    /// `None` as well.
    pub async fn next_stable(&mut self) -> Option<Tree> {
        if self.finished {
            return None;
        }

        let mut cycle = PollCycle {
            updated: false,
            timeout: self.options.initial_timeout,
        };
        debug!(
            timeout_ms = cycle.timeout.as_millis() as u64,
            version = ?self.tree.version(),
            "Entering read loop"
        );

        loop {
            match self.poll_once(&mut cycle).await {
                Phase::Polling => continue,
                Phase::Stable => {
                    debug!(version = ?self.tree.version(), "Stable state reached");
                    return Some(self.tree.clone());
                }
                Phase::Lost => {
                    self.finished = true;
                    return None;
                }
            }
        }
    }

    /// Turn the tracker into a stream of stable snapshots
    pub fn into_stream(self) -> impl Stream<Item = Tree> {
        futures::stream::unfold(self, |mut tracker| async move {
            tracker.next_stable().await.map(|tree| (tree, tracker))
        })
    }

    async fn poll_once(&mut self, cycle: &mut PollCycle) -> Phase {
        let request = ReadRequest {
            path: self.options.path.clone(),
            recursive: self.options.recursive,
            wait: self.wait,
            wait_version: self.tree.version().map(|v| v.saturating_add(1)),
            timeout: cycle.timeout,
        };

        let result = self.client.read(&request).await;

        // Only the first read of a session is a baseline.
        self.wait = true;

        let phase = match result {
            Ok(nodes) => {
                self.merge(&nodes);
                cycle.updated = true;
                if self.options.stable_window.is_none() {
                    debug!("No stability window set");
                    Phase::Stable
                } else {
                    Phase::Polling
                }
            }
            Err(StoreError::NotFound(key)) => {
                debug!(key = %key, "Key not found, backing off");
                tokio::time::sleep(self.options.not_found_backoff).await;
                Phase::Polling
            }
            Err(StoreError::Timeout) => {
                debug!(updated = cycle.updated, "Read timed out");
                Self::quiet(cycle)
            }
            Err(StoreError::ConnectionFailed(reason)) => {
                // Unknown failures are assumed transient so the watch keeps going.
                warn!(reason = %reason, "Uncategorized connection failure");
                Self::quiet(cycle)
            }
            Err(StoreError::Unreachable(reason)) => {
                error!(reason = %reason, "Could not connect to store");
                Phase::Lost
            }
            Err(StoreError::Protocol(reason)) => {
                error!(reason = %reason, "Store session lost");
                Phase::Lost
            }
        };

        if cycle.updated {
            if let Some(window) = self.options.stable_window {
                cycle.timeout = window;
            }
        }

        debug!(
            version = ?self.tree.version(),
            wait = self.wait,
            timeout_ms = cycle.timeout.as_millis() as u64,
            updated = cycle.updated,
            phase = ?phase,
            "Poll state"
        );

        phase
    }

    fn quiet(cycle: &PollCycle) -> Phase {
        if cycle.updated {
            Phase::Stable
        } else {
            Phase::Polling
        }
    }

    fn merge(&mut self, nodes: &[StoreNode]) {
        let events: Vec<_> = nodes.iter().map(StoreNode::to_event).collect();
        let changed = self.tree.apply_all(&events);
        debug!(
            events = events.len(),
            changed,
            version = ?self.tree.version(),
            "Merged change batch"
        );
    }
}
