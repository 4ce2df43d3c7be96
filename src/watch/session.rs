//! Session driver
//!
//! Owns the reconnect policy around the stability loop. Every session opens a
//! fresh connection and starts from a baseline read into an empty tree seeded
//! with the last delivered version, so state lost while disconnected is
//! rebuilt from the store rather than assumed.

use crate::error::WatchError;
use crate::store::{Connect, StoreClient};
use crate::tree::Tree;
use crate::watch::tracker::{StabilityTracker, TrackOptions};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Receiver of stable snapshots
#[async_trait]
pub trait SnapshotSink: Send {
    /// Handle one snapshot. The loop does not poll again until this returns.
    async fn deliver(&mut self, snapshot: &Tree) -> Result<(), WatchError>;
}

/// Reconnect and lifetime policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub track: TrackOptions,
    /// Version to resume from on the very first session
    pub start_version: Option<u64>,
    /// Stop after the first delivered snapshot
    pub one_event: bool,
    /// Open a new session when one ends
    pub reconnect: bool,
    /// Pause between a lost session and the next connection attempt
    pub reconnect_backoff: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            track: TrackOptions::default(),
            start_version: None,
            one_event: false,
            reconnect: true,
            reconnect_backoff: Duration::from_secs(30),
        }
    }
}

/// Why the driver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// One-shot mode delivered its snapshot
    OneEvent,
    /// The session ended and reconnecting is disabled
    Disconnected,
}

/// Runs stability-loop sessions until told to stop
pub struct SessionDriver<K: Connect> {
    connector: K,
    options: SessionOptions,
    version: Option<u64>,
    sessions: u64,
    delivered: u64,
}

impl<K: Connect> SessionDriver<K> {
    pub fn new(connector: K, options: SessionOptions) -> Self {
        let version = options.start_version;
        Self {
            connector,
            options,
            version,
            sessions: 0,
            delivered: 0,
        }
    }

    /// Version of the last delivered snapshot (or the start version)
    pub fn last_version(&self) -> Option<u64> {
        self.version
    }

    /// Number of sessions started so far
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    /// Number of snapshots handed to the sink
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Drive sessions, delivering each stable snapshot to `sink`.
    ///
    /// Sink errors abort the run. Lost sessions are retried after the
    /// configured backoff unless reconnecting is disabled.
    pub async fn run<S>(&mut self, sink: &mut S) -> Result<DriverExit, WatchError>
    where
        S: SnapshotSink + ?Sized,
    {
        loop {
            self.sessions += 1;
            info!(
                session = self.sessions,
                version = ?self.version,
                path = %self.options.track.path,
                "Opening store session"
            );

            match self.connector.connect() {
                Ok(client) => {
                    if self.run_session(client, sink).await? {
                        return Ok(DriverExit::OneEvent);
                    }
                }
                Err(e) => {
                    warn!(session = self.sessions, error = %e, "Failed to open store connection");
                }
            }

            if !self.options.reconnect {
                warn!(session = self.sessions, "Store session ended, not reconnecting");
                return Ok(DriverExit::Disconnected);
            }

            warn!(
                session = self.sessions,
                backoff_secs = self.options.reconnect_backoff.as_secs_f64(),
                "Store session ended, reconnecting after backoff"
            );
            tokio::time::sleep(self.options.reconnect_backoff).await;
        }
    }

    /// Returns true when one-shot mode is satisfied.
    async fn run_session<C, S>(&mut self, client: C, sink: &mut S) -> Result<bool, WatchError>
    where
        C: StoreClient,
        S: SnapshotSink + ?Sized,
    {
        let mut tracker = StabilityTracker::new(
            client,
            self.options.track.clone(),
            Tree::with_version(self.version),
        );

        while let Some(snapshot) = tracker.next_stable().await {
            self.version = snapshot.version();
            debug!(version = ?self.version, keys = snapshot.root().len(), "Delivering snapshot");
            sink.deliver(&snapshot).await?;
            self.delivered += 1;

            if self.options.one_event {
                info!(version = ?self.version, "Run only once, exiting");
                return Ok(true);
            }
        }

        debug!(version = ?tracker.version(), "No more data, store disconnected");
        Ok(false)
    }
}
