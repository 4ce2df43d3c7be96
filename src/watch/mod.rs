//! Watch Loop
//!
//! The stability tracker turns a stream of store changes into stable tree
//! snapshots; the session driver keeps trackers running across connection
//! loss.

pub mod session;
pub mod tracker;

pub use session::{DriverExit, SessionDriver, SessionOptions, SnapshotSink};
pub use tracker::{StabilityTracker, TrackOptions};
