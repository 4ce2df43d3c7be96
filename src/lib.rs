//! Regwatch: Registry Watcher
//!
//! Watches a subtree of an etcd registry, folds change notifications into a
//! local tree and hands that tree to a command once the registry has been
//! quiet for a while.

pub mod action;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod store;
pub mod tree;
pub mod watch;
