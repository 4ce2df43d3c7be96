//! Scripted in-memory store
//!
//! Replays a fixed sequence of read results and records every request it
//! receives. Used to drive the watch loop deterministically in tests.

use crate::error::StoreError;
use crate::store::{Connect, ReadRequest, StoreClient, StoreNode};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

type Reply = Result<Vec<StoreNode>, StoreError>;

/// Store that answers reads from a script
///
/// Once the script runs out every read reports the store as unreachable,
/// which ends the watch session.
#[derive(Clone, Default)]
pub struct ScriptedStore {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<ReadRequest>>>,
}

impl ScriptedStore {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a reply to the end of the script
    pub fn push(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<ReadRequest> {
        self.requests.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl StoreClient for ScriptedStore {
    async fn read(&self, request: &ReadRequest) -> Result<Vec<StoreNode>, StoreError> {
        self.requests.lock().push(request.clone());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Unreachable("script exhausted".to_string())))
    }

    fn endpoint(&self) -> String {
        "scripted://".to_string()
    }
}

/// Hands out one scripted store per session
///
/// Connecting after the last scripted session fails as unreachable.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    attempts: Arc<Mutex<VecDeque<Result<ScriptedStore, StoreError>>>>,
    connects: Arc<Mutex<usize>>,
}

impl ScriptedConnector {
    pub fn new(sessions: Vec<ScriptedStore>) -> Self {
        Self::from_attempts(sessions.into_iter().map(Ok).collect())
    }

    /// Script connection attempts, including failed ones
    pub fn from_attempts(attempts: Vec<Result<ScriptedStore, StoreError>>) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(attempts.into())),
            connects: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of connection attempts, successful or not
    pub fn connects(&self) -> usize {
        *self.connects.lock()
    }
}

impl Connect for ScriptedConnector {
    type Client = ScriptedStore;

    fn connect(&self) -> Result<ScriptedStore, StoreError> {
        *self.connects.lock() += 1;
        self.attempts
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Unreachable("no scripted session left".to_string())))
    }
}
