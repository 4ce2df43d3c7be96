//! etcd v2 keys API client
//!
//! Reads `GET {base}/v2/keys{path}` with `recursive`, `wait` and `waitIndex`
//! query parameters and flattens the returned node tree into leaf nodes.

use crate::error::StoreError;
use crate::store::{Connect, NodeAction, ReadRequest, StoreClient, StoreNode};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// etcd error code for a missing key
const ERROR_KEY_NOT_FOUND: u64 = 100;

#[derive(Deserialize)]
struct KeysResponse {
    action: String,
    node: Option<WireNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
    key: Option<String>,
    value: Option<String>,
    #[serde(default)]
    dir: bool,
    modified_index: Option<u64>,
    #[serde(default)]
    nodes: Vec<WireNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: u64,
    message: String,
    #[serde(default)]
    cause: Option<String>,
}

/// Connection to one etcd endpoint
pub struct EtcdClient {
    client: Client,
    base_url: Url,
}

impl EtcdClient {
    pub fn new(base_url: Url, connect_timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| StoreError::Unreachable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Full URL for a read request
    pub fn keys_url(&self, request: &ReadRequest) -> Url {
        let mut url = self.base_url.clone();
        let path = if request.path.starts_with('/') {
            request.path.clone()
        } else {
            format!("/{}", request.path)
        };
        url.set_path(&format!("/v2/keys{}", path));

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair("recursive", if request.recursive { "true" } else { "false" });
            if request.wait {
                query.append_pair("wait", "true");
                if let Some(version) = request.wait_version {
                    query.append_pair("waitIndex", &version.to_string());
                }
            }
        }

        url
    }
}

#[async_trait]
impl StoreClient for EtcdClient {
    async fn read(&self, request: &ReadRequest) -> Result<Vec<StoreNode>, StoreError> {
        let url = self.keys_url(request);
        debug!(url = %url, timeout_ms = request.timeout.as_millis() as u64, "Reading keys");

        let response = self
            .client
            .get(url)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        decode_response(status, &body, request.wait)
    }

    fn endpoint(&self) -> String {
        self.base_url.to_string()
    }
}

/// Builds an [`EtcdClient`] per session
#[derive(Debug, Clone)]
pub struct EtcdConnector {
    base_url: Url,
    connect_timeout: Duration,
}

impl EtcdConnector {
    pub fn new(base_url: Url, connect_timeout: Duration) -> Self {
        Self {
            base_url,
            connect_timeout,
        }
    }
}

impl Connect for EtcdConnector {
    type Client = EtcdClient;

    fn connect(&self) -> Result<EtcdClient, StoreError> {
        EtcdClient::new(self.base_url.clone(), self.connect_timeout)
    }
}

fn map_transport_error(error: reqwest::Error) -> StoreError {
    classify_transport_error(error.is_connect(), error.is_timeout(), error.to_string())
}

/// A failure while connecting is unreachable even when it was a timeout; only
/// a timeout on an established connection counts as a quiet long-poll.
fn classify_transport_error(connect: bool, timeout: bool, message: String) -> StoreError {
    if connect {
        StoreError::Unreachable(message)
    } else if timeout {
        StoreError::Timeout
    } else {
        StoreError::ConnectionFailed(message)
    }
}

/// Decode a keys API response body into flattened nodes
pub(crate) fn decode_response(
    status: StatusCode,
    body: &str,
    wait: bool,
) -> Result<Vec<StoreNode>, StoreError> {
    if !status.is_success() {
        return Err(decode_error(status, body));
    }

    // The server closes idle watches with an empty body.
    if body.trim().is_empty() {
        return if wait {
            Err(StoreError::Timeout)
        } else {
            Err(StoreError::Protocol("Empty response body".to_string()))
        };
    }

    let parsed: KeysResponse = serde_json::from_str(body)
        .map_err(|e| StoreError::Protocol(format!("Failed to parse response: {}", e)))?;

    let action = NodeAction::parse(&parsed.action);
    let mut nodes = Vec::new();
    if let Some(node) = parsed.node {
        flatten(node, &action, &mut nodes);
    }
    Ok(nodes)
}

fn decode_error(status: StatusCode, body: &str) -> StoreError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) if error.error_code == ERROR_KEY_NOT_FOUND => {
            StoreError::NotFound(error.cause.unwrap_or(error.message))
        }
        Ok(error) => StoreError::Protocol(format!(
            "etcd error {}: {}{}",
            error.error_code,
            error.message,
            error.cause.map(|c| format!(" ({})", c)).unwrap_or_default()
        )),
        Err(_) if status.is_server_error() => {
            StoreError::ConnectionFailed(format!("Server returned {}", status))
        }
        Err(_) => StoreError::Protocol(format!("Request failed with status {}: {}", status, body)),
    }
}

fn flatten(node: WireNode, action: &NodeAction, out: &mut Vec<StoreNode>) {
    if node.nodes.is_empty() {
        out.push(StoreNode {
            key: node.key.unwrap_or_else(|| "/".to_string()),
            value: node.value,
            dir: node.dir,
            action: action.clone(),
            modified_index: node.modified_index,
        });
        return;
    }

    for child in node.nodes {
        flatten(child, action, out);
    }
}
