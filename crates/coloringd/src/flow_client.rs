//! Flow-push collaborator.
//!
//! The reconciler only needs success/failure plus an opaque handle, so the
//! collaborator is a trait; the production implementation POSTs flows to
//! the controller's flow-manager REST endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ColoringError, Result};
use crate::types::{FlowDescriptor, FlowHandle};

/// Pushes flows onto switches.
#[async_trait]
pub trait FlowPusher: Send + Sync {
    /// Installs `flow` on the switch identified by `dpid`. Returns a handle
    /// for the acknowledged flow; a non-success response is an error, never
    /// a panic.
    async fn push_flow(&self, dpid: &str, flow: &FlowDescriptor) -> Result<FlowHandle>;
}

/// Response body of a successful flow-manager push. The id is optional;
/// some flow managers acknowledge with an empty body.
#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    id: Option<String>,
}

/// `FlowPusher` backed by the flow-manager REST API.
///
/// The endpoint URL carries a `{dpid}` placeholder substituted per push,
/// and the request body is `{"flows": [<descriptor>]}`.
pub struct HttpFlowPusher {
    client: Client,
    flow_manager_url: String,
}

impl HttpFlowPusher {
    /// Creates a pusher with a bounded request timeout.
    pub fn new(flow_manager_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            flow_manager_url: flow_manager_url.into(),
        })
    }

    fn flow_url(&self, dpid: &str) -> String {
        self.flow_manager_url.replace("{dpid}", dpid)
    }
}

#[async_trait]
impl FlowPusher for HttpFlowPusher {
    async fn push_flow(&self, dpid: &str, flow: &FlowDescriptor) -> Result<FlowHandle> {
        let url = self.flow_url(dpid);
        let body = serde_json::json!({ "flows": [flow] });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ColoringError::flow_push(dpid, status.as_u16()));
        }

        let handle = response
            .json::<PushResponse>()
            .await
            .ok()
            .and_then(|r| r.id)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        debug!(dpid, handle = %handle, "Flow acknowledged by flow manager");
        Ok(FlowHandle(handle))
    }
}
