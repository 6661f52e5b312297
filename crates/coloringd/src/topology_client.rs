//! Topology source collaborator.
//!
//! Provides the reconciler with a consistent view of the controller's
//! switch registry and link list. The production implementation polls the
//! topology service's REST endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::error::{ColoringError, Result};
use crate::types::{Link, SwitchInfo, TopologyView};

/// Supplies topology views on demand.
#[async_trait]
pub trait TopologySource: Send + Sync {
    /// Fetches the current switch registry and link list.
    async fn fetch(&self) -> Result<TopologyView>;
}

/// Wire format of the topology endpoint.
#[derive(Debug, Deserialize)]
struct TopologyPayload {
    #[serde(default)]
    switches: HashMap<String, SwitchPayload>,
    #[serde(default)]
    links: HashMap<String, LinkPayload>,
}

#[derive(Debug, Deserialize)]
struct SwitchPayload {
    ofp_version: String,
}

#[derive(Debug, Deserialize)]
struct LinkPayload {
    endpoint_a: EndpointPayload,
    endpoint_b: EndpointPayload,
}

#[derive(Debug, Deserialize)]
struct EndpointPayload {
    switch: String,
}

/// `TopologySource` backed by the topology service's REST API.
pub struct HttpTopologySource {
    client: Client,
    topology_url: String,
}

impl HttpTopologySource {
    /// Creates a source with a bounded request timeout.
    pub fn new(topology_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            topology_url: topology_url.into(),
        })
    }

    fn view_from_payload(payload: TopologyPayload) -> TopologyView {
        let mut switches: Vec<SwitchInfo> = payload
            .switches
            .into_iter()
            .map(|(dpid, sw)| SwitchInfo::new(dpid, &sw.ofp_version))
            .collect();
        switches.sort_by(|a, b| a.dpid.cmp(&b.dpid));

        // Sort by link id for a deterministic pass order
        let mut entries: Vec<_> = payload.links.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        let links = entries
            .into_iter()
            .map(|(_, link)| Link::new(link.endpoint_a.switch, link.endpoint_b.switch))
            .collect();

        TopologyView { switches, links }
    }
}

#[async_trait]
impl TopologySource for HttpTopologySource {
    async fn fetch(&self) -> Result<TopologyView> {
        let response = self
            .client
            .get(&self.topology_url)
            .send()
            .await
            .map_err(|e| ColoringError::topology_source(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ColoringError::topology_source(format!(
                "topology endpoint returned status {}",
                status.as_u16()
            )));
        }

        let payload: TopologyPayload = response
            .json()
            .await
            .map_err(|e| ColoringError::topology_source(format!("invalid payload: {}", e)))?;

        let view = Self::view_from_payload(payload);
        debug!(
            switches = view.switches.len(),
            links = view.links.len(),
            "Fetched topology view"
        );
        Ok(view)
    }
}
