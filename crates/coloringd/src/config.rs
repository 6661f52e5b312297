//! Daemon configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{ColoringError, Result};
use crate::types::FieldKind;

/// Default values, matching the controller deployment this daemon pairs with.
pub mod defaults {
    /// Topology service endpoint.
    pub const TOPOLOGY_URL: &str = "http://127.0.0.1:8181/api/topology";
    /// Flow-manager endpoint; `{dpid}` is substituted per switch.
    pub const FLOW_MANAGER_URL: &str = "http://127.0.0.1:8181/api/flows/{dpid}";
    /// Match field colors are encoded into.
    pub const COLOR_FIELD: &str = "dl_src";
    /// Probe-flow priority; must outrank ordinary traffic rules.
    pub const FLOW_PRIORITY: u16 = 50001;
    /// Seconds between reconciliation passes.
    pub const COLORING_INTERVAL_SECS: u64 = 10;
    /// Per-request HTTP timeout in seconds.
    pub const REQUEST_TIMEOUT_SECS: u64 = 5;
    /// Listen address for the color report endpoint.
    pub const LISTEN_ADDR: &str = "127.0.0.1:8765";
}

/// Runtime configuration for coloringd.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColoringConfig {
    /// Topology service URL polled every pass.
    pub topology_url: String,
    /// Flow-manager URL template containing a `{dpid}` placeholder.
    pub flow_manager_url: String,
    /// Field neighbor colors are encoded into.
    pub color_field: FieldKind,
    /// Priority assigned to probe flows.
    pub flow_priority: u16,
    /// Seconds between reconciliation passes.
    pub coloring_interval_secs: u64,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
    /// Listen address for the color report endpoint.
    pub listen_addr: String,
    /// Drop installation bookkeeping for vanished neighbors each pass.
    /// Off by default: flows are assumed durable once acknowledged.
    pub prune_stale_flows: bool,
}

impl Default for ColoringConfig {
    fn default() -> Self {
        Self {
            topology_url: defaults::TOPOLOGY_URL.to_string(),
            flow_manager_url: defaults::FLOW_MANAGER_URL.to_string(),
            color_field: FieldKind::DlSrc,
            flow_priority: defaults::FLOW_PRIORITY,
            coloring_interval_secs: defaults::COLORING_INTERVAL_SECS,
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            listen_addr: defaults::LISTEN_ADDR.to_string(),
            prune_stale_flows: false,
        }
    }
}

impl ColoringConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.flow_manager_url.contains("{dpid}") {
            return Err(ColoringError::config(
                "flow_manager_url",
                "must contain a '{dpid}' placeholder",
            ));
        }
        if self.coloring_interval_secs == 0 {
            return Err(ColoringError::config(
                "coloring_interval_secs",
                "must be greater than zero",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ColoringError::config(
                "request_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(ColoringError::config(
                "listen_addr",
                format!("'{}' is not a valid socket address", self.listen_addr),
            ));
        }
        Ok(())
    }

    /// HTTP timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reconciliation interval as a `Duration`.
    pub fn coloring_interval(&self) -> Duration {
        Duration::from_secs(self.coloring_interval_secs)
    }
}
