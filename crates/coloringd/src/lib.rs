//! coloringd - topology coloring daemon
//!
//! Assigns a deterministic color to every switch in an SDN topology and
//! keeps each switch programmed with one probe flow per neighbor, matching
//! that neighbor's color and punting to the controller. The controller can
//! then tell, from an incoming probe packet, which neighbor sent it.
//!
//! Reconciliation flow:
//!
//! 1. Fetch a topology view (switch registry + link list)
//! 2. Derive/refresh per-switch colors and rebuild neighbor sets
//! 3. Push a probe flow for every (switch, neighbor) pair not yet installed
//! 4. Serve the color table via `GET /colors`

pub mod color;
pub mod color_sync;
pub mod config;
pub mod error;
pub mod flow_client;
pub mod rest_api;
pub mod snapshot;
pub mod switch_table;
pub mod topology_client;
pub mod types;

pub use color::color_to_field;
pub use color_sync::{build_probe_flow, ColorSync, PassSummary};
pub use config::ColoringConfig;
pub use error::{ColoringError, Result};
pub use flow_client::{FlowPusher, HttpFlowPusher};
pub use rest_api::SharedSync;
pub use snapshot::{color_snapshot, ColorEntry};
pub use switch_table::{derive_color, SwitchTable};
pub use topology_client::{HttpTopologySource, TopologySource};
pub use types::{
    ColorValue, FieldKind, FlowAction, FlowDescriptor, FlowHandle, Link, OfVersion, SwitchInfo,
    TopologyView,
};
