//! ColorSync - Core topology coloring and flow reconciliation logic.
//!
//! One pass takes a fresh topology view, refreshes switch colors and
//! neighbor sets, diffs the desired per-neighbor flow set against what is
//! already installed, and pushes exactly the missing flows. Passes must be
//! mutually exclusive; the daemon serializes them behind an async mutex.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::color::color_to_field;
use crate::config::ColoringConfig;
use crate::flow_client::FlowPusher;
use crate::switch_table::SwitchTable;
use crate::types::{FieldKind, FlowAction, FlowDescriptor, OfVersion, TopologyView};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Flows pushed and acknowledged this pass.
    pub pushed: usize,
    /// Pushes that failed and were left pending for the next pass.
    pub failed: usize,
    /// Switches skipped (unsupported version or invalid dpid).
    pub skipped: usize,
}

/// Builds the probe flow matching `color` for a switch speaking the given
/// protocol version.
pub fn build_probe_flow(
    color: u64,
    field: FieldKind,
    priority: u16,
    controller_port: u32,
) -> FlowDescriptor {
    let mut match_fields = BTreeMap::new();
    match_fields.insert(field.as_str().to_string(), color_to_field(color, field));
    FlowDescriptor {
        table_id: 0,
        priority,
        match_fields,
        actions: vec![FlowAction::Output {
            port: controller_port,
        }],
    }
}

/// Reconciles topology state against installed probe flows.
///
/// Owns the [`SwitchTable`] and drives the flow-push collaborator; both the
/// topology source and the pusher are injected rather than reached through
/// any global registry.
pub struct ColorSync {
    table: SwitchTable,
    color_field: FieldKind,
    flow_priority: u16,
    prune_stale_flows: bool,
    pusher: Arc<dyn FlowPusher>,
}

impl ColorSync {
    /// Creates a reconciler from configuration and a flow-push collaborator.
    pub fn new(config: &ColoringConfig, pusher: Arc<dyn FlowPusher>) -> Self {
        Self {
            table: SwitchTable::new(),
            color_field: config.color_field,
            flow_priority: config.flow_priority,
            prune_stale_flows: config.prune_stale_flows,
            pusher,
        }
    }

    /// Read access to the state store, for snapshots and reporting.
    pub fn table(&self) -> &SwitchTable {
        &self.table
    }

    /// The configured color field.
    pub fn color_field(&self) -> FieldKind {
        self.color_field
    }

    /// Runs one reconciliation pass over `view`.
    ///
    /// Colors are assigned to new switches, every known switch's neighbor
    /// set is rebuilt from the link list (self-links are legal and make a
    /// switch its own neighbor), and a probe flow is pushed for every
    /// (switch, neighbor) pair not yet installed. Per-pair failures are
    /// logged and retried on the next pass; they never abort the pass.
    #[instrument(skip(self, view))]
    pub async fn update_colors(&mut self, view: &TopologyView) -> PassSummary {
        let mut summary = PassSummary::default();

        // Neighbor sets are rebuilt from scratch every pass; a switch
        // absent from this view has no observed neighbors.
        self.table.clear_neighbors();

        // Refresh colors and clear neighbor sets for repopulation.
        let mut versions: BTreeMap<String, OfVersion> = BTreeMap::new();
        for switch in &view.switches {
            match self.table.ensure_switch(&switch.dpid) {
                Ok(color) => {
                    debug!(dpid = %switch.dpid, color, "Ensured switch color");
                    versions.insert(switch.dpid.clone(), switch.of_version);
                }
                Err(e) => {
                    warn!(dpid = %switch.dpid, error = %e, "Skipping switch with invalid dpid");
                    summary.skipped += 1;
                }
            }
        }

        // Rebuild neighbor sets; each endpoint records the other.
        'links: for link in &view.links {
            for endpoint in [&link.endpoint_a, &link.endpoint_b] {
                if !self.table.contains(endpoint) {
                    if let Err(e) = self.table.ensure_switch(endpoint) {
                        warn!(dpid = %endpoint, error = %e, "Skipping link with invalid endpoint");
                        continue 'links;
                    }
                }
            }
            self.table.add_neighbor(&link.endpoint_a, &link.endpoint_b);
            self.table.add_neighbor(&link.endpoint_b, &link.endpoint_a);
        }

        if self.prune_stale_flows {
            let dropped = self.table.prune_stale();
            if dropped > 0 {
                info!(dropped, "Pruned installation records for vanished neighbors");
            }
        }

        // Push a probe flow for every pair still pending.
        for dpid in self.table.dpids() {
            let version = versions
                .get(&dpid)
                .copied()
                .unwrap_or(OfVersion::Unsupported);
            let Some(controller_port) = version.controller_port() else {
                debug!(dpid = %dpid, "Skipping switch with unsupported protocol version");
                summary.skipped += 1;
                continue;
            };

            let pending: Vec<String> = match self.table.neighbors(&dpid) {
                Some(neighbors) => neighbors
                    .iter()
                    .filter(|n| !self.table.is_installed(&dpid, n))
                    .cloned()
                    .collect(),
                None => continue,
            };

            for neighbor in pending {
                let Some(color) = self.table.color(&neighbor) else {
                    continue;
                };
                let flow =
                    build_probe_flow(color, self.color_field, self.flow_priority, controller_port);

                match self.pusher.push_flow(&dpid, &flow).await {
                    Ok(handle) => {
                        info!(
                            dpid = %dpid,
                            neighbor = %neighbor,
                            handle = %handle,
                            "Installed probe flow"
                        );
                        self.table.mark_installed(&dpid, &neighbor, handle);
                        summary.pushed += 1;
                    }
                    Err(e) => {
                        warn!(
                            dpid = %dpid,
                            neighbor = %neighbor,
                            error = %e,
                            "Flow push failed, pair left pending for next pass"
                        );
                        summary.failed += 1;
                    }
                }
            }
        }

        summary
    }
}
