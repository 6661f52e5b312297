//! Topology state store.
//!
//! Tracks, per switch, its assigned color, its current neighbor set, and
//! the per-neighbor flows already installed on it. All operations are
//! synchronous and process-local; the reconciler is the single writer.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ColoringError, Result};
use crate::types::FlowHandle;

/// State kept for one switch.
#[derive(Debug, Clone, Default)]
pub struct SwitchRecord {
    /// Color derived from the datapath id; never changes once assigned.
    color: u64,
    /// Neighbors observed in the last reconciliation pass.
    neighbors: BTreeSet<String>,
    /// Flows already pushed to this switch, keyed by the neighbor whose
    /// color the flow matches.
    installed: BTreeMap<String, FlowHandle>,
}

impl SwitchRecord {
    fn new(color: u64) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }
}

/// Derives the color for a datapath id: separators are stripped, the first
/// four hex digits are dropped, and the remainder is parsed base-16 (for an
/// 8-byte colon-separated dpid this is its low 48 bits).
pub fn derive_color(dpid: &str) -> Result<u64> {
    let hex: String = dpid.chars().filter(|c| *c != ':').collect();
    let suffix = hex.get(4..).unwrap_or("");
    u64::from_str_radix(suffix, 16).map_err(|_| ColoringError::invalid_dpid(dpid))
}

/// Per-switch color and flow-installation state, keyed by datapath id.
///
/// Records are created the first time an id is observed and live for the
/// process lifetime; they are never deleted, even when a switch disconnects.
#[derive(Debug, Default)]
pub struct SwitchTable {
    switches: BTreeMap<String, SwitchRecord>,
}

impl SwitchTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of switches ever observed.
    pub fn len(&self) -> usize {
        self.switches.len()
    }

    /// Returns true if no switch has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    /// Returns true if `dpid` has a record.
    pub fn contains(&self, dpid: &str) -> bool {
        self.switches.contains_key(dpid)
    }

    /// Ensures a record exists for `dpid` and returns its color.
    ///
    /// A new id gets its color derived and stored; a known id keeps its
    /// color unchanged and has its neighbor set cleared, ready for
    /// repopulation by the current pass.
    pub fn ensure_switch(&mut self, dpid: &str) -> Result<u64> {
        if let Some(record) = self.switches.get_mut(dpid) {
            record.neighbors.clear();
            return Ok(record.color);
        }
        let color = derive_color(dpid)?;
        self.switches
            .insert(dpid.to_string(), SwitchRecord::new(color));
        Ok(color)
    }

    /// Clears every record's neighbor set, including switches absent from
    /// the current pass. Neighbor sets only ever hold what the latest pass
    /// observed; a vanished switch has no observed neighbors.
    pub fn clear_neighbors(&mut self) {
        for record in self.switches.values_mut() {
            record.neighbors.clear();
        }
    }

    /// Adds `neighbor` to `dpid`'s neighbor set. Idempotent; a no-op if
    /// `dpid` has no record.
    pub fn add_neighbor(&mut self, dpid: &str, neighbor: &str) {
        if let Some(record) = self.switches.get_mut(dpid) {
            record.neighbors.insert(neighbor.to_string());
        }
    }

    /// Records that a flow matching `neighbor`'s color was acknowledged on
    /// switch `dpid`.
    pub fn mark_installed(&mut self, dpid: &str, neighbor: &str, handle: FlowHandle) {
        if let Some(record) = self.switches.get_mut(dpid) {
            record.installed.insert(neighbor.to_string(), handle);
        }
    }

    /// Returns true if a flow for `(dpid, neighbor)` was already installed.
    pub fn is_installed(&self, dpid: &str, neighbor: &str) -> bool {
        self.switches
            .get(dpid)
            .map(|r| r.installed.contains_key(neighbor))
            .unwrap_or(false)
    }

    /// Color assigned to `dpid`, if it has a record.
    pub fn color(&self, dpid: &str) -> Option<u64> {
        self.switches.get(dpid).map(|r| r.color)
    }

    /// Current neighbor set of `dpid`.
    pub fn neighbors(&self, dpid: &str) -> Option<&BTreeSet<String>> {
        self.switches.get(dpid).map(|r| &r.neighbors)
    }

    /// All known datapath ids, in sorted order.
    pub fn dpids(&self) -> Vec<String> {
        self.switches.keys().cloned().collect()
    }

    /// Read-only projection of the color table.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.switches
            .iter()
            .map(|(dpid, record)| (dpid.clone(), record.color))
            .collect()
    }

    /// Drops installation bookkeeping for neighbors no longer present in a
    /// switch's neighbor set, so a reappearing neighbor is pushed again.
    /// Returns the number of entries dropped. No remote flow deletion is
    /// attempted.
    pub fn prune_stale(&mut self) -> usize {
        let mut dropped = 0;
        for record in self.switches.values_mut() {
            let before = record.installed.len();
            let neighbors = &record.neighbors;
            record.installed.retain(|neighbor, _| neighbors.contains(neighbor));
            dropped += before - record.installed.len();
        }
        dropped
    }
}
