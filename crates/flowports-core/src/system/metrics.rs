//! # Snapshot Metrics
//!
//! Counts over one snapshot, gathered through [`PortSelectors`] so that
//! repeated reports over an unchanged snapshot reuse the cached views.

use crate::accessor::{get_links, get_nodes, get_ports};
use crate::{PortSelectors, Snapshot, Topology};
use serde::{Deserialize, Serialize};

/// Summary counts for a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub port_count: usize,
    pub link_count: usize,
    pub emitter_count: usize,
    pub sink_count: usize,
    /// Ports whose topology is neither source nor sink.
    pub unknown_topology_count: usize,
    pub free_emitter_count: usize,
    pub free_sink_count: usize,
    pub keyed_free_sink_count: usize,
    pub detached_count: usize,
}

impl GraphMetrics {
    /// Metrics of an empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute metrics for `snapshot`.
    #[must_use]
    pub fn from_snapshot(selectors: &PortSelectors, snapshot: &Snapshot) -> Self {
        let ports = get_ports(snapshot);
        let unknown_topology_count = ports
            .values()
            .filter(|port| port.topology == Topology::Unknown)
            .count();

        Self {
            node_count: get_nodes(snapshot).len(),
            port_count: ports.len(),
            link_count: get_links(snapshot).len(),
            emitter_count: selectors.emitter_ports(snapshot).len(),
            sink_count: selectors.sink_ports(snapshot).len(),
            unknown_topology_count,
            free_emitter_count: selectors.free_emitter_ports(snapshot).len(),
            free_sink_count: selectors.free_sink_ports(snapshot).len(),
            keyed_free_sink_count: selectors.keyed_free_sink_ports(snapshot).len(),
            detached_count: selectors.detached_ports(snapshot).len(),
        }
    }

    /// True when every port resolves to an existing node.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.detached_count == 0
    }

    /// Ports taking part in at least one link as their corresponding endpoint.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.emitter_count
            .saturating_sub(self.free_emitter_count)
            .saturating_add(self.sink_count.saturating_sub(self.free_sink_count))
    }
}
