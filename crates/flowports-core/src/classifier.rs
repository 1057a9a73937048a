//! # Port Classifier
//!
//! Partitions ports by topology role and by owning node.
//!
//! These are the uncached derivations; [`crate::selectors::PortSelectors`]
//! wires them behind the derivation cache. All functions are total: an
//! unknown node id or an empty collection yields an empty map.

use crate::{NodeId, Port, PortMap, Topology};

/// All ports whose owning node is `node_id`, regardless of topology.
#[must_use]
pub fn ports_for_node(ports: &PortMap, node_id: &NodeId) -> PortMap {
    filter_ports(ports, |port| port.node_id == *node_id)
}

/// All ports with topology `Source`.
#[must_use]
pub fn emitter_ports(ports: &PortMap) -> PortMap {
    ports_with_topology(ports, Topology::Source)
}

/// All ports with topology `Sink`.
#[must_use]
pub fn sink_ports(ports: &PortMap) -> PortMap {
    ports_with_topology(ports, Topology::Sink)
}

/// All ports with exactly the given topology.
#[must_use]
pub fn ports_with_topology(ports: &PortMap, topology: Topology) -> PortMap {
    filter_ports(ports, |port| port.topology == topology)
}

/// Keep the entries of `ports` matching `predicate`, preserving their keys.
pub fn filter_ports(ports: &PortMap, predicate: impl Fn(&Port) -> bool) -> PortMap {
    ports
        .iter()
        .filter(|(_, port)| predicate(port))
        .map(|(id, port)| (id.clone(), port.clone()))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
