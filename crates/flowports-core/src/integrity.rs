//! # Integrity Query
//!
//! Referential checks surfaced as ordinary query results. A detached port
//! is a reportable condition, not an error: the caller decides severity.

use crate::classifier::filter_ports;
use crate::{NodeId, NodeMap, PortMap};
use std::collections::BTreeSet;

/// Ports whose `node_id` matches the id of no node in `nodes`.
///
/// Nodes are matched by their `id` field, not by map key.
#[must_use]
pub fn detached_ports(ports: &PortMap, nodes: &NodeMap) -> PortMap {
    let present: BTreeSet<&NodeId> = nodes.values().map(|node| &node.id).collect();
    filter_ports(ports, |port| !present.contains(&port.node_id))
}

/// Ports carrying a non-empty access key.
///
/// Applied to the free sink ports this yields the ports an external trigger
/// may address.
#[must_use]
pub fn keyed_ports(ports: &PortMap) -> PortMap {
    filter_ports(ports, |port| port.is_keyed())
}
