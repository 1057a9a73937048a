//! # Connectivity Analyzer
//!
//! Decides, for each port, whether it is the corresponding endpoint of at
//! least one link.
//!
//! A port is matched against links by its own `id` field. Referenced
//! endpoint ids are collected into a `BTreeSet` first, so each free-port
//! derivation is O(ports + links) rather than a scan of the links per port.
//! The result sets are identical to the per-port scan.

use crate::classifier::filter_ports;
use crate::{LinkList, NodeId, PortId, PortMap};
use std::collections::BTreeSet;

/// Ids referenced as `source_id` by at least one link.
#[must_use]
pub fn linked_sources(links: &LinkList) -> BTreeSet<&PortId> {
    links.iter().map(|link| &link.source_id).collect()
}

/// Ids referenced as `target_id` by at least one link.
#[must_use]
pub fn linked_targets(links: &LinkList) -> BTreeSet<&PortId> {
    links.iter().map(|link| &link.target_id).collect()
}

/// Sink ports that are no link's target.
///
/// `sinks` is expected to be the sink subset; topology is not re-checked.
#[must_use]
pub fn free_sink_ports(sinks: &PortMap, links: &LinkList) -> PortMap {
    let targets = linked_targets(links);
    filter_ports(sinks, |port| !targets.contains(&port.id))
}

/// Emitter ports that are no link's source.
///
/// `emitters` is expected to be the emitter subset; topology is not re-checked.
#[must_use]
pub fn free_emitter_ports(emitters: &PortMap, links: &LinkList) -> PortMap {
    let sources = linked_sources(links);
    filter_ports(emitters, |port| !sources.contains(&port.id))
}

/// Links leaving `node_id`: their source port is owned by the node.
///
/// Links whose source port is missing from `ports` belong to no node.
#[must_use]
pub fn outgoing_links(ports: &PortMap, links: &LinkList, node_id: &NodeId) -> LinkList {
    let owned = owned_port_ids(ports, node_id);
    links
        .iter()
        .filter(|link| owned.contains(&link.source_id))
        .cloned()
        .collect()
}

/// Links entering `node_id`: their target port is owned by the node.
#[must_use]
pub fn incoming_links(ports: &PortMap, links: &LinkList, node_id: &NodeId) -> LinkList {
    let owned = owned_port_ids(ports, node_id);
    links
        .iter()
        .filter(|link| owned.contains(&link.target_id))
        .cloned()
        .collect()
}

fn owned_port_ids<'a>(ports: &'a PortMap, node_id: &NodeId) -> BTreeSet<&'a PortId> {
    ports
        .values()
        .filter(|port| port.node_id == *node_id)
        .map(|port| &port.id)
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
