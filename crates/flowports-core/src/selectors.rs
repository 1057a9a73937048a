//! # Port Selectors
//!
//! The derivation graph. Each view declares its upstream inputs through the
//! key type of its memo, and is recomputed only when one of them changes:
//!
//! ```text
//! ports ──┬─> ports_for_node[node]
//!         ├─> emitter_ports ──┬─> emitter_ports_for_node[node]
//!         │                   └─> free_emitter_ports <── links
//!         ├─> sink_ports ─────┬─> sink_ports_for_node[node]
//!         │                   └─> free_sink_ports <───── links
//!         │                              └─> keyed_free_sink_ports
//!         ├─> detached_ports <── nodes
//!         └─> outgoing_links[node], incoming_links[node] <── links
//! ```
//!
//! Every query takes the snapshot to derive from and returns a shared,
//! read-only result. Queries never fail; unknown ids give empty results.

use crate::accessor::{get_links, get_nodes, get_ports};
use crate::cache::{CacheStats, KeyedMemo, Memo};
use crate::{LinkList, NodeId, NodeMap, PortMap, Shared, Snapshot};
use crate::{classifier, connectivity, integrity};
use std::collections::BTreeMap;

type PortsView = Memo<Shared<PortMap>, PortMap>;
type PortsByNode = KeyedMemo<Shared<PortMap>, NodeId, PortMap>;
type PortsAndLinks = (Shared<PortMap>, Shared<LinkList>);
type LinksByNode = KeyedMemo<PortsAndLinks, NodeId, LinkList>;

/// Memoized port queries over successive snapshots.
///
/// One instance is meant to live as long as the store producing the
/// snapshots. It is `Send + Sync`; callers on different threads share the
/// same cached results.
pub struct PortSelectors {
    ports_for_node: PortsByNode,
    emitter_ports: PortsView,
    sink_ports: PortsView,
    emitter_ports_for_node: PortsByNode,
    sink_ports_for_node: PortsByNode,
    free_sink_ports: Memo<PortsAndLinks, PortMap>,
    free_emitter_ports: Memo<PortsAndLinks, PortMap>,
    keyed_free_sink_ports: PortsView,
    detached_ports: Memo<(Shared<PortMap>, Shared<NodeMap>), PortMap>,
    outgoing_links: LinksByNode,
    incoming_links: LinksByNode,
}

impl PortSelectors {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ports_for_node: KeyedMemo::new("ports_for_node"),
            emitter_ports: Memo::new("emitter_ports"),
            sink_ports: Memo::new("sink_ports"),
            emitter_ports_for_node: KeyedMemo::new("emitter_ports_for_node"),
            sink_ports_for_node: KeyedMemo::new("sink_ports_for_node"),
            free_sink_ports: Memo::new("free_sink_ports"),
            free_emitter_ports: Memo::new("free_emitter_ports"),
            keyed_free_sink_ports: Memo::new("keyed_free_sink_ports"),
            detached_ports: Memo::new("detached_ports"),
            outgoing_links: KeyedMemo::new("outgoing_links"),
            incoming_links: KeyedMemo::new("incoming_links"),
        }
    }

    // =========================================================================
    // PORT CLASSIFIER
    // =========================================================================

    /// All ports owned by `node_id`, regardless of topology.
    pub fn ports_for_node(&self, snapshot: &Snapshot, node_id: &NodeId) -> Shared<PortMap> {
        self.ports_for_node
            .get_or_compute(get_ports(snapshot), node_id, |ports, node| {
                classifier::ports_for_node(ports, node)
            })
    }

    /// All `Source` ports.
    pub fn emitter_ports(&self, snapshot: &Snapshot) -> Shared<PortMap> {
        self.emitter_ports
            .get_or_compute(get_ports(snapshot), |ports| classifier::emitter_ports(ports))
    }

    /// All `Sink` ports.
    pub fn sink_ports(&self, snapshot: &Snapshot) -> Shared<PortMap> {
        self.sink_ports
            .get_or_compute(get_ports(snapshot), |ports| classifier::sink_ports(ports))
    }

    /// `Source` ports owned by `node_id`.
    pub fn emitter_ports_for_node(&self, snapshot: &Snapshot, node_id: &NodeId) -> Shared<PortMap> {
        let emitters = self.emitter_ports(snapshot);
        self.emitter_ports_for_node
            .get_or_compute(&emitters, node_id, |ports, node| {
                classifier::ports_for_node(ports, node)
            })
    }

    /// `Sink` ports owned by `node_id`.
    pub fn sink_ports_for_node(&self, snapshot: &Snapshot, node_id: &NodeId) -> Shared<PortMap> {
        let sinks = self.sink_ports(snapshot);
        self.sink_ports_for_node
            .get_or_compute(&sinks, node_id, |ports, node| {
                classifier::ports_for_node(ports, node)
            })
    }

    // =========================================================================
    // CONNECTIVITY ANALYZER
    // =========================================================================

    /// Sink ports that no link targets.
    pub fn free_sink_ports(&self, snapshot: &Snapshot) -> Shared<PortMap> {
        let upstream = (self.sink_ports(snapshot), get_links(snapshot).clone());
        self.free_sink_ports
            .get_or_compute(&upstream, |(sinks, links)| {
                connectivity::free_sink_ports(sinks, links)
            })
    }

    /// Emitter ports that no link starts from.
    pub fn free_emitter_ports(&self, snapshot: &Snapshot) -> Shared<PortMap> {
        let upstream = (self.emitter_ports(snapshot), get_links(snapshot).clone());
        self.free_emitter_ports
            .get_or_compute(&upstream, |(emitters, links)| {
                connectivity::free_emitter_ports(emitters, links)
            })
    }

    /// Links whose source port is owned by `node_id`.
    pub fn outgoing_links(&self, snapshot: &Snapshot, node_id: &NodeId) -> Shared<LinkList> {
        let upstream = (get_ports(snapshot).clone(), get_links(snapshot).clone());
        self.outgoing_links
            .get_or_compute(&upstream, node_id, |(ports, links), node| {
                connectivity::outgoing_links(ports, links, node)
            })
    }

    /// Links whose target port is owned by `node_id`.
    pub fn incoming_links(&self, snapshot: &Snapshot, node_id: &NodeId) -> Shared<LinkList> {
        let upstream = (get_ports(snapshot).clone(), get_links(snapshot).clone());
        self.incoming_links
            .get_or_compute(&upstream, node_id, |(ports, links), node| {
                connectivity::incoming_links(ports, links, node)
            })
    }

    // =========================================================================
    // INTEGRITY QUERY
    // =========================================================================

    /// Free sink ports carrying a non-empty access key.
    pub fn keyed_free_sink_ports(&self, snapshot: &Snapshot) -> Shared<PortMap> {
        let free_sinks = self.free_sink_ports(snapshot);
        self.keyed_free_sink_ports
            .get_or_compute(&free_sinks, |ports| integrity::keyed_ports(ports))
    }

    /// Ports whose owning node is not in the snapshot.
    pub fn detached_ports(&self, snapshot: &Snapshot) -> Shared<PortMap> {
        let upstream = (get_ports(snapshot).clone(), get_nodes(snapshot).clone());
        self.detached_ports
            .get_or_compute(&upstream, |(ports, nodes)| {
                integrity::detached_ports(ports, nodes)
            })
    }

    // =========================================================================
    // CACHE MANAGEMENT
    // =========================================================================

    /// Per-view cache counters, keyed by view name.
    #[must_use]
    pub fn stats(&self) -> BTreeMap<&'static str, CacheStats> {
        [
            (self.ports_for_node.name(), self.ports_for_node.stats()),
            (self.emitter_ports.name(), self.emitter_ports.stats()),
            (self.sink_ports.name(), self.sink_ports.stats()),
            (
                self.emitter_ports_for_node.name(),
                self.emitter_ports_for_node.stats(),
            ),
            (
                self.sink_ports_for_node.name(),
                self.sink_ports_for_node.stats(),
            ),
            (self.free_sink_ports.name(), self.free_sink_ports.stats()),
            (self.free_emitter_ports.name(), self.free_emitter_ports.stats()),
            (
                self.keyed_free_sink_ports.name(),
                self.keyed_free_sink_ports.stats(),
            ),
            (self.detached_ports.name(), self.detached_ports.stats()),
            (self.outgoing_links.name(), self.outgoing_links.stats()),
            (self.incoming_links.name(), self.incoming_links.stats()),
        ]
        .into_iter()
        .collect()
    }

    /// Total per-node entries currently held across the node-keyed views.
    #[must_use]
    pub fn cached_node_entries(&self) -> usize {
        self.ports_for_node.cached_keys()
            + self.emitter_ports_for_node.cached_keys()
            + self.sink_ports_for_node.cached_keys()
            + self.outgoing_links.cached_keys()
            + self.incoming_links.cached_keys()
    }

    /// Drop every cached result.
    pub fn clear(&self) {
        self.ports_for_node.clear();
        self.emitter_ports.clear();
        self.sink_ports.clear();
        self.emitter_ports_for_node.clear();
        self.sink_ports_for_node.clear();
        self.free_sink_ports.clear();
        self.free_emitter_ports.clear();
        self.keyed_free_sink_ports.clear();
        self.detached_ports.clear();
        self.outgoing_links.clear();
        self.incoming_links.clear();
        tracing::debug!("selector caches cleared");
    }
}

impl Default for PortSelectors {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
