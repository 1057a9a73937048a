//! # State Snapshot
//!
//! One immutable version of the flow graph: nodes, ports and links.
//!
//! Each collection is held as a [`Shared`] handle. Producing a new snapshot
//! with `with_*` replaces one collection and shares the other two, which is
//! what lets the derivation caches skip work for unchanged inputs.

use crate::{Link, LinkList, Node, NodeMap, Port, PortMap, Shared};
use serde::{Deserialize, Serialize};

/// An immutable state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SerializableSnapshot", into = "SerializableSnapshot")]
pub struct Snapshot {
    nodes: Shared<NodeMap>,
    ports: Shared<PortMap>,
    links: Shared<LinkList>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from already-keyed collections.
    #[must_use]
    pub fn from_collections(nodes: NodeMap, ports: PortMap, links: LinkList) -> Self {
        Self {
            nodes: Shared::new(nodes),
            ports: Shared::new(ports),
            links: Shared::new(links),
        }
    }

    /// Build a snapshot from entity lists, keying nodes and ports by their ids.
    ///
    /// A later entity with a duplicate id replaces the earlier one.
    #[must_use]
    pub fn from_parts(
        nodes: impl IntoIterator<Item = Node>,
        ports: impl IntoIterator<Item = Port>,
        links: impl IntoIterator<Item = Link>,
    ) -> Self {
        Self::from_collections(
            nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            ports.into_iter().map(|p| (p.id.clone(), p)).collect(),
            links.into_iter().collect(),
        )
    }

    pub(crate) fn nodes(&self) -> &Shared<NodeMap> {
        &self.nodes
    }

    pub(crate) fn ports(&self) -> &Shared<PortMap> {
        &self.ports
    }

    pub(crate) fn links(&self) -> &Shared<LinkList> {
        &self.links
    }

    /// New snapshot with `nodes` replaced; ports and links are shared.
    #[must_use]
    pub fn with_nodes(&self, nodes: NodeMap) -> Self {
        Self {
            nodes: Shared::new(nodes),
            ..self.clone()
        }
    }

    /// New snapshot with `ports` replaced; nodes and links are shared.
    #[must_use]
    pub fn with_ports(&self, ports: PortMap) -> Self {
        Self {
            ports: Shared::new(ports),
            ..self.clone()
        }
    }

    /// New snapshot with `links` replaced; nodes and ports are shared.
    #[must_use]
    pub fn with_links(&self, links: LinkList) -> Self {
        Self {
            links: Shared::new(links),
            ..self.clone()
        }
    }

    /// New snapshot with one port added (or replaced by id).
    #[must_use]
    pub fn with_port(&self, port: Port) -> Self {
        let mut ports = PortMap::clone(&self.ports);
        ports.insert(port.id.clone(), port);
        self.with_ports(ports)
    }

    /// New snapshot with one link appended.
    #[must_use]
    pub fn with_link(&self, link: Link) -> Self {
        let mut links = LinkList::clone(&self.links);
        links.push(link);
        self.with_links(links)
    }
}

// =============================================================================
// SERIALIZABLE FORM
// =============================================================================

/// Flat, list-based form of a snapshot used for JSON and binary interchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl From<&Snapshot> for SerializableSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            nodes: snapshot.nodes.values().cloned().collect(),
            ports: snapshot.ports.values().cloned().collect(),
            links: snapshot.links.to_vec(),
        }
    }
}

impl From<Snapshot> for SerializableSnapshot {
    fn from(snapshot: Snapshot) -> Self {
        Self::from(&snapshot)
    }
}

impl From<SerializableSnapshot> for Snapshot {
    fn from(s: SerializableSnapshot) -> Self {
        Snapshot::from_parts(s.nodes, s.ports, s.links)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PortId;

    fn sample() -> Snapshot {
        Snapshot::from_parts(
            [Node::new("n1")],
            [Port::source("p1", "n1"), Port::sink("p2", "n1")],
            [],
        )
    }

    #[test]
    fn with_link_shares_untouched_collections() {
        let a = sample();
        let b = a.with_link(Link::new("p1", "p2"));

        assert!(a.nodes().ptr_eq(b.nodes()));
        assert!(a.ports().ptr_eq(b.ports()));
        assert!(!a.links().same_as(b.links()));
        assert_eq!(b.links().len(), 1);
    }

    #[test]
    fn with_port_replaces_by_id() {
        let a = sample();
        let b = a.with_port(Port::sink("p1", "n1"));
        assert_eq!(b.ports().len(), 2);
        assert!(b.ports()[&PortId::from("p1")].is_sink());
        // Earlier snapshot is untouched
        assert!(a.ports()[&PortId::from("p1")].is_emitter());
    }

    #[test]
    fn json_uses_flat_lists() {
        let json = serde_json::to_string(&sample()).expect("encode");
        assert!(json.contains("\"nodes\":[{\"id\":\"n1\"}]"));
        assert!(json.contains("\"nodeId\":\"n1\""));

        let back: Snapshot = serde_json::from_str(&json).expect("decode");
        assert_eq!(back, sample());
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"nodes":[{"id":"n"}]}"#).expect("decode");
        assert_eq!(snapshot.nodes().len(), 1);
        assert!(snapshot.ports().is_empty());
        assert!(snapshot.links().is_empty());
    }
}
