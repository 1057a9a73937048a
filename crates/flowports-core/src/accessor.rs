//! # Graph Store Accessor
//!
//! Extracts the three base collections from a snapshot, unchanged.
//! These are the roots of every derivation in [`crate::selectors`].

use crate::{LinkList, NodeMap, PortMap, Shared, Snapshot};

/// The node collection of a snapshot.
#[must_use]
pub fn get_nodes(snapshot: &Snapshot) -> &Shared<NodeMap> {
    snapshot.nodes()
}

/// The port collection of a snapshot.
#[must_use]
pub fn get_ports(snapshot: &Snapshot) -> &Shared<PortMap> {
    snapshot.ports()
}

/// The link collection of a snapshot.
#[must_use]
pub fn get_links(snapshot: &Snapshot) -> &Shared<LinkList> {
    snapshot.links()
}
