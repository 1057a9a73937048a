//! # flowports-core
//!
//! The memoized derivation layer over flow-graph snapshots - THE LOGIC.
//!
//! Given an immutable [`Snapshot`] of nodes, ports and links, this crate
//! answers which ports belong to a node, which are emitters or sinks, which
//! are free (unlinked), and which reference a node that no longer exists.
//!
//! ## Architecture
//!
//! ```text
//! Snapshot ─> accessor ─┬─> classifier ───┐
//!                       └─> connectivity ─┼─> cache / selectors ─> consumer
//!                           integrity <───┘
//! ```
//!
//! ## Constraints
//!
//! - Read-only: snapshots are never mutated, only derived from
//! - Total: queries return empty results for unknown ids, never errors
//! - Synchronous: no async, no I/O
//!
//! ## Example
//!
//! ```
//! use flowports_core::{Link, Node, NodeId, Port, PortSelectors, Snapshot};
//!
//! let snapshot = Snapshot::from_parts(
//!     [Node::new("n1")],
//!     [Port::source("out", "n1"), Port::sink("in", "n1")],
//!     [],
//! );
//! let selectors = PortSelectors::new();
//! assert_eq!(selectors.free_sink_ports(&snapshot).len(), 1);
//!
//! let linked = snapshot.with_link(Link::new("out", "in"));
//! assert!(selectors.free_sink_ports(&linked).is_empty());
//! assert_eq!(selectors.ports_for_node(&linked, &NodeId::new("n1")).len(), 2);
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod accessor;
pub mod cache;
pub mod classifier;
pub mod connectivity;
pub mod formats;
pub mod integrity;
pub mod primitives;
pub mod selectors;
pub mod shared;
pub mod snapshot;
pub mod system;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{FlowError, Link, LinkList, Node, NodeId, NodeMap, Port, PortId, PortMap, Topology};

// =============================================================================
// RE-EXPORTS: Snapshot & Derivations
// =============================================================================

pub use cache::{CacheStats, KeyedMemo, Memo, Upstream, View};
pub use selectors::PortSelectors;
pub use shared::Shared;
pub use snapshot::{SerializableSnapshot, Snapshot};

// =============================================================================
// RE-EXPORTS: Formats & System
// =============================================================================

pub use formats::{SnapshotHeader, is_binary_snapshot, snapshot_from_bytes, snapshot_to_bytes};
pub use system::GraphMetrics;
