//! # Core Type Definitions
//!
//! This module contains the entity types read by the derivation layer:
//! - Identifiers (`NodeId`, `PortId`)
//! - Graph entities (`Node`, `Port`, `Link`) and port `Topology`
//! - Collection aliases (`NodeMap`, `PortMap`, `LinkList`)
//! - Error types (`FlowError`)
//!
//! ## Ownership
//!
//! Entities are created and destroyed exclusively by the external state layer.
//! A `Port` refers to its node by id only, and a `Link` refers to its two
//! ports by id only. Nothing in this crate resolves or repairs those references.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a node in the flow graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a port in the flow graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub String);

impl PortId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for PortId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// NODE
// =============================================================================

/// A node of the flow graph. Only its identity matters to the derivations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
}

impl Node {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
        }
    }
}

// =============================================================================
// PORT
// =============================================================================

/// Role of a port in the data flow.
///
/// Wire names follow the editor's constants (`OUTGOING` / `INCOMING`);
/// `SOURCE` / `SINK` are accepted as aliases. Any other value decodes to
/// `Unknown`, which classifies as neither emitter nor sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Emits data ("emitter").
    #[serde(rename = "OUTGOING", alias = "SOURCE")]
    Source,
    /// Receives data.
    #[serde(rename = "INCOMING", alias = "SINK")]
    Sink,
    #[serde(rename = "UNKNOWN", other)]
    Unknown,
}

impl Topology {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Topology::Source => "OUTGOING",
            Topology::Sink => "INCOMING",
            Topology::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A port attached (by reference) to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: PortId,
    /// Owning node. May dangle; see `integrity::detached_ports`.
    pub node_id: NodeId,
    pub topology: Topology,
    /// Marks a sink port as addressable by an external trigger.
    #[serde(default)]
    pub access_key: Option<String>,
}

impl Port {
    #[must_use]
    pub fn new(id: impl Into<String>, node_id: impl Into<String>, topology: Topology) -> Self {
        Self {
            id: PortId::new(id),
            node_id: NodeId::new(node_id),
            topology,
            access_key: None,
        }
    }

    /// Shorthand for a `Source` port.
    #[must_use]
    pub fn source(id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self::new(id, node_id, Topology::Source)
    }

    /// Shorthand for a `Sink` port.
    #[must_use]
    pub fn sink(id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self::new(id, node_id, Topology::Sink)
    }

    #[must_use]
    pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn is_emitter(&self) -> bool {
        self.topology == Topology::Source
    }

    #[must_use]
    pub fn is_sink(&self) -> bool {
        self.topology == Topology::Sink
    }

    /// True when the port carries a non-empty access key.
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        self.access_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

// =============================================================================
// LINK
// =============================================================================

/// A directed association from a source port to a sink port.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source_id: PortId,
    pub target_id: PortId,
}

impl Link {
    #[must_use]
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: PortId::new(source_id),
            target_id: PortId::new(target_id),
        }
    }
}

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Node collection keyed by node id.
pub type NodeMap = BTreeMap<NodeId, Node>;

/// Port collection keyed by port id. Every port query returns one of these.
pub type PortMap = BTreeMap<PortId, Port>;

/// Ordered link collection.
pub type LinkList = Vec<Link>;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised at the edges of the system (decoding, files, configuration).
///
/// Queries themselves never fail; an unknown id yields an empty result.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A snapshot could not be encoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A snapshot could not be decoded.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The configuration file is malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The requested query name is not recognized.
    #[error("Unknown query type: {0}")]
    UnknownQuery(String),

    /// A command-line argument has a value that is not accepted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A query was invoked without an argument it needs.
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
}

// =============================================================================
// TESTS
// =============================================================================
