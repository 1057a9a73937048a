//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::Outcome;
use crate::loader::{SnapshotFormat, load_snapshot, save_snapshot};
use flowports_core::{
    FlowError, GraphMetrics, LinkList, NodeId, PortMap, PortSelectors, Shared, Snapshot,
};
use std::path::Path;
use std::str::FromStr;

// =============================================================================
// SESSION
// =============================================================================

/// A loaded snapshot together with the selectors deriving from it.
pub struct Session {
    snapshot: Snapshot,
    selectors: PortSelectors,
    report_cache: bool,
}

impl Session {
    /// Load the snapshot at `path`.
    pub fn open(path: &Path, max_bytes: u64) -> Result<Self, FlowError> {
        Ok(Self::new(load_snapshot(path, max_bytes)?))
    }

    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            selectors: PortSelectors::new(),
            report_cache: false,
        }
    }

    /// Attach per-view cache counters to every JSON document printed.
    #[must_use]
    pub fn with_cache_report(mut self, enabled: bool) -> Self {
        self.report_cache = enabled;
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn selectors(&self) -> &PortSelectors {
        &self.selectors
    }

    #[must_use]
    pub fn metrics(&self) -> GraphMetrics {
        GraphMetrics::from_snapshot(&self.selectors, &self.snapshot)
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Query names accepted by `flowports query -t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    PortsForNode,
    Emitters,
    Sinks,
    EmittersForNode,
    SinksForNode,
    FreeSinks,
    FreeEmitters,
    KeyedFreeSinks,
    Detached,
    Outgoing,
    Incoming,
}

impl QueryKind {
    /// True for queries that take a node id.
    #[must_use]
    pub fn needs_node(self) -> bool {
        matches!(
            self,
            QueryKind::PortsForNode
                | QueryKind::EmittersForNode
                | QueryKind::SinksForNode
                | QueryKind::Outgoing
                | QueryKind::Incoming
        )
    }
}

impl FromStr for QueryKind {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "ports-for-node" => QueryKind::PortsForNode,
            "emitters" => QueryKind::Emitters,
            "sinks" => QueryKind::Sinks,
            "emitters-for-node" => QueryKind::EmittersForNode,
            "sinks-for-node" => QueryKind::SinksForNode,
            "free-sinks" => QueryKind::FreeSinks,
            "free-emitters" => QueryKind::FreeEmitters,
            "keyed-free-sinks" => QueryKind::KeyedFreeSinks,
            "detached" => QueryKind::Detached,
            "outgoing" => QueryKind::Outgoing,
            "incoming" => QueryKind::Incoming,
            other => return Err(FlowError::UnknownQuery(other.to_string())),
        };
        Ok(kind)
    }
}

/// Result of one query.
#[derive(Debug, Clone)]
pub enum QueryOutput {
    Ports(Shared<PortMap>),
    Links(Shared<LinkList>),
}

impl QueryOutput {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            QueryOutput::Ports(ports) => ports.len(),
            QueryOutput::Links(links) => links.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON array of the ports or links.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            QueryOutput::Ports(ports) => {
                serde_json::json!(ports.values().collect::<Vec<_>>())
            }
            QueryOutput::Links(links) => serde_json::json!(&**links),
        }
    }
}

/// Run `kind` against the session snapshot.
pub fn run_query(
    session: &Session,
    kind: QueryKind,
    node: Option<&str>,
) -> Result<QueryOutput, FlowError> {
    let selectors = session.selectors();
    let snapshot = session.snapshot();

    let node_id = if kind.needs_node() {
        Some(NodeId::new(node.ok_or(FlowError::MissingArgument("--node"))?))
    } else {
        None
    };

    let output = match (kind, node_id.as_ref()) {
        (QueryKind::PortsForNode, Some(id)) => {
            QueryOutput::Ports(selectors.ports_for_node(snapshot, id))
        }
        (QueryKind::EmittersForNode, Some(id)) => {
            QueryOutput::Ports(selectors.emitter_ports_for_node(snapshot, id))
        }
        (QueryKind::SinksForNode, Some(id)) => {
            QueryOutput::Ports(selectors.sink_ports_for_node(snapshot, id))
        }
        (QueryKind::Outgoing, Some(id)) => {
            QueryOutput::Links(selectors.outgoing_links(snapshot, id))
        }
        (QueryKind::Incoming, Some(id)) => {
            QueryOutput::Links(selectors.incoming_links(snapshot, id))
        }
        (QueryKind::Emitters, _) => QueryOutput::Ports(selectors.emitter_ports(snapshot)),
        (QueryKind::Sinks, _) => QueryOutput::Ports(selectors.sink_ports(snapshot)),
        (QueryKind::FreeSinks, _) => QueryOutput::Ports(selectors.free_sink_ports(snapshot)),
        (QueryKind::FreeEmitters, _) => {
            QueryOutput::Ports(selectors.free_emitter_ports(snapshot))
        }
        (QueryKind::KeyedFreeSinks, _) => {
            QueryOutput::Ports(selectors.keyed_free_sink_ports(snapshot))
        }
        (QueryKind::Detached, _) => QueryOutput::Ports(selectors.detached_ports(snapshot)),
        (_, None) => return Err(FlowError::MissingArgument("--node")),
    };

    tracing::debug!(?kind, results = output.len(), "query executed");
    Ok(output)
}

fn print_output(output: &QueryOutput) {
    match output {
        QueryOutput::Ports(ports) => {
            for port in ports.values() {
                println!(
                    "{:<24} node={:<16} {:<8} {}",
                    port.id,
                    port.node_id,
                    port.topology,
                    port.access_key.as_deref().unwrap_or("")
                );
            }
        }
        QueryOutput::Links(links) => {
            for link in links.iter() {
                println!("{} -> {}", link.source_id, link.target_id);
            }
        }
    }
}

/// Per-view cache counters as a JSON object, skipping views never queried.
#[must_use]
pub fn cache_report(session: &Session) -> serde_json::Value {
    let used: serde_json::Map<String, serde_json::Value> = session
        .selectors()
        .stats()
        .into_iter()
        .filter(|(_, stats)| stats.hits > 0 || stats.misses > 0)
        .map(|(view, stats)| (view.to_string(), serde_json::json!(stats)))
        .collect();
    serde_json::Value::Object(used)
}

/// Final JSON document for a command, with the cache report when enabled.
#[must_use]
pub fn json_document(session: &Session, mut value: serde_json::Value) -> serde_json::Value {
    if session.report_cache {
        if let Some(object) = value.as_object_mut() {
            object.insert("cache".to_string(), cache_report(session));
        }
    }
    value
}

fn print_json(session: &Session, value: serde_json::Value) {
    let document = json_document(session, value);
    println!("{}", serde_json::to_string_pretty(&document).unwrap_or_default());
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show snapshot metrics.
pub fn cmd_status(session: &Session, json_mode: bool) -> Result<Outcome, FlowError> {
    let metrics = session.metrics();

    if json_mode {
        print_json(session, serde_json::json!(metrics));
        return Ok(Outcome::Clean);
    }

    println!("flowports Snapshot Status");
    println!("=========================");
    println!("Nodes:            {}", metrics.node_count);
    println!("Ports:            {}", metrics.port_count);
    println!("Links:            {}", metrics.link_count);
    println!();
    println!("Emitters:         {} ({} free)", metrics.emitter_count, metrics.free_emitter_count);
    println!("Sinks:            {} ({} free)", metrics.sink_count, metrics.free_sink_count);
    println!("Keyed free sinks: {}", metrics.keyed_free_sink_count);
    println!("Unknown topology: {}", metrics.unknown_topology_count);
    println!("Detached ports:   {}", metrics.detached_count);

    Ok(Outcome::Clean)
}

// =============================================================================
// QUERY COMMAND
// =============================================================================

/// Execute a query.
pub fn cmd_query(
    session: &Session,
    json_mode: bool,
    query_type: &str,
    node: Option<&str>,
) -> Result<Outcome, FlowError> {
    let kind = QueryKind::from_str(query_type)?;
    let output = run_query(session, kind, node)?;

    if json_mode {
        print_json(
            session,
            serde_json::json!({
                "query": query_type,
                "node": node,
                "count": output.len(),
                "results": output.to_json(),
            }),
        );
    } else if output.is_empty() {
        println!("No results");
    } else {
        print_output(&output);
    }

    Ok(Outcome::Clean)
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Report detached ports.
///
/// Detached ports are a warning, not a failure: the command succeeds and
/// returns `Outcome::Detached` so the binary can exit with a distinct code.
pub fn cmd_check(session: &Session, json_mode: bool) -> Result<Outcome, FlowError> {
    let detached = session.selectors().detached_ports(session.snapshot());

    for port in detached.values() {
        tracing::warn!(port = %port.id, node = %port.node_id, "detached port");
    }

    if json_mode {
        print_json(
            session,
            serde_json::json!({
                "consistent": detached.is_empty(),
                "detached": detached.values().collect::<Vec<_>>(),
            }),
        );
    } else if detached.is_empty() {
        println!("OK: every port references an existing node");
    } else {
        println!("{} detached port(s):", detached.len());
        print_output(&QueryOutput::Ports(detached.clone()));
    }

    if detached.is_empty() {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::Detached)
    }
}

// =============================================================================
// CONVERT COMMAND
// =============================================================================

/// Re-encode the snapshot to `output`.
pub fn cmd_convert(
    session: &Session,
    json_mode: bool,
    output: &Path,
    format: &str,
) -> Result<Outcome, FlowError> {
    let format = SnapshotFormat::from_str(format)?;
    save_snapshot(session.snapshot(), output, format)?;

    if json_mode {
        print_json(
            session,
            serde_json::json!({
                "written": output.display().to_string(),
                "format": format.name(),
            }),
        );
    } else {
        println!("Snapshot written to {:?}", output);
    }
    Ok(Outcome::Clean)
}

// =============================================================================
// CACHE STATISTICS
// =============================================================================

/// Print per-view cache counters.
pub fn print_cache_stats(session: &Session) {
    println!();
    println!("Cache statistics:");
    for (view, stats) in session.selectors().stats() {
        if stats.hits == 0 && stats.misses == 0 {
            continue;
        }
        println!(
            "  {:<24} hits={} misses={} invalidations={}",
            view, stats.hits, stats.misses, stats.invalidations
        );
    }
}
