//! Integration tests for the flowports CLI layer.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;
use flowports::cli::{
    Cli, Commands, Outcome, QueryKind, QueryOutput, Session, cache_report, cmd_check,
    cmd_convert, execute, json_document, run_query,
};
use flowports::config::{AppConfig, LogFormat};
use flowports::loader::load_snapshot;
use flowports_core::{FlowError, PortId};
use std::io::Write;
use std::str::FromStr;
use tempfile::NamedTempFile;

const SNAPSHOT_JSON: &str = r#"{
  "nodes": [{ "id": "N1" }],
  "ports": [
    { "id": "P1", "nodeId": "N1", "topology": "OUTGOING" },
    { "id": "P2", "nodeId": "N1", "topology": "INCOMING" },
    { "id": "P3", "nodeId": "N99", "topology": "INCOMING", "accessKey": "k1" }
  ],
  "links": [{ "sourceId": "P1", "targetId": "P2" }]
}"#;

fn write_temp(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

fn session() -> Session {
    let file = write_temp(SNAPSHOT_JSON.as_bytes());
    Session::open(file.path(), 1024 * 1024).unwrap()
}

fn port_ids(output: &QueryOutput) -> Vec<String> {
    match output {
        QueryOutput::Ports(ports) => ports.keys().map(PortId::to_string).collect(),
        QueryOutput::Links(_) => panic!("expected ports"),
    }
}

// =============================================================================
// QUERY TESTS
// =============================================================================

#[test]
fn test_query_names_parse() {
    assert_eq!(QueryKind::from_str("free-sinks").unwrap(), QueryKind::FreeSinks);
    assert_eq!(QueryKind::from_str("ports-for-node").unwrap(), QueryKind::PortsForNode);
    assert!(matches!(
        QueryKind::from_str("everything"),
        Err(FlowError::UnknownQuery(_))
    ));
}

#[test]
fn test_free_and_keyed_queries() {
    let session = session();

    let free = run_query(&session, QueryKind::FreeSinks, None).unwrap();
    assert_eq!(port_ids(&free), vec!["P3"]);

    let keyed = run_query(&session, QueryKind::KeyedFreeSinks, None).unwrap();
    assert_eq!(port_ids(&keyed), vec!["P3"]);

    let free_emitters = run_query(&session, QueryKind::FreeEmitters, None).unwrap();
    assert!(free_emitters.is_empty());
}

#[test]
fn test_node_query_requires_node() {
    let session = session();
    let result = run_query(&session, QueryKind::PortsForNode, None);
    assert!(matches!(result, Err(FlowError::MissingArgument(_))));
}

#[test]
fn test_node_query_unknown_node_is_empty() {
    let session = session();
    let output = run_query(&session, QueryKind::SinksForNode, Some("nope")).unwrap();
    assert!(output.is_empty());
}

#[test]
fn test_link_queries() {
    let session = session();
    let outgoing = run_query(&session, QueryKind::Outgoing, Some("N1")).unwrap();
    assert_eq!(outgoing.len(), 1);

    let json = outgoing.to_json();
    assert_eq!(json[0]["sourceId"], "P1");
    assert_eq!(json[0]["targetId"], "P2");
}

#[test]
fn test_repeated_query_hits_cache() {
    let session = session();
    let _ = run_query(&session, QueryKind::Detached, None).unwrap();
    let _ = run_query(&session, QueryKind::Detached, None).unwrap();

    let stats = session.selectors().stats()["detached_ports"];
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

// =============================================================================
// COMMAND TESTS
// =============================================================================

#[test]
fn test_check_reports_detached() {
    let session = session();
    assert_eq!(cmd_check(&session, true).unwrap(), Outcome::Detached);
    assert_eq!(Outcome::Detached.exit_code(), 2);
}

#[test]
fn test_check_clean_snapshot() {
    let file = write_temp(br#"{"nodes":[{"id":"A"}],"ports":[{"id":"a","nodeId":"A","topology":"SOURCE"}]}"#);
    let session = Session::open(file.path(), 1024).unwrap();
    assert_eq!(cmd_check(&session, false).unwrap(), Outcome::Clean);
}

#[test]
fn test_convert_to_binary_and_back() {
    let session = session();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("snapshot.fsnap");

    cmd_convert(&session, false, &out, "binary").unwrap();
    let reloaded = load_snapshot(&out, 1024 * 1024).unwrap();
    assert_eq!(&reloaded, session.snapshot());
}

#[test]
fn test_convert_unknown_format_fails() {
    let session = session();
    let dir = tempfile::tempdir().unwrap();
    let result = cmd_convert(&session, false, &dir.path().join("x"), "yaml");
    assert!(matches!(result, Err(FlowError::InvalidArgument(_))));
    assert!(!dir.path().join("x").exists());
}

#[test]
fn test_oversized_snapshot_rejected() {
    let file = write_temp(SNAPSHOT_JSON.as_bytes());
    let result = load_snapshot(file.path(), 10);
    assert!(matches!(result, Err(FlowError::IoError(_))));
}

#[test]
fn test_missing_snapshot_rejected() {
    let result = load_snapshot(std::path::Path::new("/definitely/not/here.json"), 1024);
    assert!(matches!(result, Err(FlowError::IoError(_))));
}

#[test]
fn test_execute_status() {
    let file = write_temp(SNAPSHOT_JSON.as_bytes());
    let cli = Cli::try_parse_from([
        "flowports",
        "--json-mode",
        "-s",
        file.path().to_str().unwrap(),
        "status",
    ])
    .unwrap();
    assert!(matches!(cli.command, Some(Commands::Status)));
    assert_eq!(execute(cli, &AppConfig::default()).unwrap(), Outcome::Clean);
}

#[test]
fn test_execute_query_args() {
    let cli = Cli::try_parse_from([
        "flowports", "query", "-t", "ports-for-node", "--node", "N1",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Query { query_type, node }) => {
            assert_eq!(query_type, "ports-for-node");
            assert_eq!(node.as_deref(), Some("N1"));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_verbose_json_document_carries_cache_stats() {
    let file = write_temp(SNAPSHOT_JSON.as_bytes());
    let session = Session::open(file.path(), 1024 * 1024)
        .unwrap()
        .with_cache_report(true);
    let _ = run_query(&session, QueryKind::FreeSinks, None).unwrap();
    let _ = run_query(&session, QueryKind::FreeSinks, None).unwrap();

    let document = json_document(&session, serde_json::json!({ "count": 1 }));
    assert_eq!(document["count"], 1);
    assert_eq!(document["cache"]["free_sink_ports"]["hits"], 1);
    assert_eq!(document["cache"]["free_sink_ports"]["misses"], 1);
    // Views never queried are left out.
    assert!(document["cache"].get("detached_ports").is_none());
    assert_eq!(cache_report(&session), document["cache"]);
}

#[test]
fn test_cache_report_off_by_default() {
    let session = session();
    let document = json_document(&session, serde_json::json!({ "count": 0 }));
    assert!(document.get("cache").is_none());
}

#[test]
fn test_verbose_json_stdout_is_single_document() {
    let file = write_temp(SNAPSHOT_JSON.as_bytes());
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_flowports"))
        .args(["-q", "-v", "--json-mode", "-s"])
        .arg(file.path())
        .arg("status")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["port_count"], 3);
    assert!(document["cache"].is_object());
}

// =============================================================================
// CONFIG TESTS
// =============================================================================

#[test]
fn test_config_file_is_loaded() {
    let file = write_temp(b"log_format = \"json\"\nmax_snapshot_bytes = 2048\n");
    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.max_snapshot_bytes, 2048);
    assert!(!config.json_mode);
}

#[test]
fn test_explicit_missing_config_is_error() {
    let result = AppConfig::load(Some(std::path::Path::new("/no/such/flowports.toml")));
    assert!(matches!(result, Err(FlowError::IoError(_))));
}

#[test]
fn test_malformed_config_is_error() {
    let file = write_temp(b"log_format = [\n");
    let result = AppConfig::load(Some(file.path()));
    assert!(matches!(result, Err(FlowError::ConfigError(_))));
}
