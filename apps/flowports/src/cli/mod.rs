//! # flowports CLI Module
//!
//! This module implements the CLI interface for flowports.
//!
//! ## Available Commands
//!
//! - `status` - Show snapshot metrics
//! - `query` - Run one port or link query
//! - `check` - Report detached ports
//! - `convert` - Re-encode a snapshot as JSON or binary

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use flowports_core::FlowError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// flowports - port connectivity of flow-graph snapshots
///
/// Loads one snapshot (nodes, ports, links) and answers derived queries
/// such as free ports and detached ports.
#[derive(Parser, Debug)]
#[command(name = "flowports")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (cache statistics after each command)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the snapshot file (JSON or binary)
    #[arg(short, long, global = true, default_value = "snapshot.json")]
    pub snapshot: PathBuf,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show snapshot metrics
    Status,

    /// Execute a query on the snapshot
    Query {
        /// Query type (ports-for-node, emitters, sinks, emitters-for-node,
        /// sinks-for-node, free-sinks, free-emitters, keyed-free-sinks,
        /// detached, outgoing, incoming)
        #[arg(short = 't', long)]
        query_type: String,

        /// Node ID (for node-keyed queries)
        #[arg(short, long)]
        node: Option<String>,
    },

    /// Report ports whose node is missing
    Check,

    /// Re-encode the snapshot
    Convert {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (json, binary)
        #[arg(short = 't', long, default_value = "json")]
        format: String,
    },
}

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report.
    Clean,
    /// The snapshot has detached ports (reported by `check`).
    Detached,
}

impl Outcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Clean => 0,
            Outcome::Detached => 2,
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and resolved configuration.
pub fn execute(cli: Cli, config: &AppConfig) -> Result<Outcome, FlowError> {
    let json_mode = cli.json_mode || config.json_mode;
    let session = Session::open(&cli.snapshot, config.max_snapshot_bytes)?
        .with_cache_report(cli.verbose && json_mode);

    let outcome = match cli.command {
        Some(Commands::Status) | None => cmd_status(&session, json_mode),
        Some(Commands::Query { query_type, node }) => {
            cmd_query(&session, json_mode, &query_type, node.as_deref())
        }
        Some(Commands::Check) => cmd_check(&session, json_mode),
        Some(Commands::Convert { output, format }) => {
            cmd_convert(&session, json_mode, &output, &format)
        }
    }?;

    // In JSON mode the counters are part of the printed document.
    if cli.verbose && !json_mode {
        print_cache_stats(&session);
    }
    Ok(outcome)
}
