//! # flowports - Snapshot Port Inspector
//!
//! The main binary for the flowports derivation layer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/flowports (THE BINARY)       │
//! │                                              │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//! │  │   CLI    │   │  config  │   │  loader  │  │
//! │  │  (clap)  │   │  (toml)  │   │ (fs I/O) │  │
//! │  └────┬─────┘   └────┬─────┘   └────┬─────┘  │
//! │       └──────────────┼──────────────┘        │
//! │                      ▼                       │
//! │             ┌────────────────┐               │
//! │             │ flowports-core │               │
//! │             │  (THE LOGIC)   │               │
//! │             └────────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! flowports -s graph.json status
//! flowports -s graph.json query -t free-sinks
//! flowports -s graph.json query -t ports-for-node --node N1
//! flowports -s graph.json check
//! flowports -s graph.json convert -o graph.fsnap -t binary
//! ```

use clap::Parser;
use flowports::cli;
use flowports::config::{AppConfig, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // Config errors are reported after logging is up, using default settings.
    let (config, config_error) = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => (config.with_env(), None),
        Err(e) => (AppConfig::default().with_env(), Some(e)),
    };

    init_tracing(config.log_format, cli.quiet);

    if let Some(e) = config_error {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }

    match cli::execute(cli, &config) {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Initialize tracing. `RUST_LOG` takes precedence over the defaults.
fn init_tracing(format: LogFormat, quiet: bool) {
    let default_filter = if quiet { "flowports=warn" } else { "flowports=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so command output on stdout stays parseable.
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
