// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Interactive path store session over stdin/stdout.
//!
//! # Run
//!
//! ```bash
//! cargo run --example repl
//!
//! # With a JSON config and debug logging
//! RUST_LOG=path_store=debug cargo run --example repl -- store.json
//! ```
//!
//! Example `store.json`:
//!
//! ```json
//! { "child_order": "ascending", "verify_invariants": true }
//! ```
//!
//! Logs go to stderr so stdout carries only command output.

use std::io;

use path_store::{PathStore, Session, StoreConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = match std::env::args().nth(1) {
        Some(file) => StoreConfig::from_json(&std::fs::read_to_string(&file)?)?,
        None => StoreConfig::default(),
    };
    tracing::info!(?config, "Starting path store session");

    let stdout = io::stdout();
    let mut session = Session::new(PathStore::with_config(config), stdout.lock());
    session.run(io::stdin().lock())?;

    tracing::info!(entries = session.store().len(), "Session ended");
    Ok(())
}
