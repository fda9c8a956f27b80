//! Tracing subscriber setup for the CLI.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Environment variable that switches to indented, span-nested output.
pub const LOG_TREE_ENV: &str = "HEMLOCK_LOG_TREE";

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=hmlc=debug,hml_eval=debug`; set `HEMLOCK_LOG_TREE`
/// to see calls nested under their callers.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os(LOG_TREE_ENV).is_some() {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_writer(std::io::stderr)
                        .with_targets(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
