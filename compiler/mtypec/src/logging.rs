//! Tracing initialization for the `mtype` CLI.
//!
//! Controlled by `MTYPE_LOG` (falling back to `RUST_LOG`); defaults to
//! `warn` when neither is set.

use std::sync::OnceLock;

static INIT: OnceLock<()> = OnceLock::new();

/// Safe to call multiple times — only the first call takes effect.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("MTYPE_LOG")
            .or_else(|_| tracing_subscriber::EnvFilter::try_from_env("RUST_LOG"))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    });
}
