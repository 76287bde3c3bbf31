//! Tracing setup for hosts embedding the compiler.
//!
//! Schema builds log one `info` line per entity; resolvers log at `debug` and
//! `trace`. Hosts that install their own subscriber can skip this module.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Refract crates at `level`, everything else at `warn`.
fn default_directives(level: &str) -> String {
    format!("warn,refract_core={level},refract_db_memory={level},refract_graphql={level}")
}

pub fn init_tracing() -> bool {
    init_tracing_with_level("info")
}

/// Installs a global fmt subscriber with a reloadable filter.
///
/// A valid `RUST_LOG` takes precedence over `level`. Returns `false` when a
/// global subscriber is already installed.
pub fn init_tracing_with_level(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let (filter, handle) = reload::Layer::new(filter);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok();
    if installed {
        let _ = FILTER_HANDLE.set(handle);
    }
    installed
}

/// Replaces the active filter at runtime.
///
/// Accepts a bare level (`debug`) or full filter directives
/// (`refract_graphql=trace,warn`).
pub fn apply_logging_level(level: &str) -> bool {
    let directives = if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        default_directives(level)
    };
    FILTER_HANDLE
        .get()
        .is_some_and(|handle| handle.reload(EnvFilter::new(directives)).is_ok())
}
