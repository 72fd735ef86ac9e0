#![forbid(unsafe_code)]

//! Structured logging hooks.
//!
//! With the `tracing` feature the standard macros are re-exported so widget
//! crates can write `vlist_core::logging::trace!` without depending on
//! `tracing` directly. Without the feature this module is empty and every
//! instrumented call site compiles out.
//!
//! `tracing-json` adds [`init_json_subscriber`] for hosts that want
//! newline-delimited JSON on stderr.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Env var holding the filter directive; `RUST_LOG` is the fallback.
#[cfg(feature = "tracing-json")]
pub const ENV_LOG_FILTER: &str = "VLIST_LOG";

/// Install a global JSON subscriber.
///
/// Filter precedence: `VLIST_LOG`, then `RUST_LOG`, then `info`. Returns
/// `false` when a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let directive = std::env::var(ENV_LOG_FILTER)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
