#![forbid(unsafe_code)]

//! Core: geometry, configuration, deferred scheduling and logging.
//!
//! # Role in vlist
//! `vlist-core` holds the host-agnostic pieces every collection view needs
//! regardless of how it virtualizes its items. It has no knowledge of items,
//! pools or scroll surfaces; `vlist-widgets` builds those on top.
//!
//! # Primary responsibilities
//! - **Geometry**: float [`Vec2`](geometry::Vec2) / [`Size`](geometry::Size)
//!   and pixel-grid rounding.
//! - **Configuration**: [`VirtualizationConfig`](config::VirtualizationConfig)
//!   with env-var overrides and collected validation diagnostics.
//! - **Scheduling**: [`Scheduler`](schedule::Scheduler), an owned, deduplicated
//!   one-shot work set used to coalesce expensive layout passes.
//! - **Errors**: the crate-wide [`Error`](error::Error).
//! - **Logging**: tracing re-exports and subscriber setup (feature-gated).

pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod schedule;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

pub use config::VirtualizationConfig;
pub use error::{ConfigError, Error, Result};
pub use geometry::{Size, Vec2, round_to_pixel_grid};
pub use schedule::{ScheduleHandle, Scheduler};
