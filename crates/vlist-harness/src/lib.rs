#![forbid(unsafe_code)]

//! Test harness for vlist collection views.
//!
//! # Role in vlist
//! Controllers only react to host events. This crate supplies a scripted
//! host: a recording source and surface, a layout simulator that measures
//! wrappers and ticks deferred work, structural invariant checks and seeded
//! scroll scripts with JSONL logging.

pub mod determinism;
pub mod fixtures;
pub mod invariants;
pub mod layout_sim;

pub use determinism::{EventLog, Lcg, ScriptStep, fixture_seed, scroll_script};
pub use fixtures::{RecordingSource, SourceStats, TestElement, TestSurface};
pub use invariants::{check_window, covers_viewport};
pub use layout_sim::{LayoutSim, SettleReport};
