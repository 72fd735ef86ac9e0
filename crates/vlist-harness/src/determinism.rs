#![forbid(unsafe_code)]

//! Seeded scroll scripts and JSONL event logging.
//!
//! Scenario tests replay a script of host events against a controller. The
//! script is a pure function of its seed, so a failing run is reproduced by
//! exporting the seed it logged:
//!
//! ```text
//! VLIST_TEST_SEED=1234 cargo test -p vlist-harness --test dynamic_height_scenarios
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value, json};

/// Choose a seed from the environment or use `default_seed`.
#[must_use]
pub fn fixture_seed(default_seed: u64) -> u64 {
    env_u64("VLIST_TEST_SEED")
        .or_else(|| env_u64("E2E_SEED"))
        .unwrap_or(default_seed)
}

/// JSONL logging is on under CI or when `VLIST_E2E_JSONL` is set.
#[must_use]
pub fn jsonl_enabled() -> bool {
    env_flag("VLIST_E2E_JSONL") || std::env::var("CI").is_ok()
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> bool {
    matches!(
        std::env::var(key).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    )
}

/// Small deterministic generator for script data.
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        self.0
    }

    /// Uniform in `0..max` (`0` when `max == 0`).
    pub fn below(&mut self, max: u64) -> u64 {
        if max == 0 {
            0
        } else {
            (self.next_u64() >> 16) % max
        }
    }

    /// Uniform in `[lo, hi)`.
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        let unit = (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32;
        lo + (hi - lo) * unit
    }
}

/// One host event in a scroll script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptStep {
    /// User scroll to an absolute offset.
    ScrollTo(f32),
    /// User scroll relative to the current offset.
    ScrollBy(f32),
    ScrollToItem(usize),
    ScrollToLast,
    /// Viewport height change (new layout pass).
    Resize(f32),
    Refresh,
}

impl ScriptStep {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ScrollTo(_) => "scroll_to",
            Self::ScrollBy(_) => "scroll_by",
            Self::ScrollToItem(_) => "scroll_to_item",
            Self::ScrollToLast => "scroll_to_last",
            Self::Resize(_) => "resize",
            Self::Refresh => "refresh",
        }
    }
}

/// Deterministic script over a collection of `item_count` items whose
/// content is roughly `content_height` tall.
#[must_use]
pub fn scroll_script(
    seed: u64,
    steps: usize,
    item_count: usize,
    content_height: f32,
) -> Vec<ScriptStep> {
    let mut rng = Lcg::new(seed);
    let mut script = Vec::with_capacity(steps);
    for _ in 0..steps {
        let step = match rng.below(20) {
            0..=6 => ScriptStep::ScrollBy(rng.range_f32(-400.0, 400.0)),
            7..=11 => ScriptStep::ScrollTo(rng.range_f32(0.0, content_height.max(1.0))),
            12..=15 => ScriptStep::ScrollToItem(rng.below(item_count as u64) as usize),
            16 => ScriptStep::ScrollToLast,
            17 | 18 => ScriptStep::Resize(rng.range_f32(80.0, 600.0).round()),
            _ => ScriptStep::Refresh,
        };
        script.push(step);
    }
    script
}

/// Collects JSONL events for one test run and echoes them to stderr when
/// [`jsonl_enabled`].
#[derive(Debug)]
pub struct EventLog {
    run_id: String,
    seq: AtomicU64,
    lines: Vec<String>,
    echo: bool,
}

impl EventLog {
    #[must_use]
    pub fn new(prefix: &str, seed: u64) -> Self {
        Self {
            run_id: format!("{prefix}_seed{seed}"),
            seq: AtomicU64::new(0),
            lines: Vec::new(),
            echo: jsonl_enabled(),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Record `event` with `fields` (must be a JSON object; other values are
    /// stored under `"value"`).
    pub fn log(&mut self, event: &str, fields: Value) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let mut record = Map::new();
        record.insert("run_id".into(), json!(self.run_id));
        record.insert("seq".into(), json!(seq));
        record.insert("event".into(), json!(event));
        match fields {
            Value::Object(map) => record.extend(map),
            Value::Null => {}
            other => {
                record.insert("value".into(), other);
            }
        }
        let line = Value::Object(record).to_string();
        if self.echo {
            eprintln!("{line}");
        }
        self.lines.push(line);
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
