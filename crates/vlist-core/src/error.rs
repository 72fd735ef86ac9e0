#![forbid(unsafe_code)]

//! Error types.
//!
//! Virtualization itself never fails at runtime: out-of-range indices,
//! NaN geometry and missing data are handled by early returns so a single
//! bad frame cannot abort rendering of a whole view. Errors are reserved for
//! construction-time validation and persisted-state decoding.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Surfaced as |
//! |---------|-------|-------------|
//! | Bad fixed height | NaN, infinite, zero or negative | [`Error::InvalidItemHeight`] |
//! | Bad tunable | Env override or builder value out of range | [`Error::Config`] |
//! | Corrupt view data | Persisted JSON cannot be decoded | [`Error::Persistence`] |

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from vlist construction and persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A fixed item height that cannot drive index/offset math.
    InvalidItemHeight(f32),
    /// One or more configuration values failed validation.
    Config(Vec<ConfigError>),
    /// Persisted view state could not be encoded or decoded.
    Persistence(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidItemHeight(h) => {
                write!(f, "invalid item height {h}: expected a finite value > 0")
            }
            Self::Config(errors) => {
                write!(f, "invalid configuration")?;
                for (i, err) in errors.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { "; " };
                    write!(f, "{sep}{err}")?;
                }
                Ok(())
            }
            Self::Persistence(msg) => write!(f, "view state persistence error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<Vec<ConfigError>> for Error {
    fn from(errors: Vec<ConfigError>) -> Self {
        Self::Config(errors)
    }
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(
        field: &'static str,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}
