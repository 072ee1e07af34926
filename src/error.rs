//! Error types for the crate

use std::path::PathBuf;

use thiserror::Error;

/// Broad category of an [`Error`], for callers that need to react differently to
/// bad hyperparameters, bad checkpoints, and a failing environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid hyperparameters, detected when an agent is constructed
    Configuration,
    /// A checkpoint could not be written, read, or understood
    Storage,
    /// The environment failed during `reset` or `step`
    Environment,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid value {value} for `{name}`: must be in the interval {open}{low}, {high}]")]
    OutOfInterval {
        name: &'static str,
        value: f64,
        /// `'['` for a closed lower bound, `'('` for an open one
        open: char,
        low: f64,
        high: f64,
    },

    #[error("bin count for dimension {dim} must be positive")]
    ZeroBins { dim: usize },

    #[error("bounds for dimension {dim} must be finite with low < high, got ({low}, {high})")]
    InvalidBounds { dim: usize, low: f32, high: f32 },

    #[error("got {bins} bin counts but {bounds} bound pairs")]
    DimensionMismatch { bins: usize, bounds: usize },

    #[error("state space must have at least one dimension")]
    NoDimensions,

    #[error("action space must have at least one action")]
    NoActions,

    #[error("failed to {operation} '{}': {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed checkpoint '{}': {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported checkpoint version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("unsupported table dtype '{0}'")]
    UnsupportedDtype(String),

    #[error("table shape {found:?} does not match expected shape {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("table holds {found} values but shape {shape:?} requires {expected}")]
    TableLength {
        shape: Vec<usize>,
        expected: usize,
        found: usize,
    },

    #[error("checkpoint holds an invalid agent: {source}")]
    InvalidCheckpoint {
        #[source]
        source: Box<Error>,
    },

    #[error("failed to export metrics: {0}")]
    Csv(#[from] csv::Error),

    #[error("environment {operation} failed: {message}")]
    Environment {
        operation: &'static str,
        message: String,
    },
}

impl Error {
    /// Construct an [`Error::Environment`] from within an environment implementation
    pub fn environment(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Environment {
            operation,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfInterval { .. }
            | Self::ZeroBins { .. }
            | Self::InvalidBounds { .. }
            | Self::DimensionMismatch { .. }
            | Self::NoDimensions
            | Self::NoActions => ErrorKind::Configuration,
            Self::Io { .. }
            | Self::Serialization { .. }
            | Self::UnsupportedVersion { .. }
            | Self::UnsupportedDtype(_)
            | Self::ShapeMismatch { .. }
            | Self::TableLength { .. }
            | Self::InvalidCheckpoint { .. }
            | Self::Csv(_) => ErrorKind::Storage,
            Self::Environment { .. } => ErrorKind::Environment,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        assert_eq!(Error::NoActions.kind(), ErrorKind::Configuration);
        assert_eq!(
            Error::UnsupportedVersion {
                found: 2,
                expected: 1
            }
            .kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            Error::environment("step", "simulator crashed").kind(),
            ErrorKind::Environment
        );
    }

    #[test]
    fn interval_message_shows_open_bound() {
        let err = Error::OutOfInterval {
            name: "alpha",
            value: 0.0,
            open: '(',
            low: 0.0,
            high: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid value 0 for `alpha`: must be in the interval (0, 1]"
        );
    }

    #[test]
    fn invalid_checkpoint_is_storage() {
        let err = Error::InvalidCheckpoint {
            source: Box::new(Error::NoActions),
        };
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn environment_error_message() {
        let err = Error::environment("reset", "no display");
        assert_eq!(err.to_string(), "environment reset failed: no display");
    }
}
