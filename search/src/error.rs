//! Typed search errors.
//!
//! `SearchError` covers pre-flight failures (bad configuration) and the one
//! fatal runtime failure: a broken remote evaluator. Normal terminations
//! (goal found, frontier exhausted, dead-end initial state) are expressed via
//! [`crate::engine::SearchStatus`] and [`crate::engine::FailureReason`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid search configuration: {detail}")]
    InvalidConfig { detail: String },

    /// The configuration file could not be read.
    #[error("cannot read configuration {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::config::SearchConfig`].
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Connecting to, writing to or reading from a remote evaluator failed.
    #[error("remote evaluator {stage} failed: {source}")]
    Remote {
        stage: RemoteStage,
        #[source]
        source: std::io::Error,
    },

    /// The remote evaluator closed the connection mid-search.
    #[error("remote evaluator closed the connection after {received} of {expected} bytes")]
    PeerClosed { received: usize, expected: usize },

    /// A feature encoder produced the wrong number of features.
    #[error("feature vector has {actual} values, protocol expects {expected}")]
    FeatureArity { expected: usize, actual: usize },

    /// A model file could not be read or parsed.
    #[error("cannot load model {path}: {detail}")]
    Model { path: PathBuf, detail: String },

    /// Writing a checkpoint failed. Loading never fails (defaults are used).
    #[error("cannot write checkpoint {path}: {source}")]
    CheckpointWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which part of a remote round trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStage {
    Connect,
    Write,
    Read,
}

impl std::fmt::Display for RemoteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Write => write!(f, "write"),
            Self::Read => write!(f, "read"),
        }
    }
}

impl SearchError {
    pub(crate) fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidConfig {
            detail: detail.into(),
        }
    }
}
