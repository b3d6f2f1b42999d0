//! Out-of-process evaluator over a stream connection.
//!
//! Each evaluation is one blocking round trip (see [`super::wire`]). There is
//! no timeout and no reconnection: any failure is fatal to the run.

use std::io::{Read, Write};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(unix)]
use std::path::Path;

use pathwise_kernel::StateHandle;
use tracing::{debug, trace};

use super::linear::FeatureEncoder;
use super::wire::{self, VALUE_BYTES};
use super::{EvaluationResult, Evaluator};
use crate::error::{RemoteStage, SearchError};

/// Evaluator that forwards encoded features to a remote model.
///
/// Generic over the stream so tests can drive it over an in-memory pair.
#[derive(Debug)]
pub struct RemoteEvaluator<S, E> {
    stream: S,
    encoder: E,
    round_trips: u64,
}

#[cfg(unix)]
impl<E: FeatureEncoder> RemoteEvaluator<UnixStream, E> {
    /// Connect to a Unix-domain socket at `path`.
    ///
    /// # Errors
    ///
    /// [`SearchError::Remote`] with [`RemoteStage::Connect`] if the connection
    /// is refused.
    pub fn connect(path: &Path, encoder: E) -> Result<Self, SearchError> {
        let stream = UnixStream::connect(path).map_err(|source| SearchError::Remote {
            stage: RemoteStage::Connect,
            source,
        })?;
        debug!(
            event = "remote_connected",
            path = %path.display(),
            n_features = encoder.n_features()
        );
        Ok(Self::new(stream, encoder))
    }
}

impl<S: Read + Write, E: FeatureEncoder> RemoteEvaluator<S, E> {
    pub fn new(stream: S, encoder: E) -> Self {
        Self {
            stream,
            encoder,
            round_trips: 0,
        }
    }

    /// Completed request/response exchanges.
    #[must_use]
    pub fn round_trips(&self) -> u64 {
        self.round_trips
    }

    /// Send one feature vector and wait for the scalar reply.
    ///
    /// # Errors
    ///
    /// Arity mismatch, I/O failure, or the peer closing mid-reply.
    pub fn query(&mut self, features: &[f64]) -> Result<f64, SearchError> {
        let expected = self.encoder.n_features();
        if features.len() != expected {
            return Err(SearchError::FeatureArity {
                expected,
                actual: features.len(),
            });
        }
        wire::write_values(&mut self.stream, features).map_err(|source| SearchError::Remote {
            stage: RemoteStage::Write,
            source,
        })?;
        let mut reply = [0u8; VALUE_BYTES];
        let received =
            wire::read_full(&mut self.stream, &mut reply).map_err(|source| SearchError::Remote {
                stage: RemoteStage::Read,
                source,
            })?;
        if received < VALUE_BYTES {
            return Err(SearchError::PeerClosed {
                received,
                expected: VALUE_BYTES,
            });
        }
        self.round_trips += 1;
        Ok(f64::from_le_bytes(reply))
    }
}

impl<S: Read + Write, E: FeatureEncoder> Evaluator for RemoteEvaluator<S, E> {
    fn name(&self) -> &str {
        "remote"
    }

    fn evaluate(&mut self, state: StateHandle, _g: u64) -> Result<EvaluationResult, SearchError> {
        let Some(features) = self.encoder.encode(state) else {
            return Ok(EvaluationResult::dead_end());
        };
        let scalar = self.query(&features)?;
        trace!(event = "remote_eval", state = %state, scalar);
        Ok(EvaluationResult::value(scalar).with_preferred(self.encoder.preferred_operators(state)))
    }

    fn dead_ends_are_reliable(&self) -> bool {
        false
    }
}
