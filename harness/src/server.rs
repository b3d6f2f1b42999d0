//! Server side of the remote evaluation protocol.
//!
//! Each request is a block of `n_features` little-endian `f64` values, each
//! reply one `f64`. A connection ends when the peer shuts down between
//! requests; a request cut short is an error. Connections are served one at
//! a time.

use std::io::{self, Read, Write};
#[cfg(unix)]
use std::os::unix::net::UnixListener;

use pathwise_search::evaluator::{wire, LinearModel};
use pathwise_search::SearchError;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("connection I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("model evaluation failed: {0}")]
    Model(#[from] SearchError),
}

/// Answer requests on one connection until the peer shuts down.
///
/// Returns the number of requests served.
///
/// # Errors
///
/// [`ServerError::Io`] on a failed or truncated read or write.
pub fn serve_connection<S: Read + Write>(
    stream: &mut S,
    model: &LinearModel,
) -> Result<u64, ServerError> {
    let n_features = model.n_features();
    let mut served = 0;
    while let Some(features) = wire::read_values(stream, n_features)? {
        let value = model.predict(&features)?;
        wire::write_values(stream, &[value])?;
        served += 1;
    }
    debug!(event = "server_connection_closed", served);
    Ok(served)
}

/// Accept connections sequentially, serving each to completion. Stops after
/// `max_connections` when given.
///
/// # Errors
///
/// The first accept or connection failure.
#[cfg(unix)]
pub fn serve(
    listener: &UnixListener,
    model: &LinearModel,
    max_connections: Option<usize>,
) -> Result<u64, ServerError> {
    info!(
        event = "server_start",
        n_features = model.n_features(),
        max_connections
    );
    let mut served = 0;
    for (accepted, stream) in listener.incoming().enumerate() {
        if max_connections.is_some_and(|max| accepted >= max) {
            break;
        }
        let mut stream = stream?;
        served += serve_connection(&mut stream, model)?;
        if max_connections.is_some_and(|max| accepted + 1 >= max) {
            break;
        }
    }
    Ok(served)
}
