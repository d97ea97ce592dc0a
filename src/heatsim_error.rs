//! HeatsimError: Unified error type for heatsim public APIs
//!
//! Every phase of a distributed run (topology, distribution, halo exchange,
//! collection) reports failures through [`HeatsimError`]. Transport failures
//! are carried as a [`CommError`] source so the message names both the phase
//! and the call that failed.

use thiserror::Error;

/// Point-to-point transport failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommError {
    /// Peer rank is not part of the communicator.
    #[error("peer rank {peer} out of range for communicator of size {size}")]
    PeerOutOfRange { peer: usize, size: usize },
    /// The receive completed without data.
    #[error("no message received from rank {peer} (tag {tag})")]
    RecvFailed { peer: usize, tag: u16 },
    /// The received payload does not have the expected byte length.
    #[error("message from rank {peer} (tag {tag}): expected {expected} bytes, got {actual}")]
    LengthMismatch {
        peer: usize,
        tag: u16,
        expected: usize,
        actual: usize,
    },
    /// Failure reported by the MPI backend.
    #[error("MPI: {0}")]
    Mpi(String),
}

/// Unified error type for heatsim operations.
///
/// All variants are fatal to a run: a lost message leaves neighbouring ranks
/// in inconsistent states, so nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeatsimError {
    /// Bad process-grid shape or rank.
    #[error("topology error: {0}")]
    Topology(String),
    /// Transport failure while scattering sub-grids.
    #[error("distribution error: {op} (rank {peer}): {source}")]
    Distribution {
        op: &'static str,
        peer: usize,
        #[source]
        source: CommError,
    },
    /// No sub-grid staged for a coordinate, or the global grid cannot be split.
    #[error("distribution error: no sub-grid at coordinate ({x}, {y})")]
    MissingSubGrid { x: usize, y: usize },
    /// Transport failure during a border exchange.
    #[error("halo exchange error: {op} (rank {peer}): {source}")]
    HaloExchange {
        op: &'static str,
        peer: usize,
        #[source]
        source: CommError,
    },
    /// Transport failure while gathering results.
    #[error("collection error: {op} (rank {peer}): {source}")]
    Collection {
        op: &'static str,
        peer: usize,
        #[source]
        source: CommError,
    },
    /// Grid shape or padding violates the operation's precondition.
    #[error("grid shape error: {0}")]
    GridShape(String),
    /// Invalid run configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
