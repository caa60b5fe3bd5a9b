//! Error taxonomy for the APF library.
//!
//! Configuration and lookup failures are the only fatal errors in this crate;
//! per-tick conditions (an unavailable peer, a reported collision) are logged
//! and recovered locally by the controller instead of surfacing here.

use pyo3::exceptions::{PyIOError, PyIndexError, PyValueError};
use pyo3::PyErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApfError {
    #[error("failed to read mission file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mission file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("agent id {id} out of range for mission with {count} agents")]
    AgentIdOutOfRange { id: usize, count: usize },

    #[error("peer id {id} out of range for snapshot of {count} agents")]
    PeerIndexOutOfRange { id: usize, count: usize },
}

impl From<ApfError> for PyErr {
    fn from(err: ApfError) -> PyErr {
        match err {
            ApfError::Io { .. } => PyIOError::new_err(err.to_string()),
            ApfError::AgentIdOutOfRange { .. } | ApfError::PeerIndexOutOfRange { .. } => {
                PyIndexError::new_err(err.to_string())
            }
            ApfError::Parse(_) | ApfError::InvalidConfig(_) => {
                PyValueError::new_err(err.to_string())
            }
        }
    }
}
