use thiserror::Error;

/// Failure of a graph operation.
///
/// "No path" and "disconnected" are ordinary outcomes reported as `Ok(None)`,
/// not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Self-loops, negative weights, duplicate vertices and out of range parameters
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A vertex or edge the operation refers to is not in the graph
    #[error("not found: {0}")]
    NotFound(String),
    /// The graph does not support the requested operation
    #[error("invalid state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    InvalidState,
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
        }
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
