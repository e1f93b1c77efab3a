use thiserror::Error;

use crate::environment::RightType;
use crate::functional::MarshalError;
use crate::transport::TransportError;

/// Local model violations. Raised without any remote involvement.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid name {0:?}: must be a non-empty path segment without whitespace")]
    InvalidName(String),

    #[error("Phase already exists: {0}")]
    DuplicatePhase(String),

    #[error("Phase not found: {0}")]
    UnknownPhase(String),
}

/// Everything a functional service client operation can fail with.
///
/// `NotRegistered`, `Validation`, `Unauthorized` and `Unsupported` are
/// raised before any request leaves the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Client is not registered. Call `register` first.")]
    NotRegistered,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{right} on {service} is not permitted in this environment")]
    Unauthorized { right: RightType, service: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Marshalling error: {0}")]
    Marshal(#[from] MarshalError),
}

impl ClientError {
    /// True when the failure came from the remote side or the network.
    pub fn is_remote(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}
