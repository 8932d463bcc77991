//! Error types for the client binary.

use thiserror::Error;

use crate::{
    config::ConfigError,
    domain::{GatewayError, IdentityError},
};

/// Errors that stop the client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The stored identity could not be read or written
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}
