use thiserror::Error;
use zendulge_config::ConfigError;

use crate::api::GatewayError;
use crate::forms::FormError;
use crate::storage::StorageError;

/// Error type that unifies failures across the client layers.
#[derive(Debug, Error)]
pub enum ZendulgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Form error: {0}")]
    Form(#[from] FormError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ZendulgeError>;
