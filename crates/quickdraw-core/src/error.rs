use thiserror::Error;

use crate::addr::AddrParseError;
use crate::datagram::WireError;

#[derive(Debug, Error)]
pub enum QuickdrawError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    #[error("address error: {0}")]
    Addr(#[from] AddrParseError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuickdrawError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, QuickdrawError>;
