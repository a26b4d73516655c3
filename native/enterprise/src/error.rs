//! Error handling module

use thiserror::Error;

use crate::remote::{RemoteError, RemoteValue};

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("service not bound, cannot {operation}")]
    Unbound { operation: &'static str },

    #[error("{operation} failed")]
    Remote {
        operation: &'static str,
        #[source]
        source: RemoteError,
    },

    #[error("{operation} got an unexpected reply: {got:?}")]
    UnexpectedReply { operation: &'static str, got: RemoteValue },

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid package name: '{0}'")]
    InvalidPackage(String),
}

impl ProxyError {
    /// Whether the request was dropped only because no connection exists.
    pub fn is_unbound(&self) -> bool {
        matches!(self, Self::Unbound { .. })
    }
}

pub type Result<T, E = ProxyError> = std::result::Result<T, E>;
