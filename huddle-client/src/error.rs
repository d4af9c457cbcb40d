use huddle_core::Uid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open control channel to {url}: {reason}")]
    Open { url: String, reason: String },

    #[error("control channel is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("negotiation step failed: {0}")]
    Negotiation(String),

    #[error("invalid session description: {0}")]
    InvalidDescription(String),

    #[error("invalid ice candidate: {0}")]
    InvalidCandidate(String),

    #[error("unsupported media track {0}")]
    UnsupportedTrack(String),

    #[error("session is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// A peer-scoped message named a uid with no record.
    #[error("no record for peer {0}")]
    UnknownPeer(Uid),

    #[error("malformed signaling frame: {0}")]
    Frame(#[from] serde_json::Error),

    #[error("connector has shut down")]
    Shutdown,
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
