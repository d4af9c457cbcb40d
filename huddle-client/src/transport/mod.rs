mod ws_transport;

pub use ws_transport::*;

use crate::error::TransportError;
use tokio::sync::mpsc;

/// Lifecycle of one control-channel connection. `generation` identifies the
/// connection attempt so the owner can drop events from superseded attempts.
#[derive(Debug)]
pub enum ChannelEvent {
    Opened {
        generation: u64,
        sender: ChannelSender,
    },
    Frame {
        generation: u64,
        text: String,
    },
    Closed {
        generation: u64,
        reason: Option<String>,
    },
}

impl ChannelEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Opened { generation, .. }
            | Self::Frame { generation, .. }
            | Self::Closed { generation, .. } => *generation,
        }
    }
}

/// Outbound half of an open control channel. Dropping every clone closes the connection.
#[derive(Debug, Clone)]
pub struct ChannelSender {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSender {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    pub fn send(&self, text: String) -> Result<(), TransportError> {
        self.tx.send(text).map_err(|_| TransportError::Closed)
    }
}

pub type ChannelEventSender = mpsc::UnboundedSender<ChannelEvent>;

/// Opens control channels. Every outcome of an attempt, failure included, is
/// reported on `events`; a failed attempt yields `Closed` without `Opened`.
pub trait ControlTransport: Send + Sync + 'static {
    fn open(&self, url: &str, generation: u64, events: ChannelEventSender);
}
