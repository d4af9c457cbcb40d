use crate::media::MediaHandle;
use huddle_core::{ConnectivityState, IceCandidate, SessionDescription, Uid};

#[derive(Debug, Clone)]
pub enum LinkEventKind {
    SignalOffer(SessionDescription),
    SignalAnswer(SessionDescription),
    SignalCandidate(IceCandidate),
    ConnectionStateChanged(ConnectivityState),
    StreamReceived(MediaHandle),
}

/// Emitted by a link toward its owner. `link_id` tells apart a replaced link's late events.
#[derive(Debug, Clone)]
pub struct LinkEvent {
    pub uid: Uid,
    pub link_id: u64,
    pub kind: LinkEventKind,
}

pub type LinkEventSender = tokio::sync::mpsc::UnboundedSender<LinkEvent>;
