use crate::media::{LocalMedia, MediaHandle};
use huddle_core::{ConnectivityState, RoomIdentity, Uid, User};

/// Notifications for the UI layer, in the order the connector produced them.
#[derive(Debug, Clone)]
pub enum ConnectorEvent {
    SignalingOpened,
    SignalingClosed,
    /// The server accepted our join.
    UserJoined {
        user: User,
        local_media: LocalMedia,
    },
    PeerJoined(User),
    PeerInfoUpdated(User),
    PeerLeft(User),
    PeerConnectionStateChanged {
        uid: Uid,
        state: ConnectivityState,
    },
    PeerStreamReceived {
        uid: Uid,
        stream: MediaHandle,
    },
}

/// Point-in-time view of the connector, for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct ConnectorSnapshot {
    pub channel_open: bool,
    pub reconnect_pending: bool,
    pub heartbeat_active: bool,
    pub queued_messages: usize,
    pub identity: Option<RoomIdentity>,
    pub peers: Vec<PeerSnapshot>,
}

impl ConnectorSnapshot {
    pub fn peer(&self, uid: &Uid) -> Option<&PeerSnapshot> {
        self.peers.iter().find(|p| &p.user.uid == uid)
    }
}

#[derive(Debug, Clone)]
pub struct PeerSnapshot {
    pub user: User,
    pub connectivity: ConnectivityState,
    pub link_id: Option<u64>,
    pub has_stream: bool,
}
