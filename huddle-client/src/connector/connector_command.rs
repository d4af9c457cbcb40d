use crate::connector::ConnectorSnapshot;
use crate::media::LocalMedia;
use huddle_core::{RoomIdentity, UserUpdate};
use tokio::sync::oneshot;

pub(crate) enum ConnectorCommand {
    Connect,
    JoinRoom {
        identity: RoomIdentity,
        local_media: LocalMedia,
    },
    SendUserUpdate(UserUpdate),
    Snapshot(oneshot::Sender<ConnectorSnapshot>),
    Close(oneshot::Sender<()>),
}

/// Timer fires carry the generation they were armed for; a fire from an
/// older generation is ignored.
pub(crate) enum TimerFire {
    Heartbeat { generation: u64 },
    Reconnect { generation: u64 },
}
