use crate::connector::PeerSnapshot;
use crate::link::PeerLink;
use crate::media::MediaHandle;
use huddle_core::{ConnectivityState, Uid, User, UserUpdate};

pub(crate) struct PeerRecord {
    pub uid: Uid,
    pub user_name: String,
    pub room_name: Option<String>,
    pub muted: bool,
    pub link: Option<PeerLink>,
    pub stream: Option<MediaHandle>,
    pub connectivity: ConnectivityState,
}

impl PeerRecord {
    pub fn new(uid: Uid, user_name: String, room_name: Option<String>, muted: bool) -> Self {
        Self {
            uid,
            user_name,
            room_name,
            muted,
            link: None,
            stream: None,
            connectivity: ConnectivityState::New,
        }
    }

    pub fn link_id(&self) -> Option<u64> {
        self.link.as_ref().map(|l| l.id())
    }

    pub fn is_established(&self) -> bool {
        self.link.is_some() && self.connectivity.is_established()
    }

    pub fn merge(&mut self, update: &UserUpdate) {
        if let Some(name) = &update.user_name {
            self.user_name = name.clone();
        }
        if let Some(mute) = update.mute {
            self.muted = mute;
        }
    }

    pub fn to_user(&self) -> User {
        User {
            uid: self.uid.clone(),
            user_name: self.user_name.clone(),
            room_name: self.room_name.clone(),
            room_created_time: None,
            mute: self.muted,
        }
    }

    pub fn snapshot(&self) -> PeerSnapshot {
        PeerSnapshot {
            user: self.to_user(),
            connectivity: self.connectivity,
            link_id: self.link_id(),
            has_stream: self.stream.is_some(),
        }
    }
}
