use crate::model::peer::Uid;
use serde::{Deserialize, Serialize};

/// Who we are in a room. `uid` is absent until the server assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uid>,
    pub user_name: String,
    pub room_name: String,
}

impl RoomIdentity {
    pub fn new(user_name: impl Into<String>, room_name: impl Into<String>) -> Self {
        Self {
            uid: None,
            user_name: user_name.into(),
            room_name: room_name.into(),
        }
    }

    pub fn with_uid(mut self, uid: impl Into<Uid>) -> Self {
        self.uid = Some(uid.into());
        self
    }
}

/// A room participant as shown to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: Uid,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_created_time: Option<String>,
    #[serde(default)]
    pub mute: bool,
}

/// Partial identity change broadcast with `update` (rename, mute toggle).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
}

impl UserUpdate {
    pub fn rename(user_name: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
            mute: None,
        }
    }

    pub fn mute(mute: bool) -> Self {
        Self {
            user_name: None,
            mute: Some(mute),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_name.is_none() && self.mute.is_none()
    }
}
