use crate::model::peer::Uid;
use crate::model::room::{User, UserUpdate};
use crate::model::session::{IceCandidate, SessionDescription};
use serde::{Deserialize, Serialize};

/// Control-channel envelope: `{ "type": <tag>, "payload": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum SignalMessage {
    // client -> server
    Join(JoinPayload),
    Update(UserUpdate),
    Heartbeat {},

    // server -> client
    UserJoined(UserJoinedPayload),
    PeerJoined(PeerJoinedPayload),
    PeerUpdated(PeerUpdatedPayload),
    PeerLeft(PeerLeftPayload),

    // relayed both ways
    Offer(OfferPayload),
    Answer(AnswerPayload),
    Candidate(CandidatePayload),
}

impl SignalMessage {
    pub fn heartbeat() -> Self {
        Self::Heartbeat {}
    }

    /// Wire tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Update(_) => "update",
            Self::Heartbeat {} => "heartbeat",
            Self::UserJoined(_) => "user-joined",
            Self::PeerJoined(_) => "peer-joined",
            Self::PeerUpdated(_) => "peer-updated",
            Self::PeerLeft(_) => "peer-left",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Candidate(_) => "candidate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uid>,
    pub user_name: String,
    pub room_name: String,
    pub mute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinedPayload {
    pub uid: Uid,
    pub user_name: String,
    pub room_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_created_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerJoinedPayload {
    pub uid: Uid,
    pub user_name: String,
    #[serde(default)]
    pub room_name: String,
    #[serde(default)]
    pub mute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerUpdatedPayload {
    pub uid: Uid,
    #[serde(flatten)]
    pub update: UserUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerLeftPayload {
    pub uid: Uid,
    #[serde(default)]
    pub user_name: String,
}

/// The server decorates relayed offers with the sender's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPayload {
    pub uid: Uid,
    pub offer: SessionDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub uid: Uid,
    pub answer: SessionDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePayload {
    pub uid: Uid,
    pub candidate: IceCandidate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl From<UserJoinedPayload> for User {
    fn from(p: UserJoinedPayload) -> Self {
        Self {
            uid: p.uid,
            user_name: p.user_name,
            room_name: Some(p.room_name),
            room_created_time: p.room_created_time,
            mute: false,
        }
    }
}

impl From<PeerJoinedPayload> for User {
    fn from(p: PeerJoinedPayload) -> Self {
        Self {
            uid: p.uid,
            user_name: p.user_name,
            room_name: Some(p.room_name),
            room_created_time: None,
            mute: p.mute,
        }
    }
}
