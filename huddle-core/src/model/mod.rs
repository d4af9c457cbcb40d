mod peer;
mod room;
mod session;
mod signaling;

pub use peer::Uid;
pub use room::{RoomIdentity, User, UserUpdate};
pub use session::{ConnectivityState, IceCandidate, SdpType, SessionDescription, SignalingState};
pub use signaling::{
    AnswerPayload, CandidatePayload, JoinPayload, OfferPayload, PeerJoinedPayload,
    PeerLeftPayload, PeerUpdatedPayload, SignalMessage, UserJoinedPayload,
};
