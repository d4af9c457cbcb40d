mod rtc_session;

pub use rtc_session::*;

use crate::error::SessionError;
use crate::media::{MediaHandle, MediaTrack};
use async_trait::async_trait;
use huddle_core::{ConnectivityState, IceCandidate, SessionDescription, SignalingState};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Spontaneous notifications from a session, delivered in the order they occur.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    NegotiationNeeded,
    LocalCandidate(IceCandidate),
    ConnectivityChanged(ConnectivityState),
    TrackReceived(MediaHandle),
}

pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;

/// The negotiation primitive behind a [`crate::link::PeerLink`].
#[async_trait]
pub trait Session: Send + Sync + 'static {
    async fn create_offer(&self, ice_restart: bool) -> Result<SessionDescription, SessionError>;

    async fn create_answer(&self) -> Result<SessionDescription, SessionError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), SessionError>;

    async fn set_remote_description(&self, desc: SessionDescription)
    -> Result<(), SessionError>;

    /// Discards a pending local offer, returning the signaling state to `stable`.
    async fn rollback(&self) -> Result<(), SessionError> {
        self.set_local_description(SessionDescription::rollback())
            .await
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SessionError>;

    async fn add_track(&self, track: Arc<dyn MediaTrack>) -> Result<(), SessionError>;

    fn signaling_state(&self) -> SignalingState;

    fn connectivity_state(&self) -> ConnectivityState;

    async fn close(&self) -> Result<(), SessionError>;
}

#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    async fn create(
        &self,
        ice_servers: &[String],
        events: SessionEventSender,
    ) -> Result<Arc<dyn Session>, SessionError>;
}
