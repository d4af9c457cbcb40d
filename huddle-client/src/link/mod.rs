mod link_command;
mod link_event;
mod link_worker;

pub use link_event::*;

use crate::media::{LocalMedia, MediaTrack};
use crate::session::{Session, SessionFactory};
use huddle_core::utils::{DEFAULT_MAX_ICE_RESTARTS, DEFAULT_STUN_ADDR};
use huddle_core::{IceCandidate, SessionDescription, SignalingState, Uid};
use link_command::LinkCommand;
use link_worker::LinkWorker;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{OnceCell, mpsc};
use tracing::{debug, warn};

static NEXT_LINK_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub ice_servers: Vec<String>,
    pub max_ice_restarts: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![DEFAULT_STUN_ADDR.to_string()],
            max_ice_restarts: DEFAULT_MAX_ICE_RESTARTS,
        }
    }
}

pub(crate) struct LinkShared {
    closed: AtomicBool,
    session: OnceCell<Arc<dyn Session>>,
}

impl LinkShared {
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Negotiation state machine toward one remote peer.
///
/// Each link runs a worker task that owns the session and processes commands and
/// session notifications strictly in arrival order. After [`PeerLink::close`] the link
/// emits nothing further, even for steps that were already in flight.
#[derive(Clone)]
pub struct PeerLink {
    uid: Uid,
    id: u64,
    commands: mpsc::UnboundedSender<LinkCommand>,
    shared: Arc<LinkShared>,
}

impl PeerLink {
    pub fn spawn(
        uid: Uid,
        sessions: Arc<dyn SessionFactory>,
        config: LinkConfig,
        events: LinkEventSender,
    ) -> Self {
        let id = NEXT_LINK_ID.fetch_add(1, Ordering::Relaxed);
        let (commands, command_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(LinkShared {
            closed: AtomicBool::new(false),
            session: OnceCell::new(),
        });

        let worker = LinkWorker::new(
            uid.clone(),
            id,
            config,
            command_rx,
            events,
            shared.clone(),
        );
        tokio::spawn(worker.run(sessions));

        Self {
            uid,
            id,
            commands,
            shared,
        }
    }

    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// `None` until the worker has created the session.
    pub fn signaling_state(&self) -> Option<SignalingState> {
        self.shared.session.get().map(|s| s.signaling_state())
    }

    pub fn add_local_track(&self, track: Arc<dyn MediaTrack>) {
        self.send(LinkCommand::AddTracks(vec![track]));
    }

    /// Adds every local track, then negotiates once if the session is stable.
    pub fn attach_local_media(&self, media: &LocalMedia) {
        self.send(LinkCommand::AddTracks(media.tracks().to_vec()));
    }

    pub fn handle_remote_sdp(&self, description: SessionDescription) {
        self.send(LinkCommand::RemoteDescription {
            description,
            attach: Vec::new(),
        });
    }

    /// Answerer path: apply the offer, attach local tracks, then answer.
    pub fn accept_offer(&self, offer: SessionDescription, media: &LocalMedia) {
        self.send(LinkCommand::RemoteDescription {
            description: offer,
            attach: media.tracks().to_vec(),
        });
    }

    pub fn handle_remote_candidate(&self, candidate: IceCandidate) {
        self.send(LinkCommand::RemoteCandidate(candidate));
    }

    /// Idempotent. Closes the session if it exists and stops the worker.
    pub async fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Closing link {} to {}", self.id, self.uid);

        if let Some(session) = self.shared.session.get() {
            if let Err(e) = session.close().await {
                warn!("Session close for {} failed: {}", self.uid, e);
            }
        }
        let _ = self.commands.send(LinkCommand::Close);
    }

    fn send(&self, cmd: LinkCommand) {
        if self.is_closed() {
            debug!("Link {} to {} is closed; command dropped", self.id, self.uid);
            return;
        }
        if self.commands.send(cmd).is_err() {
            debug!("Link {} worker is gone", self.id);
        }
    }
}

impl std::fmt::Debug for PeerLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerLink")
            .field("uid", &self.uid)
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
