use crate::link::link_command::LinkCommand;
use crate::link::{LinkConfig, LinkEvent, LinkEventKind, LinkEventSender, LinkShared};
use crate::media::MediaTrack;
use crate::session::{Session, SessionEvent, SessionFactory};
use huddle_core::{ConnectivityState, IceCandidate, SessionDescription, SignalingState, Uid};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub(crate) struct LinkWorker {
    uid: Uid,
    id: u64,
    config: LinkConfig,
    command_rx: mpsc::UnboundedReceiver<LinkCommand>,
    events: LinkEventSender,
    shared: Arc<LinkShared>,
    remote_description_set: bool,
    pending_candidates: Vec<IceCandidate>,
    ice_restarts: u32,
}

impl LinkWorker {
    pub(crate) fn new(
        uid: Uid,
        id: u64,
        config: LinkConfig,
        command_rx: mpsc::UnboundedReceiver<LinkCommand>,
        events: LinkEventSender,
        shared: Arc<LinkShared>,
    ) -> Self {
        Self {
            uid,
            id,
            config,
            command_rx,
            events,
            shared,
            remote_description_set: false,
            pending_candidates: Vec::new(),
            ice_restarts: 0,
        }
    }

    pub(crate) async fn run(mut self, sessions: Arc<dyn SessionFactory>) {
        let (session_tx, mut session_rx) = mpsc::unbounded_channel();

        let session = match sessions.create(&self.config.ice_servers, session_tx).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to create session for {}: {}", self.uid, e);
                self.emit(LinkEventKind::ConnectionStateChanged(
                    ConnectivityState::Failed,
                ));
                return;
            }
        };

        if self.shared.session.set(session.clone()).is_err() {
            error!("Link {} already has a session", self.id);
            return;
        }
        // close() may have run before the session existed.
        if self.shared.is_closed() {
            let _ = session.close().await;
            return;
        }

        debug!("Link {} to {} started", self.id, self.uid);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(LinkCommand::Close) | None => break,
                        Some(c) => self.handle_command(&session, c).await,
                    }
                }

                Some(evt) = session_rx.recv() => {
                    self.handle_session_event(&session, evt).await;
                }
            }

            if self.shared.is_closed() {
                break;
            }
        }

        // Every handle dropped without close().
        if !self.shared.closed.swap(true, Ordering::SeqCst) {
            let _ = session.close().await;
        }
        debug!("Link {} to {} finished", self.id, self.uid);
    }

    async fn handle_command(&mut self, session: &Arc<dyn Session>, cmd: LinkCommand) {
        match cmd {
            LinkCommand::AddTracks(tracks) => {
                self.add_tracks(session, tracks).await;
                if self.shared.is_closed() {
                    return;
                }
                if session.signaling_state() == SignalingState::Stable {
                    self.negotiate(session, false).await;
                }
            }
            LinkCommand::RemoteDescription {
                description,
                attach,
            } => {
                self.apply_remote_description(session, description, attach)
                    .await;
            }
            LinkCommand::RemoteCandidate(candidate) => {
                if self.remote_description_set {
                    self.add_candidate(session, candidate).await;
                } else {
                    debug!("Buffering candidate from {} until remote description", self.uid);
                    self.pending_candidates.push(candidate);
                }
            }
            LinkCommand::Close => {}
        }
    }

    async fn handle_session_event(&mut self, session: &Arc<dyn Session>, evt: SessionEvent) {
        match evt {
            SessionEvent::NegotiationNeeded => self.negotiate(session, false).await,
            SessionEvent::LocalCandidate(candidate) => {
                self.emit(LinkEventKind::SignalCandidate(candidate));
            }
            SessionEvent::ConnectivityChanged(state) => {
                self.emit(LinkEventKind::ConnectionStateChanged(state));
                match state {
                    ConnectivityState::Connected | ConnectivityState::Completed => {
                        self.ice_restarts = 0;
                    }
                    ConnectivityState::Failed => {
                        if self.ice_restarts < self.config.max_ice_restarts {
                            self.ice_restarts += 1;
                            info!(
                                "Connectivity to {} failed; ICE restart {}/{}",
                                self.uid, self.ice_restarts, self.config.max_ice_restarts
                            );
                            self.negotiate(session, true).await;
                        } else {
                            warn!(
                                "Connectivity to {} failed after {} ICE restarts",
                                self.uid, self.ice_restarts
                            );
                        }
                    }
                    _ => {}
                }
            }
            SessionEvent::TrackReceived(handle) => {
                self.emit(LinkEventKind::StreamReceived(handle));
            }
        }
    }

    async fn negotiate(&mut self, session: &Arc<dyn Session>, ice_restart: bool) {
        let offer = match session.create_offer(ice_restart).await {
            Ok(offer) => offer,
            Err(e) => {
                warn!("create_offer for {} failed: {}", self.uid, e);
                return;
            }
        };
        if self.shared.is_closed() {
            return;
        }

        // Another negotiation got in first.
        if session.signaling_state() != SignalingState::Stable {
            debug!("Abandoning offer to {}: not stable", self.uid);
            return;
        }

        if let Err(e) = session.set_local_description(offer.clone()).await {
            warn!("Applying local offer for {} failed: {}", self.uid, e);
            return;
        }
        self.emit(LinkEventKind::SignalOffer(offer));
    }

    async fn apply_remote_description(
        &mut self,
        session: &Arc<dyn Session>,
        description: SessionDescription,
        attach: Vec<Arc<dyn MediaTrack>>,
    ) {
        let is_offer = description.is_offer();

        let applied = if is_offer && session.signaling_state() != SignalingState::Stable {
            info!("Offer collision with {}: rolling back local offer", self.uid);
            tokio::try_join!(
                session.rollback(),
                session.set_remote_description(description)
            )
            .map(|_| ())
        } else {
            session.set_remote_description(description).await
        };

        if let Err(e) = applied {
            warn!("Remote description from {} rejected: {}", self.uid, e);
            return;
        }
        if self.shared.is_closed() {
            return;
        }

        self.remote_description_set = true;
        for candidate in std::mem::take(&mut self.pending_candidates) {
            self.add_candidate(session, candidate).await;
        }

        self.add_tracks(session, attach).await;

        if !is_offer {
            return;
        }

        let answer = match session.create_answer().await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("create_answer for {} failed: {}", self.uid, e);
                return;
            }
        };
        if self.shared.is_closed() {
            return;
        }
        if let Err(e) = session.set_local_description(answer.clone()).await {
            warn!("Applying local answer for {} failed: {}", self.uid, e);
            return;
        }
        self.emit(LinkEventKind::SignalAnswer(answer));
    }

    async fn add_tracks(&self, session: &Arc<dyn Session>, tracks: Vec<Arc<dyn MediaTrack>>) {
        for track in tracks {
            if let Err(e) = session.add_track(track).await {
                warn!("Adding track to link {} failed: {}", self.id, e);
            }
        }
    }

    async fn add_candidate(&self, session: &Arc<dyn Session>, candidate: IceCandidate) {
        if let Err(e) = session.add_ice_candidate(candidate).await {
            warn!("Remote candidate from {} rejected: {}", self.uid, e);
        }
    }

    fn emit(&self, kind: LinkEventKind) {
        if self.shared.is_closed() {
            return;
        }
        let _ = self.events.send(LinkEvent {
            uid: self.uid.clone(),
            link_id: self.id,
            kind,
        });
    }
}
