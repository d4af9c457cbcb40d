use crate::connector::ConnectorEvent;
use crate::connector::connector_loop::ConnectorLoop;
use crate::connector::peer_record::PeerRecord;
use crate::error::{ConnectorError, ConnectorResult};
use crate::link::PeerLink;
use crate::media::LocalMedia;
use huddle_core::{
    AnswerPayload, CandidatePayload, JoinPayload, OfferPayload, PeerJoinedPayload,
    PeerLeftPayload, PeerUpdatedPayload, RoomIdentity, SignalMessage, User, UserJoinedPayload,
    UserUpdate,
};
use tracing::{debug, info};

impl ConnectorLoop {
    pub(crate) fn join_room(&mut self, identity: RoomIdentity, local_media: LocalMedia) {
        info!(
            "Joining room {} as {}",
            identity.room_name, identity.user_name
        );
        let join = JoinPayload {
            uid: identity.uid.clone(),
            user_name: identity.user_name.clone(),
            room_name: identity.room_name.clone(),
            mute: local_media.is_muted(),
        };
        self.identity = Some(identity);
        self.local_media = Some(local_media);
        self.send_message(SignalMessage::Join(join));
    }

    pub(crate) fn send_user_update(&mut self, update: UserUpdate) {
        if update.is_empty() {
            debug!("Skipping empty user update");
            return;
        }
        self.send_message(SignalMessage::Update(update));
    }

    pub(crate) async fn handle_signal(&mut self, msg: SignalMessage) -> ConnectorResult<()> {
        match msg {
            SignalMessage::UserJoined(p) => self.on_user_joined(p),
            SignalMessage::PeerJoined(p) => self.on_peer_joined(p).await,
            SignalMessage::PeerUpdated(p) => self.on_peer_updated(p),
            SignalMessage::PeerLeft(p) => self.on_peer_left(p).await,
            SignalMessage::Offer(p) => self.on_offer(p),
            SignalMessage::Answer(p) => self.on_answer(p),
            SignalMessage::Candidate(p) => self.on_candidate(p),
            other => {
                debug!("Ignoring client-bound {} message", other.kind());
                Ok(())
            }
        }
    }

    fn on_user_joined(&mut self, p: UserJoinedPayload) -> ConnectorResult<()> {
        info!("Joined room {} with uid {}", p.room_name, p.uid);

        let identity = self
            .identity
            .get_or_insert_with(|| RoomIdentity::new(p.user_name.clone(), p.room_name.clone()));
        identity.uid = Some(p.uid.clone());

        let local_media = self.local_media.clone().unwrap_or_default();
        let mut user = User::from(p);
        user.mute = local_media.is_muted();

        self.emit(ConnectorEvent::UserJoined { user, local_media });
        self.mark_room_joined();
        Ok(())
    }

    async fn on_peer_joined(&mut self, p: PeerJoinedPayload) -> ConnectorResult<()> {
        if let Some(existing) = self.peers.get_mut(&p.uid) {
            if existing.is_established() {
                info!("Peer {} already connected; ignoring peer-joined", p.uid);
                return Ok(());
            }
            if let Some(stale) = existing.link.take() {
                info!("Replacing unfinished link {} to {}", stale.id(), p.uid);
                stale.close().await;
            }
        }

        info!("Peer {} ({}) joined; offering", p.user_name, p.uid);
        let mut record = PeerRecord::new(
            p.uid.clone(),
            p.user_name.clone(),
            Some(p.room_name.clone()),
            p.mute,
        );
        let link = self.spawn_link(&record);
        link.attach_local_media(&self.local_media.clone().unwrap_or_default());
        record.link = Some(link);

        self.peers.insert(p.uid.clone(), record);
        self.emit(ConnectorEvent::PeerJoined(User::from(p)));
        Ok(())
    }

    fn on_offer(&mut self, p: OfferPayload) -> ConnectorResult<()> {
        if let Some(record) = self.peers.get_mut(&p.uid) {
            if record.is_established() {
                info!("Peer {} already connected; ignoring offer", p.uid);
                return Ok(());
            }
            if let Some(name) = &p.user_name {
                record.user_name = name.clone();
            }
            if let Some(mute) = p.mute {
                record.muted = mute;
            }
            if let Some(link) = &record.link {
                debug!("Offer from {} on existing link {}", p.uid, link.id());
                link.handle_remote_sdp(p.offer);
                return Ok(());
            }
        }

        let is_new = !self.peers.contains_key(&p.uid);
        let record = self.peers.entry(p.uid.clone()).or_insert_with(|| {
            PeerRecord::new(
                p.uid.clone(),
                p.user_name.clone().unwrap_or_default(),
                p.room_name.clone(),
                p.mute.unwrap_or(false),
            )
        });
        info!("Answering offer from {}", p.uid);

        let link = PeerLink::spawn(
            p.uid.clone(),
            self.sessions.clone(),
            self.config.link_config(),
            self.link_tx.clone(),
        );
        link.accept_offer(p.offer, &self.local_media.clone().unwrap_or_default());
        record.link = Some(link);

        if is_new {
            let user = record.to_user();
            self.emit(ConnectorEvent::PeerJoined(user));
        }
        Ok(())
    }

    fn on_answer(&mut self, p: AnswerPayload) -> ConnectorResult<()> {
        let link = self.link_for(&p.uid)?;
        link.handle_remote_sdp(p.answer);
        Ok(())
    }

    fn on_candidate(&mut self, p: CandidatePayload) -> ConnectorResult<()> {
        let link = self.link_for(&p.uid)?;
        link.handle_remote_candidate(p.candidate);
        Ok(())
    }

    fn on_peer_updated(&mut self, p: PeerUpdatedPayload) -> ConnectorResult<()> {
        let record = self
            .peers
            .get_mut(&p.uid)
            .ok_or_else(|| ConnectorError::UnknownPeer(p.uid.clone()))?;
        record.merge(&p.update);

        let user = record.to_user();
        self.emit(ConnectorEvent::PeerInfoUpdated(user));
        Ok(())
    }

    async fn on_peer_left(&mut self, p: PeerLeftPayload) -> ConnectorResult<()> {
        let record = self
            .peers
            .remove(&p.uid)
            .ok_or_else(|| ConnectorError::UnknownPeer(p.uid.clone()))?;
        info!("Peer {} ({}) left", record.user_name, p.uid);

        if let Some(link) = &record.link {
            link.close().await;
        }
        self.emit(ConnectorEvent::PeerLeft(record.to_user()));
        Ok(())
    }

    fn spawn_link(&self, record: &PeerRecord) -> PeerLink {
        PeerLink::spawn(
            record.uid.clone(),
            self.sessions.clone(),
            self.config.link_config(),
            self.link_tx.clone(),
        )
    }

    fn link_for(&self, uid: &huddle_core::Uid) -> ConnectorResult<&PeerLink> {
        self.peers
            .get(uid)
            .and_then(|r| r.link.as_ref())
            .ok_or_else(|| ConnectorError::UnknownPeer(uid.clone()))
    }
}
