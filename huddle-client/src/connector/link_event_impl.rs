use crate::connector::ConnectorEvent;
use crate::connector::connector_loop::ConnectorLoop;
use crate::link::{LinkEvent, LinkEventKind};
use huddle_core::{AnswerPayload, CandidatePayload, OfferPayload, SignalMessage};
use tracing::{debug, info};

impl ConnectorLoop {
    pub(crate) fn handle_link_event(&mut self, evt: LinkEvent) {
        let Some(record) = self.peers.get_mut(&evt.uid) else {
            debug!("Dropping event for departed peer {}", evt.uid);
            return;
        };
        if record.link_id() != Some(evt.link_id) {
            debug!("Dropping event from replaced link {}", evt.link_id);
            return;
        }

        let uid = evt.uid;
        match evt.kind {
            LinkEventKind::SignalOffer(offer) => {
                self.send_message(SignalMessage::Offer(OfferPayload {
                    uid,
                    offer,
                    user_name: None,
                    room_name: None,
                    mute: None,
                }));
            }
            LinkEventKind::SignalAnswer(answer) => {
                self.send_message(SignalMessage::Answer(AnswerPayload {
                    uid,
                    answer,
                    user_name: None,
                }));
            }
            LinkEventKind::SignalCandidate(candidate) => {
                self.send_message(SignalMessage::Candidate(CandidatePayload {
                    uid,
                    candidate,
                    user_name: None,
                }));
            }
            LinkEventKind::ConnectionStateChanged(state) => {
                info!("Peer {} connectivity: {}", uid, state);
                record.connectivity = state;
                self.emit(ConnectorEvent::PeerConnectionStateChanged { uid, state });
            }
            LinkEventKind::StreamReceived(stream) => {
                info!("Stream {} received from {}", stream.stream_id(), uid);
                record.stream = Some(stream.clone());
                self.emit(ConnectorEvent::PeerStreamReceived { uid, stream });
            }
        }
    }
}
