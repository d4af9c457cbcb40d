use crate::error::SessionError;
use crate::media::{MediaHandle, MediaTrack, TrackKind};
use crate::session::{Session, SessionEvent, SessionEventSender, SessionFactory};
use async_trait::async_trait;
use huddle_core::{ConnectivityState, IceCandidate, SdpType, SessionDescription, SignalingState};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::offer_answer_options::RTCOfferOptions;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

fn rtc_err(e: webrtc::Error) -> SessionError {
    SessionError::Negotiation(e.to_string())
}

/// Builds webrtc-rs peer connections.
#[derive(Debug, Default, Clone)]
pub struct RtcSessionFactory;

impl RtcSessionFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionFactory for RtcSessionFactory {
    async fn create(
        &self,
        ice_servers: &[String],
        events: SessionEventSender,
    ) -> Result<Arc<dyn Session>, SessionError> {
        let session = RtcSession::new(ice_servers, events).await?;
        Ok(Arc::new(session))
    }
}

/// A [`Session`] over a webrtc-rs `RTCPeerConnection`.
pub struct RtcSession {
    peer_connection: Arc<RTCPeerConnection>,
    // Description changes apply one at a time, in call order.
    ops: Mutex<()>,
    closed: AtomicBool,
}

impl RtcSession {
    pub async fn new(
        ice_servers: &[String],
        events: SessionEventSender,
    ) -> Result<Self, SessionError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs().map_err(rtc_err)?;
        let registry = register_default_interceptors(Registry::new(), &mut m).map_err(rtc_err)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: if ice_servers.is_empty() {
                vec![]
            } else {
                vec![RTCIceServer {
                    urls: ice_servers.to_vec(),
                    ..Default::default()
                }]
            },
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await.map_err(rtc_err)?);

        let negotiation_tx = events.clone();
        peer_connection.on_negotiation_needed(Box::new(move || {
            let tx = negotiation_tx.clone();
            Box::pin(async move {
                let _ = tx.send(SessionEvent::NegotiationNeeded);
            })
        }));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                match candidate_from_rtc(init) {
                    Ok(candidate) => {
                        let _ = tx.send(SessionEvent::LocalCandidate(candidate));
                    }
                    Err(e) => warn!("Dropping local candidate: {}", e),
                }
            })
        }));

        let state_tx = events.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("ICE connection state changed: {:?}", s);
                    let _ = tx.send(SessionEvent::ConnectivityChanged(connectivity_from_rtc(s)));
                })
            },
        ));

        let track_tx = events;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                Box::pin(async move {
                    let kind = match track.kind() {
                        RTPCodecType::Video => TrackKind::Video,
                        _ => TrackKind::Audio,
                    };
                    debug!("Remote track {} on stream {}", track.id(), track.stream_id());
                    let handle = MediaHandle::new(track.stream_id(), track.id(), kind, track);
                    let _ = tx.send(SessionEvent::TrackReceived(handle));
                })
            },
        ));

        Ok(Self {
            peer_connection,
            ops: Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn peer_connection(&self) -> &Arc<RTCPeerConnection> {
        &self.peer_connection
    }
}

#[async_trait]
impl Session for RtcSession {
    async fn create_offer(&self, ice_restart: bool) -> Result<SessionDescription, SessionError> {
        let options = RTCOfferOptions {
            ice_restart,
            ..Default::default()
        };
        let offer = self
            .peer_connection
            .create_offer(Some(options))
            .await
            .map_err(rtc_err)?;
        description_from_rtc(offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription, SessionError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(rtc_err)?;
        description_from_rtc(answer)
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), SessionError> {
        let desc = description_to_rtc(desc)?;
        let _guard = self.ops.lock().await;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(rtc_err)
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), SessionError> {
        let desc = description_to_rtc(desc)?;
        let _guard = self.ops.lock().await;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(rtc_err)
    }

    // webrtc-rs refuses a rollback with an empty sdp; it takes the pending offer.
    async fn rollback(&self) -> Result<(), SessionError> {
        let _guard = self.ops.lock().await;
        let Some(pending) = self.peer_connection.pending_local_description().await else {
            return Err(SessionError::Negotiation(
                "no local offer to roll back".to_string(),
            ));
        };
        let desc = description_to_rtc(SessionDescription {
            sdp_type: SdpType::Rollback,
            sdp: pending.sdp,
        })?;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(rtc_err)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SessionError> {
        let value = serde_json::to_value(&candidate)
            .map_err(|e| SessionError::InvalidCandidate(e.to_string()))?;
        let init: RTCIceCandidateInit = serde_json::from_value(value)
            .map_err(|e| SessionError::InvalidCandidate(e.to_string()))?;
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(rtc_err)
    }

    async fn add_track(&self, track: Arc<dyn MediaTrack>) -> Result<(), SessionError> {
        let Some(local) = track.as_any().downcast_ref::<RtcLocalTrack>() else {
            return Err(SessionError::UnsupportedTrack(track.id().to_string()));
        };

        let sender = self
            .peer_connection
            .add_track(local.track() as Arc<dyn TrackLocal + Send + Sync>)
            .await
            .map_err(rtc_err)?;

        // RTCP has to be drained for interceptors to run.
        tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while sender.read(&mut rtcp_buf).await.is_ok() {}
        });
        Ok(())
    }

    fn signaling_state(&self) -> SignalingState {
        match self.peer_connection.signaling_state() {
            RTCSignalingState::HaveLocalOffer | RTCSignalingState::HaveRemotePranswer => {
                SignalingState::HaveLocalOffer
            }
            RTCSignalingState::HaveRemoteOffer | RTCSignalingState::HaveLocalPranswer => {
                SignalingState::HaveRemoteOffer
            }
            RTCSignalingState::Closed => SignalingState::Closed,
            _ => SignalingState::Stable,
        }
    }

    fn connectivity_state(&self) -> ConnectivityState {
        connectivity_from_rtc(self.peer_connection.ice_connection_state())
    }

    async fn close(&self) -> Result<(), SessionError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.peer_connection.close().await.map_err(rtc_err)
    }
}

/// Opus capture track that [`RtcSession`] can send.
pub struct RtcLocalTrack {
    id: String,
    kind: TrackKind,
    track: Arc<TrackLocalStaticSample>,
    enabled: AtomicBool,
}

impl RtcLocalTrack {
    pub fn audio_opus(id: impl Into<String>, stream_id: impl Into<String>) -> Self {
        let id = id.into();
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                sdp_fmtp_line: String::new(),
                rtcp_feedback: vec![],
            },
            id.clone(),
            stream_id.into(),
        ));

        Self {
            id,
            kind: TrackKind::Audio,
            track,
            enabled: AtomicBool::new(true),
        }
    }

    /// Sample sink the application writes encoded frames into.
    pub fn track(&self) -> Arc<TrackLocalStaticSample> {
        self.track.clone()
    }
}

impl fmt::Debug for RtcLocalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RtcLocalTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl MediaTrack for RtcLocalTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn description_to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, SessionError> {
    let invalid = |e: webrtc::Error| SessionError::InvalidDescription(e.to_string());
    match desc.sdp_type {
        SdpType::Offer => RTCSessionDescription::offer(desc.sdp).map_err(invalid),
        SdpType::Answer => RTCSessionDescription::answer(desc.sdp).map_err(invalid),
        SdpType::Pranswer => RTCSessionDescription::pranswer(desc.sdp).map_err(invalid),
        SdpType::Rollback => serde_json::to_value(&desc)
            .and_then(serde_json::from_value)
            .map_err(|e| SessionError::InvalidDescription(e.to_string())),
    }
}

fn description_from_rtc(desc: RTCSessionDescription) -> Result<SessionDescription, SessionError> {
    let sdp_type = match desc.sdp_type {
        RTCSdpType::Offer => SdpType::Offer,
        RTCSdpType::Answer => SdpType::Answer,
        RTCSdpType::Pranswer => SdpType::Pranswer,
        RTCSdpType::Rollback => SdpType::Rollback,
        other => {
            return Err(SessionError::InvalidDescription(format!(
                "unexpected sdp type {:?}",
                other
            )));
        }
    };
    Ok(SessionDescription {
        sdp_type,
        sdp: desc.sdp,
    })
}

fn candidate_from_rtc(init: RTCIceCandidateInit) -> Result<IceCandidate, SessionError> {
    let value =
        serde_json::to_value(&init).map_err(|e| SessionError::InvalidCandidate(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| SessionError::InvalidCandidate(e.to_string()))
}

fn connectivity_from_rtc(state: RTCIceConnectionState) -> ConnectivityState {
    match state {
        RTCIceConnectionState::Checking => ConnectivityState::Checking,
        RTCIceConnectionState::Connected => ConnectivityState::Connected,
        RTCIceConnectionState::Completed => ConnectivityState::Completed,
        RTCIceConnectionState::Disconnected => ConnectivityState::Disconnected,
        RTCIceConnectionState::Failed => ConnectivityState::Failed,
        RTCIceConnectionState::Closed => ConnectivityState::Closed,
        _ => ConnectivityState::New,
    }
}
