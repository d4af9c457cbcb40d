use huddle_client::ConnectorEvent;
use huddle_core::{AnswerPayload, SdpType, SessionDescription, SignalMessage, SignalingState};

use crate::integration::{init_tracing, joined_connector, peer_joined};
use crate::utils::{EVENT_TIMEOUT_MS, SessionCall, settle, wait_for_event};

#[tokio::test]
async fn test_peer_joined_offers() {
    init_tracing();

    let (mut t, mut channel) = joined_connector().await.expect("Failed to join room");
    channel.push(&peer_joined("p1", "Bob"));

    let evt = wait_for_event(
        &mut t.events,
        |e| matches!(e, ConnectorEvent::PeerJoined(_)),
        EVENT_TIMEOUT_MS,
    )
    .await
    .expect("peer joined");
    let ConnectorEvent::PeerJoined(user) = evt else {
        unreachable!()
    };
    assert_eq!(user.uid.as_str(), "p1");
    assert_eq!(user.user_name, "Bob");

    let offer = channel
        .wait_for_sent(|m| matches!(m, SignalMessage::Offer(_)), EVENT_TIMEOUT_MS)
        .await
        .expect("offer relayed");
    let SignalMessage::Offer(offer) = offer else {
        unreachable!()
    };
    assert_eq!(offer.uid.as_str(), "p1");
    assert_eq!(offer.offer.sdp_type, SdpType::Offer);

    let session = t.sessions.get(0).unwrap();
    assert_eq!(
        session.calls(),
        vec![
            SessionCall::AddTrack("mic".into()),
            SessionCall::CreateOffer { ice_restart: false },
            SessionCall::SetLocal(SdpType::Offer),
        ]
    );

    channel.push(&SignalMessage::Answer(AnswerPayload {
        uid: "p1".into(),
        answer: SessionDescription::answer("remote-answer"),
        user_name: None,
    }));
    settle().await;

    assert_eq!(session.signaling(), SignalingState::Stable);
    assert_eq!(session.count(&SessionCall::SetRemote(SdpType::Answer)), 1);
    assert!(
        channel.drain_sent().iter().all(|m| !matches!(m, SignalMessage::Answer(_))),
        "an answer is never answered"
    );

    let snapshot = t.connector.snapshot().await.unwrap();
    let peer = snapshot.peer(&"p1".into()).expect("record kept");
    assert_eq!(peer.user.user_name, "Bob");
    assert!(peer.link_id.is_some());
}
