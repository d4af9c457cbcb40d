use huddle_client::{ConnectorEvent, SessionEvent};
use huddle_core::{IceCandidate, RoomIdentity, SignalMessage, UserJoinedPayload};

use crate::integration::{init_tracing, joined_connector, open_channel, peer_joined, test_media};
use crate::utils::{EVENT_TIMEOUT_MS, settle, wait_for_event};

#[tokio::test]
async fn test_negotiation_held_until_rejoined() {
    init_tracing();

    let (mut t, mut channel) = joined_connector().await.expect("Failed to join room");
    channel.push(&peer_joined("p1", "Bob"));
    let session = t
        .sessions
        .wait_for_session(0, EVENT_TIMEOUT_MS)
        .await
        .expect("session created");
    channel
        .wait_for_sent(|m| matches!(m, SignalMessage::Offer(_)), EVENT_TIMEOUT_MS)
        .await
        .expect("offer relayed");

    channel.drop_connection();
    wait_for_event(
        &mut t.events,
        |e| matches!(e, ConnectorEvent::SignalingClosed),
        EVENT_TIMEOUT_MS,
    )
    .await
    .expect("signaling closed");

    session.fire(SessionEvent::LocalCandidate(IceCandidate::new("candidate:late")));
    settle().await;
    assert_eq!(t.connector.snapshot().await.unwrap().queued_messages, 1);

    let mut channel = open_channel(&mut t).await.expect("Failed to reopen channel");
    settle().await;
    assert!(
        channel.drain_sent().is_empty(),
        "nothing relayed before the server readmits us"
    );

    t.connector
        .join_room(RoomIdentity::new("Alice", "lobby").with_uid("me"), test_media())
        .unwrap();
    channel
        .wait_for_sent(|m| matches!(m, SignalMessage::Join(_)), EVENT_TIMEOUT_MS)
        .await
        .expect("rejoin sent");
    settle().await;
    assert!(channel.drain_sent().is_empty(), "candidate still held after join");

    channel.push(&SignalMessage::UserJoined(UserJoinedPayload {
        uid: "me".into(),
        user_name: "Alice".into(),
        room_name: "lobby".into(),
        room_created_time: None,
    }));

    let sent = channel
        .wait_for_sent(|m| matches!(m, SignalMessage::Candidate(_)), EVENT_TIMEOUT_MS)
        .await
        .expect("held candidate released");
    let SignalMessage::Candidate(candidate) = sent else {
        unreachable!()
    };
    assert_eq!(candidate.uid.as_str(), "p1");
    assert_eq!(candidate.candidate.candidate, "candidate:late");
    assert_eq!(t.connector.snapshot().await.unwrap().queued_messages, 0);
}
