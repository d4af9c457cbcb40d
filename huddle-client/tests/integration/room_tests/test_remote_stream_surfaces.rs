use std::sync::Arc;

use huddle_client::{ConnectorEvent, MediaHandle, SessionEvent, TrackKind};

use crate::integration::{init_tracing, joined_connector, peer_joined};
use crate::utils::{EVENT_TIMEOUT_MS, settle, wait_for_event};

#[tokio::test]
async fn test_remote_stream_surfaces() {
    init_tracing();

    let (mut t, channel) = joined_connector().await.expect("Failed to join room");
    channel.push(&peer_joined("p1", "Bob"));
    let session = t.sessions.wait_for_session(0, EVENT_TIMEOUT_MS).await.unwrap();
    settle().await;

    session.fire(SessionEvent::TrackReceived(MediaHandle::new(
        "bob-stream",
        "bob-mic",
        TrackKind::Audio,
        Arc::new(()),
    )));

    let evt = wait_for_event(
        &mut t.events,
        |e| matches!(e, ConnectorEvent::PeerStreamReceived { .. }),
        EVENT_TIMEOUT_MS,
    )
    .await
    .expect("stream surfaced");
    let ConnectorEvent::PeerStreamReceived { uid, stream } = evt else {
        unreachable!()
    };
    assert_eq!(uid.as_str(), "p1");
    assert_eq!(stream.stream_id(), "bob-stream");
    assert_eq!(stream.kind(), TrackKind::Audio);

    let snapshot = t.connector.snapshot().await.unwrap();
    assert!(snapshot.peer(&"p1".into()).unwrap().has_stream);
}
