use huddle_client::ConnectorEvent;
use huddle_core::{PeerUpdatedPayload, SignalMessage, UserUpdate};

use crate::integration::{init_tracing, joined_connector, peer_joined};
use crate::utils::{EVENT_TIMEOUT_MS, wait_for_event};

#[tokio::test]
async fn test_peer_updated_merges() {
    init_tracing();

    let (mut t, channel) = joined_connector().await.expect("Failed to join room");
    channel.push(&peer_joined("p1", "Bob"));

    channel.push(&SignalMessage::PeerUpdated(PeerUpdatedPayload {
        uid: "p1".into(),
        update: UserUpdate::mute(true),
    }));
    let evt = wait_for_event(
        &mut t.events,
        |e| matches!(e, ConnectorEvent::PeerInfoUpdated(_)),
        EVENT_TIMEOUT_MS,
    )
    .await
    .expect("update surfaced");
    let ConnectorEvent::PeerInfoUpdated(user) = evt else {
        unreachable!()
    };
    assert_eq!(user.user_name, "Bob", "absent fields keep their value");
    assert!(user.mute);

    channel.push(&SignalMessage::PeerUpdated(PeerUpdatedPayload {
        uid: "p1".into(),
        update: UserUpdate::rename("Robert"),
    }));
    let evt = wait_for_event(
        &mut t.events,
        |e| matches!(e, ConnectorEvent::PeerInfoUpdated(_)),
        EVENT_TIMEOUT_MS,
    )
    .await
    .expect("rename surfaced");
    let ConnectorEvent::PeerInfoUpdated(user) = evt else {
        unreachable!()
    };
    assert_eq!(user.user_name, "Robert");
    assert!(user.mute, "mute survives the rename");

    let snapshot = t.connector.snapshot().await.unwrap();
    let peer = snapshot.peer(&"p1".into()).unwrap();
    assert_eq!(peer.user.user_name, "Robert");
    assert!(peer.user.mute);
}
