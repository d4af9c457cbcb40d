use std::sync::Arc;
use std::time::Duration;

use huddle_client::{ConnectorEvent, SignalingConnector, WsTransport};
use huddle_core::{RoomIdentity, SignalMessage};

use crate::integration::{init_tracing, test_config, test_media};
use crate::utils::{EVENT_TIMEOUT_MS, MockSessionFactory, TestRoomServer, wait_for_event};

#[tokio::test]
async fn test_connector_rejoins_after_server_drop() {
    init_tracing();

    let server = TestRoomServer::dropping_first_connection();
    let url = server.clone().start().await;

    let mut config = test_config();
    config.signaling_url = url;
    config.reconnect_delay = Duration::from_millis(100);

    let (connector, mut events) = SignalingConnector::new(
        config,
        Arc::new(WsTransport::new()),
        Arc::new(MockSessionFactory::new()),
    );
    connector.connect().unwrap();

    let mut identity = RoomIdentity::new("Alice", "lobby");
    let mut joined = Vec::new();

    // Rejoin on every open, the way a UI would.
    while joined.len() < 2 {
        let evt = wait_for_event(&mut events, |_| true, EVENT_TIMEOUT_MS)
            .await
            .expect("connector event");
        match evt {
            ConnectorEvent::SignalingOpened => {
                connector.join_room(identity.clone(), test_media()).unwrap();
            }
            ConnectorEvent::UserJoined { user, .. } => {
                identity.uid = Some(user.uid.clone());
                joined.push(user.uid);
            }
            _ => {}
        }
    }

    assert_eq!(joined[0].as_str(), "uid-0");
    assert_eq!(joined[1].as_str(), "uid-0", "the assigned uid is reused on rejoin");
    assert_eq!(server.connections(), 2);

    let joins: Vec<_> = server
        .received()
        .into_iter()
        .filter_map(|m| match m {
            SignalMessage::Join(j) => Some(j),
            _ => None,
        })
        .collect();
    assert_eq!(joins.len(), 2);
    assert!(joins[0].uid.is_none());
    assert_eq!(joins[1].uid, Some("uid-0".into()));

    connector.close().await.unwrap();
}
