use std::time::Duration;

use huddle_client::ConnectorEvent;
use huddle_core::SignalMessage;

use crate::integration::{create_test_connector, init_tracing, open_channel, test_config};
use crate::utils::{EVENT_TIMEOUT_MS, settle, wait_for_event};

fn heartbeats(sent: &[SignalMessage]) -> usize {
    sent.iter()
        .filter(|m| matches!(m, SignalMessage::Heartbeat {}))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_only_while_open() {
    init_tracing();

    let mut t = create_test_connector(test_config());
    let mut channel = open_channel(&mut t).await.expect("Failed to open channel");
    settle().await;
    assert_eq!(heartbeats(&channel.drain_sent()), 0);

    tokio::time::advance(Duration::from_secs(45)).await;
    settle().await;
    assert_eq!(heartbeats(&channel.drain_sent()), 0, "first heartbeat is one interval after open");

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(heartbeats(&channel.drain_sent()), 1);

    tokio::time::advance(Duration::from_secs(50)).await;
    settle().await;
    assert_eq!(heartbeats(&channel.drain_sent()), 1);

    channel.drop_connection();
    wait_for_event(
        &mut t.events,
        |e| matches!(e, ConnectorEvent::SignalingClosed),
        EVENT_TIMEOUT_MS,
    )
    .await
    .expect("signaling closed");

    let snapshot = t.connector.snapshot().await.unwrap();
    assert!(!snapshot.heartbeat_active);

    tokio::time::advance(Duration::from_secs(200)).await;
    settle().await;
    assert_eq!(heartbeats(&channel.drain_sent()), 0, "no heartbeat after close");

    // The reconnect attempt is never accepted, so nothing may be sent anywhere.
    assert!(t.transport.open_count() >= 2);
    let snapshot = t.connector.snapshot().await.unwrap();
    assert!(!snapshot.channel_open);
    assert_eq!(snapshot.queued_messages, 0, "heartbeats are not queued");
}
