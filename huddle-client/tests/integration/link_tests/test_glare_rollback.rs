use huddle_client::LinkEventKind;
use huddle_core::{SdpType, SessionDescription, SignalingState};

use crate::integration::link_tests::spawn_test_link;
use crate::integration::{init_tracing, test_media};
use crate::utils::{EVENT_TIMEOUT_MS, SessionCall, assert_quiet, wait_for_event};

#[tokio::test]
async fn test_remote_offer_during_local_offer_rolls_back() {
    init_tracing();

    let mut t = spawn_test_link(3).await;
    t.link.attach_local_media(&test_media());

    let evt = wait_for_event(&mut t.events, |_| true, EVENT_TIMEOUT_MS)
        .await
        .expect("local offer");
    assert!(matches!(evt.kind, LinkEventKind::SignalOffer(_)));
    assert_eq!(t.session.signaling(), SignalingState::HaveLocalOffer);

    t.link.handle_remote_sdp(SessionDescription::offer("remote-offer"));

    let evt = wait_for_event(&mut t.events, |_| true, EVENT_TIMEOUT_MS)
        .await
        .expect("answer to the remote offer");
    assert!(matches!(evt.kind, LinkEventKind::SignalAnswer(_)));
    assert_eq!(t.session.signaling(), SignalingState::Stable);

    let rollback = t.session.position(&SessionCall::Rollback).expect("rolled back");
    let remote = t
        .session
        .position(&SessionCall::SetRemote(SdpType::Offer))
        .expect("remote offer applied");
    let answer = t.session.position(&SessionCall::CreateAnswer).unwrap();
    assert!(rollback < remote && remote < answer);
    assert_quiet(&mut t.events, 50).await;
}

#[tokio::test]
async fn test_remote_offer_while_local_offer_in_flight() {
    init_tracing();

    let mut t = spawn_test_link(3).await;
    let offers = t.session.hold_offers();

    let started = t.session.step_started.notified();
    t.link.attach_local_media(&test_media());
    tokio::time::timeout(std::time::Duration::from_millis(EVENT_TIMEOUT_MS), started)
        .await
        .expect("create_offer started");

    // The remote offer arrives while create_offer is still pending.
    t.link.handle_remote_sdp(SessionDescription::offer("remote-offer"));
    offers.add_permits(1);

    let first = wait_for_event(&mut t.events, |_| true, EVENT_TIMEOUT_MS)
        .await
        .expect("local offer");
    assert!(matches!(first.kind, LinkEventKind::SignalOffer(_)));
    let second = wait_for_event(&mut t.events, |_| true, EVENT_TIMEOUT_MS)
        .await
        .expect("answer");
    assert!(matches!(second.kind, LinkEventKind::SignalAnswer(_)));

    assert_eq!(t.session.signaling(), SignalingState::Stable);
    assert_eq!(t.session.count(&SessionCall::Rollback), 1);
}
