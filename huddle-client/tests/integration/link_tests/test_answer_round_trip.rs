use huddle_client::LinkEventKind;
use huddle_core::{SessionDescription, SignalingState};

use crate::integration::init_tracing;
use crate::integration::link_tests::spawn_test_link;
use crate::utils::{EVENT_TIMEOUT_MS, assert_quiet, wait_for_event};

#[tokio::test]
async fn test_remote_offer_yields_one_answer() {
    init_tracing();

    let mut t = spawn_test_link(3).await;
    t.link.handle_remote_sdp(SessionDescription::offer("remote-offer"));

    let evt = wait_for_event(&mut t.events, |_| true, EVENT_TIMEOUT_MS)
        .await
        .expect("answer emitted");
    assert_eq!(evt.uid.as_str(), "remote");
    assert_eq!(evt.link_id, t.link.id());
    assert!(matches!(evt.kind, LinkEventKind::SignalAnswer(_)));

    assert_quiet(&mut t.events, 50).await;
    assert_eq!(t.link.signaling_state(), Some(SignalingState::Stable));
}

#[tokio::test]
async fn test_remote_answer_yields_nothing() {
    init_tracing();

    let mut t = spawn_test_link(3).await;
    t.link.attach_local_media(&crate::integration::test_media());
    let evt = wait_for_event(&mut t.events, |_| true, EVENT_TIMEOUT_MS)
        .await
        .expect("offer emitted");
    assert!(matches!(evt.kind, LinkEventKind::SignalOffer(_)));

    t.link.handle_remote_sdp(SessionDescription::answer("remote-answer"));
    assert_quiet(&mut t.events, 50).await;
    assert_eq!(t.session.signaling(), SignalingState::Stable);
}
