use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use huddle_client::{
    LinkConfig, LinkEvent, LinkEventKind, LocalMedia, PeerLink, RtcLocalTrack, RtcSessionFactory,
};
use huddle_core::{SessionDescription, SignalingState};

use crate::integration::init_tracing;
use crate::utils::wait_for_event;

const RTC_TIMEOUT_MS: u64 = 5000;

struct RtcLink {
    link: PeerLink,
    events: mpsc::UnboundedReceiver<LinkEvent>,
}

fn spawn_rtc_link(remote: &str) -> RtcLink {
    let (tx, events) = mpsc::unbounded_channel();
    let config = LinkConfig {
        ice_servers: vec![],
        max_ice_restarts: 3,
    };
    let link = PeerLink::spawn(remote.into(), Arc::new(RtcSessionFactory::new()), config, tx);
    link.attach_local_media(
        &LocalMedia::new("local").with_track(Arc::new(RtcLocalTrack::audio_opus("mic", "local"))),
    );
    RtcLink { link, events }
}

async fn next_offer(t: &mut RtcLink) -> SessionDescription {
    let evt = wait_for_event(
        &mut t.events,
        |e| matches!(e.kind, LinkEventKind::SignalOffer(_)),
        RTC_TIMEOUT_MS,
    )
    .await
    .expect("local offer");
    let LinkEventKind::SignalOffer(offer) = evt.kind else {
        unreachable!()
    };
    offer
}

/// Stable, or already offering again for its own track.
async fn assert_settled(t: &mut RtcLink) {
    match t.link.signaling_state() {
        Some(SignalingState::Stable) => {}
        Some(SignalingState::HaveLocalOffer) => {
            next_offer(t).await;
        }
        other => panic!("link left in {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rtc_sessions_resolve_glare() {
    init_tracing();

    let mut a = spawn_rtc_link("b");
    let mut b = spawn_rtc_link("a");

    // Both sides offer at once.
    next_offer(&mut a).await;
    let b_offer = next_offer(&mut b).await;
    assert_eq!(a.link.signaling_state(), Some(SignalingState::HaveLocalOffer));
    assert_eq!(b.link.signaling_state(), Some(SignalingState::HaveLocalOffer));

    a.link.handle_remote_sdp(b_offer);

    let evt = wait_for_event(
        &mut a.events,
        |e| matches!(e.kind, LinkEventKind::SignalAnswer(_)),
        RTC_TIMEOUT_MS,
    )
    .await
    .expect("answer after rolling back the local offer");
    let LinkEventKind::SignalAnswer(answer) = evt.kind else {
        unreachable!()
    };
    assert!(!answer.sdp.is_empty());
    assert_settled(&mut a).await;

    b.link.handle_remote_sdp(answer);

    let deadline = tokio::time::Instant::now() + Duration::from_millis(RTC_TIMEOUT_MS);
    while b.link.signaling_state() == Some(SignalingState::HaveLocalOffer) {
        assert!(tokio::time::Instant::now() < deadline, "answer never applied on b");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_settled(&mut b).await;

    a.link.close().await;
    b.link.close().await;
}
