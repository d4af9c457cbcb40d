mod test_answer_round_trip;
mod test_glare_rollback;
mod test_rtc_glare;

use std::sync::Arc;
use tokio::sync::mpsc;

use huddle_client::{LinkConfig, LinkEvent, PeerLink};

use crate::utils::{EVENT_TIMEOUT_MS, MockSession, MockSessionFactory};

pub struct TestLink {
    pub link: PeerLink,
    pub events: mpsc::UnboundedReceiver<LinkEvent>,
    pub session: Arc<MockSession>,
}

pub async fn spawn_test_link(max_ice_restarts: u32) -> TestLink {
    let sessions = MockSessionFactory::new();
    let (tx, events) = mpsc::unbounded_channel();

    let config = LinkConfig {
        ice_servers: vec![],
        max_ice_restarts,
    };
    let link = PeerLink::spawn("remote".into(), Arc::new(sessions.clone()), config, tx);
    let session = sessions
        .wait_for_session(0, EVENT_TIMEOUT_MS)
        .await
        .expect("session created");

    TestLink {
        link,
        events,
        session,
    }
}
