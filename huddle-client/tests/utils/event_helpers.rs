use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::mpsc;

/// Default wait for an expected event (ms).
pub const EVENT_TIMEOUT_MS: u64 = 2000;

/// Lets every spawned task run until the runtime is idle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Waits for the next event matching `pred`, discarding the ones before it.
pub async fn wait_for_event<T, F>(
    rx: &mut mpsc::UnboundedReceiver<T>,
    pred: F,
    timeout_ms: u64,
) -> Option<T>
where
    F: Fn(&T) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        let evt = tokio::time::timeout_at(deadline, rx.recv()).await.ok()??;
        if pred(&evt) {
            return Some(evt);
        }
    }
}

/// Collects whatever is already queued.
pub fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(evt) = rx.try_recv() {
        out.push(evt);
    }
    out
}

/// Asserts nothing arrives within `ms`.
pub async fn assert_quiet<T: Debug>(rx: &mut mpsc::UnboundedReceiver<T>, ms: u64) {
    if let Ok(Some(evt)) = tokio::time::timeout(Duration::from_millis(ms), rx.recv()).await {
        panic!("unexpected event: {:?}", evt);
    }
}
