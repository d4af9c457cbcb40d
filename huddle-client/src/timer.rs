use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// A single cancellable background timer owned by the connector loop.
///
/// The slot stays armed after its task fires until the owner calls [`TimerSlot::cancel`],
/// so a fire that is still queued for the loop counts as pending.
#[derive(Debug, Default)]
pub struct TimerSlot {
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Runs `fire` once after `delay`. Returns `false` without scheduling if already armed.
    pub fn arm_once<F>(&mut self, delay: Duration, fire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_armed() {
            return false;
        }

        let deadline = Instant::now() + delay;
        self.handle = Some(tokio::spawn(async move {
            time::sleep_until(deadline).await;
            fire();
        }));
        true
    }

    /// Replaces whatever is scheduled with a periodic `tick`. The first tick lands one
    /// `period` from now. The task stops once `tick` returns `false`.
    pub fn restart_interval<F>(&mut self, period: Duration, mut tick: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.cancel();

        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.handle = Some(tokio::spawn(async move {
            loop {
                interval.tick().await;
                if !tick() {
                    break;
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
