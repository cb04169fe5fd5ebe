//! Session stopwatch driver
//!
//! A `SessionClock` only exists while the session timer is running.
//! Dropping it stops the ticks, whatever the exit path.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// One elapsed second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick;

pub struct SessionClock {
    handle: JoinHandle<()>,
}

impl SessionClock {
    /// Spawn the ticking task. Must be called inside a tokio runtime.
    pub fn start(ticks: UnboundedSender<ClockTick>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // first tick fires immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                if ticks.send(ClockTick).is_err() {
                    break; // receiver gone
                }
            }
        });

        debug!("session clock started");
        Self { handle }
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("session clock released");
    }
}
