//! Poll timer
//!
//! The periodic update tick runs as its own task feeding the panel's event
//! channel. [`PollTimer`] owns that task and aborts it on drop, so the timer
//! is released whichever way the owning scope exits.

use super::PanelEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub struct PollTimer {
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

impl PollTimer {
    /// Start ticking every `period`; the first tick fires one period from now
    pub fn start(period: Duration, events: mpsc::Sender<PanelEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(PanelEvent::Tick).await.is_err() {
                    // Panel is gone
                    break;
                }
            }
        });

        tracing::debug!("Poll timer started ({:?})", period);
        Self {
            handle: Some(handle),
            period,
        }
    }

    #[cfg(test)]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop the timer now instead of at drop
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Poll timer cancelled ({:?})", self.period);
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticks_until_dropped() {
        let (tx, mut rx) = mpsc::channel(16);
        let timer = PollTimer::start(Duration::from_millis(10), tx);
        assert!(timer.is_active());

        let tick = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert!(matches!(tick, Some(PanelEvent::Tick)));

        drop(timer);
        while rx.try_recv().is_ok() {}

        // The aborted task drops its sender, closing the channel
        let after = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert!(after.is_none());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let (tx, _rx) = mpsc::channel(16);
        let mut timer = PollTimer::start(Duration::from_secs(60), tx);
        timer.cancel();
        timer.cancel();
        assert!(!timer.is_active());
    }

    #[tokio::test]
    async fn test_released_when_scope_errors() {
        let (tx, mut rx) = mpsc::channel(16);

        fn mounted_then_fails(tx: mpsc::Sender<PanelEvent>) -> Result<(), &'static str> {
            let _timer = PollTimer::start(Duration::from_millis(5), tx);
            Err("mount failed")
        }

        assert!(mounted_then_fails(tx).is_err());
        let closed = tokio::time::timeout(Duration::from_secs(1), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
