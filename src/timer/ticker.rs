//! Repeating redraw tick.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Background task publishing an increasing tick count every `period`.
///
/// The task is aborted when the ticker is stopped or dropped.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn the tick task. Must be called inside a tokio runtime.
    pub fn spawn(period: Duration) -> (Self, watch::Receiver<u64>) {
        let (tx, rx) = watch::channel(0u64);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // Skip the first immediate tick
            ticker.tick().await;

            let mut count = 0u64;
            loop {
                ticker.tick().await;
                count += 1;
                if tx.send(count).is_err() {
                    tracing::debug!("No tick subscribers left, stopping ticker");
                    break;
                }
            }
        });

        (Self { handle }, rx)
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period() {
        let (_ticker, mut rx) = Ticker::spawn(Duration::from_secs(1));

        for expected in 1..=3u64 {
            rx.changed().await.unwrap();
            assert_eq!(*rx.borrow_and_update(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (ticker, mut rx) = Ticker::spawn(Duration::from_secs(1));
        rx.changed().await.unwrap();

        drop(ticker);

        // Sender goes away with the aborted task
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop() {
        let (ticker, mut rx) = Ticker::spawn(Duration::from_secs(1));
        ticker.stop();

        assert!(rx.changed().await.is_err());
        assert!(ticker.is_finished());
        assert_eq!(*rx.borrow(), 0);
    }
}
