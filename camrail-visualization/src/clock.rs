//! Real-time tick source for preview playback
//!
//! [`PreviewClock`] runs a tokio interval on the current runtime and delivers
//! one tick per period through a channel. The consumer applies each tick with
//! [`crate::PlaybackDriver::tick`] and stops the clock when the preview ends.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Periodic tick source, cancelled cooperatively
#[derive(Debug)]
pub struct PreviewClock {
    ticks: mpsc::Receiver<()>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    period: Duration,
}

impl PreviewClock {
    /// Start ticking every `period`. Must be called from within a tokio runtime.
    pub fn start(period: Duration) -> Self {
        let (tick_tx, ticks) = mpsc::channel(1);
        let (cancel, mut cancelled) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            // a late consumer gets fewer ticks, never a burst
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut cancelled => break,
                    _ = interval.tick() => {
                        if tick_tx.send(()).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            ticks,
            cancel: Some(cancel),
            task,
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick. Returns `false` once the clock is stopped.
    pub async fn next_tick(&mut self) -> bool {
        if self.cancel.is_none() {
            return false;
        }
        self.ticks.recv().await.is_some()
    }

    /// Stop delivering ticks. Ticks already due are discarded.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        self.ticks.close();
    }

    pub fn is_running(&self) -> bool {
        self.cancel.is_some() && !self.task.is_finished()
    }
}

impl Drop for PreviewClock {
    fn drop(&mut self) {
        self.stop();
    }
}
