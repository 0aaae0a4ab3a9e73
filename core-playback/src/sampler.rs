//! Periodic position sampler.
//!
//! A [`ProgressSampler`] runs a callback at a fixed period on the tokio
//! runtime. It can be suspended and resumed without losing the task, and it
//! stops for good on [`shutdown`](ProgressSampler::shutdown) or drop. The
//! callback never runs after either returns.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

pub struct ProgressSampler {
    running: watch::Sender<bool>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

impl ProgressSampler {
    /// Start sampling every `period`, first tick one period from now.
    ///
    /// `tick` returns `false` to stop the sampler from inside.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (running, mut running_rx) = watch::channel(true);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                if !*running_rx.borrow_and_update() {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        changed = running_rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            // Restart the cadence from the moment of resume.
                            ticker.reset();
                            continue;
                        }
                    }
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = running_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        if token.is_cancelled() || !*running_rx.borrow() {
                            continue;
                        }
                        if !tick() {
                            break;
                        }
                    }
                }
            }
            trace!("Progress sampler exited");
        });

        Self {
            running,
            cancel,
            handle: Some(handle),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop ticking without tearing down the task.
    pub fn suspend(&self) {
        self.running.send_replace(false);
    }

    pub fn resume(&self) {
        self.running.send_replace(true);
    }

    /// Whether ticks are currently being delivered.
    pub fn is_running(&self) -> bool {
        *self.running.borrow()
            && !self.cancel.is_cancelled()
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop permanently. Idempotent.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ProgressSampler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ProgressSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSampler")
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish()
    }
}
