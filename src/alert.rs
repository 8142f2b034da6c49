//! One-shot alert that fires when the next tide event arrives.

use crate::clock::Clock;
use crate::TideSample;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A scheduled alert for a single tide event.
pub struct TideAlert {
    event: TideSample,
    cancel: CancellationToken,
    handle: Option<JoinHandle<bool>>,
}

impl TideAlert {
    /// Schedule `on_fire` to run once `event.time` is reached.
    ///
    /// Events already in the past fire on the next scheduler turn.
    pub fn schedule<F>(event: TideSample, clock: Arc<dyn Clock>, on_fire: F) -> Self
    where
        F: FnOnce(TideSample) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let wait = (event.time - clock.now()).to_std().unwrap_or_default();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    on_fire(event);
                    true
                }
                _ = token.cancelled() => false,
            }
        });

        Self {
            event,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn event(&self) -> TideSample {
        self.event
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the alert; `true` if it fired, `false` if it was cancelled.
    pub async fn fired(mut self) -> bool {
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or_else(|e| {
                log::error!("alert task failed: {e}");
                false
            }),
            None => false,
        }
    }
}

impl Drop for TideAlert {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Holds the single pending alert; setting a new one cancels the previous.
#[derive(Default)]
pub struct AlertSlot {
    pending: Option<TideAlert>,
}

impl AlertSlot {
    pub fn set(&mut self, alert: TideAlert) {
        if let Some(old) = self.pending.replace(alert) {
            log::info!("replacing alert for {}", old.event().time);
            old.cancel();
        }
    }

    pub fn take(&mut self) -> Option<TideAlert> {
        self.pending.take()
    }
}
