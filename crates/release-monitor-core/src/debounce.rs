//! Trailing-edge debouncing for search-as-you-type input

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

/// Collapses bursts of calls into one handler invocation.
///
/// The handler runs with the last value of a burst once `delay` has passed
/// without a new call. Handler invocations are spawned, so a slow handler
/// never holds back the next burst.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be called from within a Tokio runtime
    pub fn new<F, Fut>(delay: Duration, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    match tokio::time::timeout(delay, rx.recv()).await {
                        Ok(Some(value)) => latest = value,
                        // Quiet period elapsed, or every sender is gone
                        Ok(None) | Err(_) => break,
                    }
                }
                tokio::spawn(handler(latest));
            }
        });

        Self { tx }
    }

    pub fn call(&self, value: T) {
        if self.tx.send(value).is_err() {
            tracing::warn!("Debounce worker has stopped; dropping call");
        }
    }
}
