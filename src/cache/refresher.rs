//! Background refresh for a [`ReviewsCache`].
//!
//! Request paths rebuild lazily on their own; the refresher just gets there
//! first, so most requests take the fast path even right after the corpus
//! changes.

use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::ReviewsCache;
use crate::corpus::Corpus;

/// Statistics from the refresh worker.
#[derive(Debug, Default, Clone)]
pub struct RefreshStats {
    pub polls: usize,
    pub rebuilds: usize,
    pub failures: usize,
}

/// A background thread that rebuilds a stale [`ReviewsCache`] eagerly.
///
/// ## Example
///
/// ```ignore
/// use open_reviews::{RefreshWorkerThread, ReviewsCache};
///
/// let worker = RefreshWorkerThread::from_config(cache.clone());
///
/// // ... corpus changes, cache.mark_stale() ...
///
/// let stats = worker.stop();
/// println!("Rebuilt {} times", stats.rebuilds);
/// ```
pub struct RefreshWorkerThread {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<RefreshStats>>,
}

impl RefreshWorkerThread {
    /// Spawn a worker polling at the cache's configured `refresh_interval`.
    pub fn from_config<C>(cache: ReviewsCache<C>) -> Self
    where
        C: Corpus + 'static,
    {
        let poll_interval = cache.config().refresh_interval;
        Self::spawn(cache, poll_interval)
    }

    /// Spawn a worker that checks the staleness flag every `poll_interval`.
    pub fn spawn<C>(cache: ReviewsCache<C>, poll_interval: Duration) -> Self
    where
        C: Corpus + 'static,
    {
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = RefreshStats::default();

            loop {
                stats.polls += 1;

                // Only count rebuilds this worker performed; a request that
                // got there first leaves nothing for us to do.
                match cache.refresh_if_stale() {
                    Ok(true) => stats.rebuilds += 1,
                    Ok(false) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "background reviews refresh failed");
                        stats.failures += 1;
                    }
                }

                // Waiting on the stop channel doubles as the poll delay.
                match stop_rx.recv_timeout(poll_interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }

            tracing::debug!(
                polls = stats.polls,
                rebuilds = stats.rebuilds,
                failures = stats.failures,
                "reviews refresher stopped"
            );

            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Stop the worker and return its statistics. Returns promptly even
    /// with a long poll interval, since the worker waits on the stop channel.
    pub fn stop(mut self) -> RefreshStats {
        self.signal_stop();
        self.handle
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }

    /// Ask the worker to exit after its current poll without joining it.
    pub fn signal_stop(&self) {
        // A worker that already exited has dropped the receiver.
        let _ = self.stop_tx.send(());
    }
}

impl Drop for RefreshWorkerThread {
    /// Detaches the worker; it exits at its next wait.
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.signal_stop();
        }
    }
}
