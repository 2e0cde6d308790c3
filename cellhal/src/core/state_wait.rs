//! Completion signals for asynchronous operations.
//!
//! Operations that the contract answers through a callback (profile
//! changes, data session start, slot selection) return a [`Completion`]
//! right after validation. The work runs in a spawned task, which resolves
//! the completion when it is done:
//!
//! - awaiting the completion yields the operation's result
//! - dropping it cancels interest; the operation itself still finishes
//! - [`Completion::wait_timeout`] bounds the wait, since the contract has
//!   no timeout of its own

use futures::{FutureExt, select};
use futures_timer::Delay;
use log::{debug, warn};
use std::future::Future;
use std::pin::{Pin, pin};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::Result;
use crate::api::models::HalError;

/// Result of an operation that completes after the call returned.
///
/// # Example
///
/// ```no_run
/// use cellhal::{CellularModem, ModemOptions, ProfileBuilder, SimulatedModem};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> cellhal::Result<()> {
/// let modem = CellularModem::new(Arc::new(SimulatedModem::default()), ModemOptions::default());
/// let profile = ProfileBuilder::new(2, "iot").apn("iot.example").build()?;
///
/// let event = modem
///     .profile_create(profile)
///     .await?
///     .wait_timeout(Duration::from_secs(5))
///     .await?;
/// println!("profile {} {}", event.profile_id, event.action);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited; drop it to ignore the outcome"]
pub struct Completion<T> {
    rx: oneshot::Receiver<Result<T>>,
}

/// Sending half of a [`Completion`], owned by the task doing the work.
#[derive(Debug)]
pub(crate) struct Completer<T> {
    tx: oneshot::Sender<Result<T>>,
}

impl<T> Completer<T> {
    /// Resolves the completion. A dropped receiver only means nobody is
    /// waiting any more.
    pub(crate) fn complete(self, result: Result<T>) {
        if self.tx.send(result).is_err() {
            debug!("Completion dropped before the operation finished");
        }
    }
}

impl<T> Completion<T> {
    pub(crate) fn channel() -> (Completer<T>, Completion<T>) {
        let (tx, rx) = oneshot::channel();
        (Completer { tx }, Completion { rx })
    }

    /// Waits for the result, giving up after `timeout`.
    ///
    /// Timing out does not roll the operation back; the modem may still
    /// apply it.
    pub async fn wait_timeout(self, timeout: Duration) -> Result<T> {
        let mut result = self.fuse();
        let mut timeout_delay = pin!(Delay::new(timeout).fuse());

        select! {
            r = result => r,
            _ = timeout_delay => {
                warn!("Operation did not complete within {timeout:?}");
                Err(HalError::Timeout)
            }
        }
    }
}

impl<T: Send + 'static> Completion<T> {
    /// Hands the result to `callback` from a background task.
    pub fn on_complete<F>(self, callback: F)
    where
        F: FnOnce(Result<T>) + Send + 'static,
    {
        tokio::spawn(async move {
            callback(self.await);
        });
    }
}

impl<T> Future for Completion<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx
            .poll_unpin(cx)
            .map(|r| r.unwrap_or(Err(HalError::Cancelled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_with_sent_result() {
        let (completer, completion) = Completion::channel();
        completer.complete(Ok(7u32));
        assert_eq!(completion.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn dropped_completer_is_cancellation() {
        let (completer, completion) = Completion::<u32>::channel();
        drop(completer);
        assert!(matches!(completion.await, Err(HalError::Cancelled)));
    }

    #[tokio::test]
    async fn wait_timeout_expires() {
        let (_completer, completion) = Completion::<u32>::channel();
        let result = completion.wait_timeout(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(HalError::Timeout)));
    }

    #[tokio::test]
    async fn on_complete_invokes_callback() {
        let (completer, completion) = Completion::channel();
        let (tx, rx) = oneshot::channel();
        completion.on_complete(move |r: Result<&'static str>| {
            let _ = tx.send(r.unwrap());
        });
        completer.complete(Ok("done"));
        assert_eq!(rx.await.unwrap(), "done");
    }
}
