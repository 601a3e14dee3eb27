//! Run-wide cancellation.
//!
//! A [`CancelHandle`] owns the sender side of a channel that never carries
//! a message; [`CancelToken`]s hold the receiver side plus an atomic flag.
//! Cancelling drops the sender, so every `select!` blocked on the token's
//! channel wakes immediately.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, select, Receiver, Sender};

/// Error carried by operations interrupted by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cancelled")]
pub struct Cancelled;

/// Reports whether `err` is (or was caused by) pipeline cancellation.
pub fn was_cancelled(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<Cancelled>().is_some())
}

/// The cancelling side, held by the pipeline runner.
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    sender: Mutex<Option<Sender<Infallible>>>,
    receiver: Receiver<Infallible>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        CancelHandle {
            flag: Arc::new(AtomicBool::new(false)),
            sender: Mutex::new(Some(sender)),
            receiver,
        }
    }

    /// A token observing this handle. Tokens are cheap to clone.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            flag: Arc::clone(&self.flag),
            done: self.receiver.clone(),
        }
    }

    /// Cancels the run. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let mut sender = match self.sender.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sender.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// The observing side, passed to every actor and worker.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    done: Receiver<Infallible>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Cancellation point for loops between I/O operations.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Receives from `input`, or fails if the run is cancelled first.
    /// `Ok(None)` means the channel is closed and drained.
    pub fn recv<T>(&self, input: &Receiver<T>) -> Result<Option<T>, Cancelled> {
        self.check()?;
        select! {
            recv(self.done) -> _ => Err(Cancelled),
            recv(input) -> msg => Ok(msg.ok()),
        }
    }

    /// Sends `value` on `output`, or fails if the run is cancelled first.
    ///
    /// A disconnected receiver also maps to [`Cancelled`]: receivers only
    /// disappear while the pipeline is tearing down.
    pub fn send<T>(&self, output: &Sender<T>, value: T) -> Result<(), Cancelled> {
        self.check()?;
        select! {
            recv(self.done) -> _ => Err(Cancelled),
            send(output, value) -> sent => sent.map_err(|_| Cancelled),
        }
    }
}
