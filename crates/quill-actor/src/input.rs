//! Consumer actors.

use std::sync::Mutex;

use anyhow::Result;
use crossbeam_channel::Receiver;

use crate::{run_workers, wrap_actor_err, Actor, CancelToken};

type NoEnd = fn(&CancelToken) -> Result<()>;

/// An actor that consumes an input channel and emits nothing downstream.
///
/// The optional end-of-input callback runs exactly once, by whichever
/// worker first observes the closed channel, before the actor terminates.
pub struct Input<T, F, E = NoEnd> {
    name: String,
    workers: usize,
    rx: Receiver<T>,
    on_item: F,
    on_end: Mutex<Option<E>>,
}

impl<T, F> Input<T, F>
where
    T: Send,
    F: Fn(&CancelToken, T) -> Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, workers: usize, rx: Receiver<T>, on_item: F) -> Self {
        Input {
            name: name.into(),
            workers: workers.max(1),
            rx,
            on_item,
            on_end: Mutex::new(None),
        }
    }
}

impl<T, F, E> Input<T, F, E>
where
    T: Send,
    F: Fn(&CancelToken, T) -> Result<()> + Send + Sync,
    E: FnOnce(&CancelToken) -> Result<()> + Send,
{
    pub fn with_end(
        name: impl Into<String>,
        workers: usize,
        rx: Receiver<T>,
        on_item: F,
        on_end: E,
    ) -> Self {
        Input {
            name: name.into(),
            workers: workers.max(1),
            rx,
            on_item,
            on_end: Mutex::new(Some(on_end)),
        }
    }
}

impl<T, F, E> Actor for Input<T, F, E>
where
    T: Send,
    F: Fn(&CancelToken, T) -> Result<()> + Send + Sync,
    E: FnOnce(&CancelToken) -> Result<()> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(self: Box<Self>, cancel: &CancelToken) -> Result<()> {
        let Input {
            name,
            workers,
            rx,
            on_item,
            on_end,
        } = *self;
        tracing::debug!(actor = %name, "starting actor");
        let result = run_workers(workers, || loop {
            match cancel.recv(&rx)? {
                Some(item) => on_item(cancel, item)?,
                None => {
                    let end = match on_end.lock() {
                        Ok(mut guard) => guard.take(),
                        // A panicking sibling already aborted the run.
                        Err(poisoned) => poisoned.into_inner().take(),
                    };
                    if let Some(end) = end {
                        end(cancel)?;
                    }
                    return Ok(());
                }
            }
        });
        tracing::debug!(actor = %name, "closing actor");
        wrap_actor_err(&name, result)
    }
}
