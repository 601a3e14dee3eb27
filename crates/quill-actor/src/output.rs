//! Producer actors.

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::{run_workers, wrap_actor_err, Actor, CancelToken};

/// An actor with no input: its producer callback is invoked repeatedly and
/// each `Ok(Some(value))` is emitted downstream. `Ok(None)` stops the
/// calling worker cleanly; the output channel closes once every worker has
/// stopped and `run` returns.
///
/// The producer is shared by all workers, so a stateful producer must
/// synchronise its own state.
pub struct Output<T, F> {
    name: String,
    workers: usize,
    producer: F,
    tx: Sender<T>,
}

impl<T, F> Output<T, F>
where
    T: Send,
    F: Fn(&CancelToken) -> Result<Option<T>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, workers: usize, producer: F) -> (Self, Receiver<T>) {
        let (tx, rx) = bounded(0);
        let actor = Output {
            name: name.into(),
            workers: workers.max(1),
            producer,
            tx,
        };
        (actor, rx)
    }
}

impl<T, F> Actor for Output<T, F>
where
    T: Send,
    F: Fn(&CancelToken) -> Result<Option<T>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(self: Box<Self>, cancel: &CancelToken) -> Result<()> {
        let Output {
            name,
            workers,
            producer,
            tx,
        } = *self;
        tracing::debug!(actor = %name, "starting actor");
        let result = run_workers(workers, || loop {
            match producer(cancel)? {
                Some(value) => cancel.send(&tx, value)?,
                None => return Ok(()),
            }
        });
        tracing::debug!(actor = %name, "closing actor");
        wrap_actor_err(&name, result)
    }
}
