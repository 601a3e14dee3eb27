//! Transforming actors.

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::{run_workers, wrap_actor_err, Actor, CancelToken};

/// An actor that applies a callback to every input element and emits the
/// result on an owned output channel. The output closes when `run`
/// returns.
pub struct Map<I, O, F> {
    name: String,
    workers: usize,
    rx: Receiver<I>,
    tx: Sender<O>,
    transform: F,
}

impl<I, O, F> Map<I, O, F>
where
    I: Send,
    O: Send,
    F: Fn(&CancelToken, I) -> Result<O> + Send + Sync,
{
    pub fn new(
        name: impl Into<String>,
        workers: usize,
        rx: Receiver<I>,
        transform: F,
    ) -> (Self, Receiver<O>) {
        let (tx, out) = bounded(0);
        let actor = Map {
            name: name.into(),
            workers: workers.max(1),
            rx,
            tx,
            transform,
        };
        (actor, out)
    }
}

impl<I, O, F> Actor for Map<I, O, F>
where
    I: Send,
    O: Send,
    F: Fn(&CancelToken, I) -> Result<O> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(self: Box<Self>, cancel: &CancelToken) -> Result<()> {
        let Map {
            name,
            workers,
            rx,
            tx,
            transform,
        } = *self;
        tracing::debug!(actor = %name, "starting actor");
        let result = run_workers(workers, || loop {
            match cancel.recv(&rx)? {
                Some(item) => {
                    let out = transform(cancel, item)?;
                    cancel.send(&tx, out)?;
                }
                None => return Ok(()),
            }
        });
        tracing::debug!(actor = %name, "closing actor");
        wrap_actor_err(&name, result)
    }
}
