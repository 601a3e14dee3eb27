//! Broadcast actors.

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::{wrap_actor_err, Actor, CancelToken};

/// Forwards every input element to each of its output channels in
/// sequence, so the slowest consumer paces the rest. Cancellation is
/// observed between forwards. All outputs close on exit.
pub struct FanOut<T> {
    name: String,
    rx: Receiver<T>,
    txs: Vec<Sender<T>>,
}

impl<T> FanOut<T>
where
    T: Clone + Send,
{
    pub fn new<const N: usize>(name: impl Into<String>, rx: Receiver<T>) -> (Self, [Receiver<T>; N]) {
        let mut txs = Vec::with_capacity(N);
        let outs = std::array::from_fn(|_| {
            let (tx, out) = bounded(0);
            txs.push(tx);
            out
        });
        let actor = FanOut {
            name: name.into(),
            rx,
            txs,
        };
        (actor, outs)
    }
}

impl<T> Actor for FanOut<T>
where
    T: Clone + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(self: Box<Self>, cancel: &CancelToken) -> Result<()> {
        let FanOut { name, rx, txs } = *self;
        tracing::debug!(actor = %name, "starting actor");
        let result = (|| loop {
            match cancel.recv(&rx)? {
                Some(value) => {
                    for tx in &txs {
                        cancel.send(tx, value.clone())?;
                    }
                }
                None => return Ok(()),
            }
        })();
        tracing::debug!(actor = %name, "closing actor");
        wrap_actor_err(&name, result)
    }
}
