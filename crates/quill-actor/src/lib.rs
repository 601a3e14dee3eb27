//! Channel-based actor primitives.
//!
//! A pipeline is a set of actors connected by rendezvous channels. Each
//! actor runs one or more worker threads that consume from an input
//! channel and/or produce onto an owned output channel. Output channels
//! close when the owning actor's `run` returns (every `Sender` clone is
//! dropped), which is how termination cascades from sources to sinks.
//!
//! All blocking channel operations select against the run's cancellation
//! handle, so a failing actor brings the whole graph down promptly.

pub mod cancel;
mod fanout;
mod input;
mod map;
mod multi;
mod output;

pub use cancel::{was_cancelled, CancelHandle, CancelToken, Cancelled};
pub use fanout::FanOut;
pub use input::Input;
pub use map::Map;
pub use multi::run_all;
pub use output::Output;

/// A runnable pipeline stage.
///
/// `run` consumes the actor and returns once every worker has exited,
/// either because the input side of the graph completed, the producer
/// signalled a stop, or the run was cancelled.
pub trait Actor {
    fn name(&self) -> &str;

    fn run(self: Box<Self>, cancel: &CancelToken) -> anyhow::Result<()>;
}

/// Runs `worker` on `workers` scoped threads and returns the first error.
///
/// Sibling workers keep draining after one fails; the caller observes
/// completion only when all of them have exited.
pub(crate) fn run_workers<F>(workers: usize, worker: F) -> anyhow::Result<()>
where
    F: Fn() -> anyhow::Result<()> + Sync,
{
    if workers <= 1 {
        return worker();
    }
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers).map(|_| scope.spawn(&worker)).collect();
        let mut first = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    if first.is_none() {
                        first = Some(err);
                    }
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        first.map_or(Ok(()), Err)
    })
}

/// Prefixes actor errors with the actor name; cancellation passes through
/// untouched so the runner can tell the two apart.
pub(crate) fn wrap_actor_err(name: &str, result: anyhow::Result<()>) -> anyhow::Result<()> {
    result.map_err(|err| {
        if was_cancelled(&err) {
            err
        } else {
            err.context(name.to_owned())
        }
    })
}
