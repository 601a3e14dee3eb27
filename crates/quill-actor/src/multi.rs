//! Running a whole actor graph.

use anyhow::Result;
use crossbeam_channel::bounded;

use crate::{was_cancelled, Actor, CancelHandle, Cancelled};

/// Runs every actor concurrently under `handle` and waits for all of them.
///
/// The first failure cancels the handle so the rest of the graph unwinds
/// promptly; the error reported is the first one that is not itself a
/// cancellation. A run that was cancelled from outside, with no other
/// failure, reports [`Cancelled`].
pub fn run_all<'env>(
    actors: Vec<Box<dyn Actor + Send + 'env>>,
    handle: &CancelHandle,
) -> Result<()> {
    std::thread::scope(|scope| {
        let (tx, rx) = bounded(actors.len());
        for actor in actors {
            let tx = tx.clone();
            let token = handle.token();
            scope.spawn(move || {
                let _ = tx.send(actor.run(&token));
            });
        }
        drop(tx);

        let mut first = None;
        for result in rx {
            if let Err(err) = result {
                handle.cancel();
                if first.is_none() && !was_cancelled(&err) {
                    first = Some(err);
                }
            }
        }
        match first {
            Some(err) => Err(err),
            None if handle.is_cancelled() => Err(Cancelled.into()),
            None => Ok(()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CancelToken, Input, Map, Output};

    #[test]
    fn clean_graph_runs_to_completion() {
        let handle = CancelHandle::new();
        let produced = std::sync::Mutex::new(0u32);
        let (source, numbers) = Output::new("source", 1, move |_: &CancelToken| {
            let mut n = match produced.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *n += 1;
            Ok((*n <= 5).then_some(*n))
        });
        let (double, doubled) = Map::new("double", 2, numbers, |_: &CancelToken, n: u32| Ok(n * 2));
        let total = std::sync::atomic::AtomicU32::new(0);
        let sink = Input::new("sum", 2, doubled, |_: &CancelToken, n: u32| {
            total.fetch_add(n, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        });
        run_all(
            vec![Box::new(source), Box::new(double), Box::new(sink)],
            &handle,
        )
        .unwrap();
        assert_eq!(total.load(std::sync::atomic::Ordering::SeqCst), 30);
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn sink_failure_cancels_endless_producer() {
        let handle = CancelHandle::new();
        let (source, numbers) = Output::new("endless", 1, |_: &CancelToken| Ok(Some(1u32)));
        let sink = Input::new("fussy", 1, numbers, |_: &CancelToken, _n| {
            anyhow::bail!("cannot abide")
        });
        let err = run_all(vec![Box::new(source), Box::new(sink)], &handle).unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("fussy"), "got: {rendered}");
        assert!(rendered.contains("cannot abide"), "got: {rendered}");
        assert!(handle.is_cancelled());
    }

    #[test]
    fn external_cancellation_reports_cancelled() {
        let handle = CancelHandle::new();
        handle.cancel();
        let (source, numbers) = Output::new("endless", 1, |_: &CancelToken| Ok(Some(1u32)));
        let sink = Input::new("sink", 1, numbers, |_: &CancelToken, _n: u32| Ok(()));
        let err = run_all(vec![Box::new(source), Box::new(sink)], &handle).unwrap_err();
        assert!(was_cancelled(&err));
    }
}
