//! Global post ordering.

use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::{bounded, Receiver};

use quill_actor::{Actor, CancelToken, Input};

use crate::page::{order_pages, OrderedPage, Page};
use crate::post::Post;

/// An ordered post, shared between the post templater and every index
/// that references it.
pub type SharedPost = Arc<OrderedPage<Post>>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        // A panicking sibling already aborted the run.
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Builds the orderer actor: a single worker accumulates every parsed
/// post, and once the input closes it sorts them newest-first, fills in
/// the neighbour links, emits the whole ordered slice once (for the
/// indexer), then each page individually (for the post templater). Both
/// output channels close when the actor exits.
pub fn orderer(
    input: Receiver<Page<Post>>,
) -> (
    impl Actor + Send,
    Receiver<Vec<SharedPost>>,
    Receiver<SharedPost>,
) {
    let (slice_tx, slice_rx) = bounded::<Vec<SharedPost>>(0);
    let (page_tx, page_rx) = bounded::<SharedPost>(0);

    let pages = Arc::new(Mutex::new(Vec::<OrderedPage<Post>>::new()));
    let accumulate = {
        let pages = Arc::clone(&pages);
        move |_: &CancelToken, page: Page<Post>| {
            lock(&pages).push(OrderedPage::unlinked(page));
            Ok(())
        }
    };
    let flush = move |cancel: &CancelToken| {
        let mut ordered = std::mem::take(&mut *lock(&pages));
        order_pages(&mut ordered);
        let shared: Vec<SharedPost> = ordered.into_iter().map(Arc::new).collect();
        cancel.send(&slice_tx, shared.clone())?;
        for page in shared {
            cancel.send(&page_tx, page)?;
        }
        Ok(())
    };

    let actor = Input::with_end("Orderer", 1, input, accumulate, flush);
    (actor, slice_rx, page_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use quill_actor::CancelHandle;
    use quill_mdx::Frontmatter;
    use url::Url;

    use crate::post::PostConverter;

    fn post_page(name: &str, date: (i32, u32, u32)) -> Page<Post> {
        let converter = PostConverter::new(Url::parse("https://example.org/").unwrap(), 2);
        let frontmatter = Frontmatter {
            title: name.to_owned(),
            author: "A".to_owned(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            tags: Vec::new(),
        };
        converter
            .convert(&format!("{name}.md"), frontmatter, "Hi.")
            .unwrap()
    }

    #[test]
    fn emits_the_slice_then_each_page_newest_first() {
        let (tx, rx) = bounded(0);
        let (actor, slices, pages) = orderer(rx);
        let handle = CancelHandle::new();
        let token = handle.token();
        std::thread::scope(|scope| {
            let running = scope.spawn(|| Box::new(actor).run(&token));
            let slice_reader = scope.spawn(move || slices.iter().collect::<Vec<_>>());
            let page_reader = scope.spawn(move || pages.iter().collect::<Vec<_>>());

            tx.send(post_page("old", (2020, 1, 1))).unwrap();
            tx.send(post_page("new", (2020, 2, 1))).unwrap();
            drop(tx);
            running.join().unwrap().unwrap();

            let slices = slice_reader.join().unwrap();
            assert_eq!(slices.len(), 1);
            let slice = &slices[0];
            assert_eq!(slice[0].page.content.title, "new");
            assert_eq!(slice[1].page.content.title, "old");

            // new is the head: no next, prev points at old.
            assert_eq!(slice[0].next, None);
            assert_eq!(
                slice[0].prev.as_ref().unwrap().as_str(),
                "https://example.org/posts/old.html"
            );
            assert_eq!(
                slice[1].next.as_ref().unwrap().as_str(),
                "https://example.org/posts/new.html"
            );
            assert_eq!(slice[1].prev, None);

            let individual = page_reader.join().unwrap();
            let titles: Vec<&str> = individual
                .iter()
                .map(|p| p.page.content.title.as_str())
                .collect();
            assert_eq!(titles, ["new", "old"]);
        });
    }

    #[test]
    fn empty_input_emits_an_empty_slice_and_no_pages() {
        let (tx, rx) = bounded::<Page<Post>>(0);
        let (actor, slices, pages) = orderer(rx);
        let handle = CancelHandle::new();
        let token = handle.token();
        std::thread::scope(|scope| {
            let running = scope.spawn(|| Box::new(actor).run(&token));
            let slice_reader = scope.spawn(move || slices.iter().collect::<Vec<_>>());
            let page_reader = scope.spawn(move || pages.iter().collect::<Vec<_>>());
            drop(tx);
            running.join().unwrap().unwrap();
            assert_eq!(slice_reader.join().unwrap().len(), 1);
            assert!(page_reader.join().unwrap().is_empty());
        });
    }
}
