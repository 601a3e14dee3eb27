//! Index accumulation and pagination.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, Receiver};
use serde::Serialize;
use url::Url;

use quill_actor::{Actor, CancelToken, Input};

use crate::orderer::{lock, SharedPost};
use crate::page::{compare_pages, order_pages, OrderedPage, PageMaker};

/// An index page emitted to the fan-out, shared by its consumers.
pub type SharedIndexPage = Arc<OrderedPage<IndexPage>>;

/// One page of an index: a slice of the index's posts.
///
/// The empty `index_id` is the global index; anything else is a tag.
#[derive(Debug, Clone, Serialize)]
pub struct IndexPage {
    pub index_id: String,
    pub number: usize,
    pub posts: Vec<SharedPost>,
}

fn file_name(number: usize) -> String {
    if number == 0 {
        "index.html".to_owned()
    } else {
        format!("page-{number:03}.html")
    }
}

/// Builds the indexer actor: a single worker files every ordered post
/// into the global index and into one index per tag, then, once the
/// orderer's slice channel closes, re-sorts each index, partitions it
/// into pages of `page_size`, links the pages of each index newest-first,
/// and emits them. Order across indices is unspecified.
pub fn indexer(
    input: Receiver<Vec<SharedPost>>,
    base_url: Url,
    page_size: usize,
) -> (impl Actor + Send, Receiver<SharedIndexPage>) {
    let (tx, rx) = bounded::<SharedIndexPage>(0);
    let indices = Arc::new(Mutex::new(HashMap::<String, Vec<SharedPost>>::new()));

    let ingest = {
        let indices = Arc::clone(&indices);
        move |_: &CancelToken, posts: Vec<SharedPost>| {
            let mut indices = lock(&indices);
            for post in posts {
                indices
                    .entry(String::new())
                    .or_default()
                    .push(Arc::clone(&post));
                for tag in &post.page.content.tags {
                    indices
                        .entry(tag.text.clone())
                        .or_default()
                        .push(Arc::clone(&post));
                }
            }
            Ok(())
        }
    };

    let paginate = move |cancel: &CancelToken| {
        let maker = PageMaker::new(base_url.clone(), "");
        let indices = std::mem::take(&mut *lock(&indices));
        for (id, mut posts) in indices {
            // Each index owns its reference vector; the shared slice
            // arrived ordered, but per-index vectors are re-sorted here.
            posts.sort_by(|a, b| compare_pages(&a.page, &b.page));

            let mut pages = Vec::new();
            for (number, chunk) in posts.chunks(page_size).enumerate() {
                let file = file_name(number);
                let path = if id.is_empty() {
                    file
                } else {
                    format!("{id}/{file}")
                };
                let page = maker.make(
                    &path,
                    number as i64,
                    IndexPage {
                        index_id: id.clone(),
                        number,
                        posts: chunk.to_vec(),
                    },
                )?;
                pages.push(OrderedPage::unlinked(page));
            }
            order_pages(&mut pages);
            for page in pages {
                cancel.send(&tx, Arc::new(page))?;
            }
        }
        Ok(())
    };

    let actor = Input::with_end("Indexer", 1, input, ingest, paginate);
    (actor, rx)
}
