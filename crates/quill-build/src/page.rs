//! The page data model shared by every templated output.

use serde::Serialize;
use url::Url;

/// A unit of output: some content bound to an output path, an absolute
/// URL, and an ordering key (newest-first sorting uses descending keys).
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: T,

    /// Sort key; posts use their publication date in nanoseconds since
    /// the epoch, index pages their page number.
    pub order: i64,

    /// Output path relative to the output directory, `/`-separated.
    pub path: String,

    /// Absolute URL, `base_url` joined with `path`.
    pub url: Url,
}

/// A page enriched with links to its ordered neighbours.
///
/// `next` points at the position-wise newer sibling (larger order key),
/// `prev` at the older one.
#[derive(Debug, Clone, Serialize)]
pub struct OrderedPage<T> {
    #[serde(flatten)]
    pub page: Page<T>,

    pub next: Option<Url>,
    pub prev: Option<Url>,
}

impl<T> OrderedPage<T> {
    pub fn unlinked(page: Page<T>) -> Self {
        OrderedPage {
            page,
            next: None,
            prev: None,
        }
    }
}

/// Newest-first page ordering: descending order key, ties broken by
/// ascending path so runs are deterministic.
pub fn compare_pages<T>(a: &Page<T>, b: &Page<T>) -> std::cmp::Ordering {
    b.order.cmp(&a.order).then_with(|| a.path.cmp(&b.path))
}

/// Sorts pages newest-first (see [`compare_pages`]) and fills in the
/// positional prev/next links: `next[i] = pages[i-1].url`,
/// `prev[i] = pages[i+1].url`.
pub fn order_pages<T>(pages: &mut [OrderedPage<T>]) {
    if pages.is_empty() {
        return;
    }
    pages.sort_by(|a, b| compare_pages(&a.page, &b.page));
    for i in 1..pages.len() {
        pages[i].next = Some(pages[i - 1].page.url.clone());
        pages[i - 1].prev = Some(pages[i].page.url.clone());
    }
}

/// Builds a [`Page`] by joining a relative path onto the site base URL,
/// optionally under a fixed directory prefix.
#[derive(Debug, Clone)]
pub struct PageMaker {
    base_url: Url,
    directory: String,
}

impl PageMaker {
    pub fn new(base_url: Url, directory: impl Into<String>) -> Self {
        PageMaker {
            base_url,
            directory: directory.into(),
        }
    }

    pub fn make<T>(&self, path: &str, order: i64, content: T) -> Result<Page<T>, url::ParseError> {
        let path = if self.directory.is_empty() {
            path.to_owned()
        } else {
            format!("{}/{}", self.directory, path)
        };
        let url = self.base_url.join(&path)?;
        Ok(Page {
            content,
            order,
            path,
            url,
        })
    }
}

/// Read-only record shared by every template invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub base_url: Url,
    pub home_page: Url,
    pub theme_assets: Url,
    pub feed_url: Url,
    pub feed_type: String,
}
