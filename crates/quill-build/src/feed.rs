//! JSON feeds for the global index.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveTime, SecondsFormat};
use serde::Serialize;
use url::Url;

use crate::indexer::IndexPage;
use crate::page::OrderedPage;

/// MIME type advertised for the feed documents.
pub const MIME_TYPE: &str = "application/json";

const VERSION: &str = "https://jsonfeed.org/version/1";
const HTML_SUFFIX: &str = ".html";
const JSON_SUFFIX: &str = ".json";

/// Fixed feed header fields, set once per site.
#[derive(Debug, Clone, Default)]
pub struct FeedHeader {
    pub title: String,
    pub description: String,
    pub author: String,
}

#[derive(Serialize)]
struct FeedDocument<'a> {
    version: &'static str,
    title: &'a str,
    home_page_url: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<FeedAuthor<'a>>,
    items: Vec<FeedItem<'a>>,
    /// Non-standard: the URL of the next (older) index page, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    next_url: Option<&'a str>,
}

#[derive(Serialize)]
struct FeedAuthor<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct FeedItem<'a> {
    id: &'a str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<FeedAuthor<'a>>,
    date_published: String,
    summary: &'a str,
}

/// Writes one JSON Feed document per global index page, mirroring the
/// page's path with a `.json` extension. Tag index pages are skipped:
/// feeds are global-only.
pub struct FeedBuilder {
    header: FeedHeader,
    out_root: PathBuf,
}

impl FeedBuilder {
    pub fn new(header: FeedHeader, out_root: impl Into<PathBuf>) -> Self {
        FeedBuilder {
            header,
            out_root: out_root.into(),
        }
    }

    pub fn build(&self, page: &OrderedPage<IndexPage>) -> Result<()> {
        if !page.page.content.index_id.is_empty() {
            return Ok(());
        }
        let path = feed_path(&page.page.path);
        let document = FeedDocument {
            version: VERSION,
            title: &self.header.title,
            home_page_url: page.page.url.as_str(),
            description: &self.header.description,
            author: author(&self.header.author),
            items: page
                .page
                .content
                .posts
                .iter()
                .map(|post| FeedItem {
                    id: post.page.url.as_str(),
                    url: post.page.url.as_str(),
                    author: author(&post.page.content.author),
                    date_published: post
                        .page
                        .content
                        .date
                        .and_time(NaiveTime::MIN)
                        .and_utc()
                        .to_rfc3339_opts(SecondsFormat::Secs, true),
                    summary: &post.page.content.snippet,
                })
                .collect(),
            next_url: page.next.as_ref().map(Url::as_str),
        };

        let out_path = self.out_root.join(&path);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory for feed `{path}`"))?;
        }
        let file =
            File::create(&out_path).with_context(|| format!("creating feed `{path}`"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &document)
            .with_context(|| format!("rendering feed `{path}`"))?;
        writer
            .flush()
            .with_context(|| format!("writing feed `{path}`"))?;
        Ok(())
    }
}

fn author(name: &str) -> Option<FeedAuthor<'_>> {
    (!name.is_empty()).then_some(FeedAuthor { name })
}

fn feed_path(page_path: &str) -> String {
    match page_path.strip_suffix(HTML_SUFFIX) {
        Some(stem) => format!("{stem}{JSON_SUFFIX}"),
        None => format!("{page_path}{JSON_SUFFIX}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use quill_mdx::Frontmatter;
    use std::sync::Arc;

    use crate::orderer::SharedPost;
    use crate::page::PageMaker;
    use crate::post::PostConverter;

    fn base() -> Url {
        Url::parse("https://example.org/").unwrap()
    }

    fn shared_post(name: &str, day: u32) -> SharedPost {
        let converter = PostConverter::new(base(), 2);
        let frontmatter = Frontmatter {
            title: name.to_owned(),
            author: "A".to_owned(),
            date: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            tags: Vec::new(),
        };
        Arc::new(OrderedPage::unlinked(
            converter
                .convert(&format!("{name}.md"), frontmatter, "Hi.")
                .unwrap(),
        ))
    }

    fn index_page(id: &str, number: usize, posts: Vec<SharedPost>) -> OrderedPage<IndexPage> {
        let maker = PageMaker::new(base(), "");
        let file = if number == 0 {
            "index.html".to_owned()
        } else {
            format!("page-{number:03}.html")
        };
        let path = if id.is_empty() {
            file
        } else {
            format!("{id}/{file}")
        };
        OrderedPage::unlinked(
            maker
                .make(
                    &path,
                    number as i64,
                    IndexPage {
                        index_id: id.to_owned(),
                        number,
                        posts,
                    },
                )
                .unwrap(),
        )
    }

    fn header() -> FeedHeader {
        FeedHeader {
            title: "Example".to_owned(),
            description: "An example site".to_owned(),
            author: "A".to_owned(),
        }
    }

    #[test]
    fn builds_a_feed_for_a_global_index_page() {
        let dir = tempfile::tempdir().unwrap();
        let posts = vec![shared_post("b", 2), shared_post("a", 1)];
        let page = index_page("", 0, posts);
        FeedBuilder::new(header(), dir.path()).build(&page).unwrap();

        let raw = fs::read_to_string(dir.path().join("index.json")).unwrap();
        let feed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(feed["version"], "https://jsonfeed.org/version/1");
        assert_eq!(feed["title"], "Example");
        assert_eq!(feed["home_page_url"], "https://example.org/index.html");

        let items = feed["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        // Items appear in post order.
        assert_eq!(items[0]["url"], "https://example.org/posts/b.html");
        assert_eq!(items[0]["date_published"], "2020-01-02T00:00:00Z");
        assert_eq!(items[0]["author"]["name"], "A");
        assert_eq!(items[1]["url"], "https://example.org/posts/a.html");

        assert!(feed.get("next_url").is_none());
    }

    #[test]
    fn next_url_points_at_the_older_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = index_page("", 0, vec![shared_post("a", 1)]);
        page.next = Some(base().join("page-001.html").unwrap());
        FeedBuilder::new(header(), dir.path()).build(&page).unwrap();

        let raw = fs::read_to_string(dir.path().join("index.json")).unwrap();
        let feed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(feed["next_url"], "https://example.org/page-001.html");
    }

    #[test]
    fn tag_index_pages_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let page = index_page("golang", 0, vec![shared_post("a", 1)]);
        FeedBuilder::new(header(), dir.path()).build(&page).unwrap();
        assert!(!dir.path().join("golang/index.json").exists());
        assert!(!dir.path().join("golang").exists());
    }

    #[test]
    fn later_pages_mirror_their_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let page = index_page("", 1, vec![shared_post("a", 1)]);
        FeedBuilder::new(header(), dir.path()).build(&page).unwrap();
        assert!(dir.path().join("page-001.json").exists());
    }
}
