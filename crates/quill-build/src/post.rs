//! Posts and their conversion into pages.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use url::Url;

use quill_mdx::{Frontmatter, Renderer};

use crate::page::{Page, PageMaker};

const MD_SUFFIX: &str = ".md";
const HTML_SUFFIX: &str = ".html";
const MORE_MARKER: &str = "<!-- more -->";
const PARAGRAPH_END: &str = "</p>";
const SNIPPET_CAP: usize = 1024;

/// A tag label plus the URL of the tag's first index page.
#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub text: String,
    pub url: Url,
}

/// A fully converted post: metadata, rendered body, snippet.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub title: String,
    pub author: String,
    pub date: NaiveDate,
    pub tags: Vec<Tag>,

    /// Source-relative path with the extension rewritten for output.
    pub path: String,

    /// Rendered HTML body.
    pub body: String,

    /// HTML prefix shown on index pages and in feeds.
    pub snippet: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("building page url: {0}")]
    Url(#[from] url::ParseError),

    #[error("date `{0}` is outside the representable range")]
    DateRange(NaiveDate),
}

/// Turns parsed post sources into `Page<Post>` values: rewrites the path
/// under `posts/`, resolves the page URL, keys the page by its date, and
/// renders body and snippet.
#[derive(Debug, Clone)]
pub struct PostConverter {
    base_url: Url,
    pages: PageMaker,
    renderer: Renderer,
}

impl PostConverter {
    pub fn new(base_url: Url, deprecate_headings: u8) -> Self {
        PostConverter {
            pages: PageMaker::new(base_url.clone(), "posts"),
            renderer: Renderer::new(base_url.clone(), deprecate_headings),
            base_url,
        }
    }

    pub fn convert(
        &self,
        source_path: &str,
        frontmatter: Frontmatter,
        body: &str,
    ) -> Result<Page<Post>, PostError> {
        let path = rewrite_extension(source_path);
        let order = frontmatter
            .date
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp_nanos_opt()
            .ok_or(PostError::DateRange(frontmatter.date))?;
        let tags = frontmatter
            .tags
            .iter()
            .map(|text| {
                Ok(Tag {
                    text: text.clone(),
                    url: self.base_url.join(&format!("{text}/index.html"))?,
                })
            })
            .collect::<Result<Vec<Tag>, url::ParseError>>()?;

        let post = Post {
            title: frontmatter.title,
            author: frontmatter.author,
            date: frontmatter.date,
            tags,
            path: path.clone(),
            body: String::new(),
            snippet: String::new(),
        };
        let mut page = self.pages.make(&path, order, post)?;
        page.content.body = self.renderer.render(&page.url, body);
        page.content.snippet = snippet(&page.content.body).to_owned();
        Ok(page)
    }
}

fn rewrite_extension(path: &str) -> String {
    match path.strip_suffix(MD_SUFFIX) {
        Some(stem) => format!("{stem}{HTML_SUFFIX}"),
        None => path.to_owned(),
    }
}

/// Extracts the index-page snippet from a rendered body: the prefix before
/// the first `<!-- more -->` marker, else everything through the first
/// `</p>` (capped at 1024 bytes), else empty.
pub fn snippet(body: &str) -> &str {
    if let Some(idx) = body.find(MORE_MARKER) {
        return &body[..idx];
    }
    if let Some(idx) = body.find(PARAGRAPH_END) {
        if idx <= SNIPPET_CAP {
            return &body[..idx + PARAGRAPH_END.len()];
        }
        return &body[..floor_char_boundary(body, SNIPPET_CAP)];
    }
    ""
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
