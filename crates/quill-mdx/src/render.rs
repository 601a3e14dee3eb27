//! Markdown to HTML conversion with site-aware rewrites.
//!
//! The rewrites run as an event-mapping stage between the parser and the
//! HTML renderer:
//!
//! - heading levels are bumped by a fixed delta (the site header occupies
//!   `h1` and the post title `h2`), clamped at `h6`;
//! - link destinations are resolved to absolute URLs: a bare absolute path
//!   resolves under the site base URL, anything else against the current
//!   page's URL; destinations that fail to parse are logged and left
//!   alone;
//! - in-site destinations ending in `.md` are rewritten to `.html`;
//! - footnote references and definitions render with absolute
//!   `fnref:`/`fn:` anchors so a footnote link still resolves when the
//!   post body is embedded as a snippet on another page.

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use pulldown_cmark_escape::{escape_href, escape_html};
use url::Url;

const MD_SUFFIX: &str = ".md";
const HTML_SUFFIX: &str = ".html";

/// Site-aware markdown renderer. One instance serves the whole run.
#[derive(Debug, Clone)]
pub struct Renderer {
    base_url: Url,
    deprecate_headings: u8,
}

impl Renderer {
    pub fn new(base_url: Url, deprecate_headings: u8) -> Self {
        Renderer {
            base_url,
            deprecate_headings,
        }
    }

    /// Renders `source` to HTML. `page_url` is the absolute URL of the
    /// page under construction; relative links and footnote anchors
    /// resolve against it.
    pub fn render(&self, page_url: &Url, source: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let events = Parser::new_ext(source, options).map(|event| self.rewrite(page_url, event));
        let mut out = String::new();
        html::push_html(&mut out, events);
        out
    }

    fn rewrite<'a>(&self, page_url: &Url, event: Event<'a>) -> Event<'a> {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => Event::Start(Tag::Heading {
                level: deprecate(level, self.deprecate_headings),
                id,
                classes,
                attrs,
            }),
            Event::End(TagEnd::Heading(level)) => {
                Event::End(TagEnd::Heading(deprecate(level, self.deprecate_headings)))
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: self.patch_destination(page_url, dest_url),
                title,
                id,
            }),
            Event::FootnoteReference(name) => {
                Event::InlineHtml(footnote_reference(page_url, &name).into())
            }
            Event::Start(Tag::FootnoteDefinition(name)) => {
                Event::Html(footnote_definition(&name).into())
            }
            Event::End(TagEnd::FootnoteDefinition) => Event::Html("</div>\n".into()),
            other => other,
        }
    }

    /// Resolves a link destination to an absolute URL and converts in-site
    /// markdown targets to their rendered counterparts.
    fn patch_destination<'a>(&self, page_url: &Url, dest: CowStr<'a>) -> CowStr<'a> {
        if dest.is_empty() {
            return dest;
        }
        let resolved = match dest.strip_prefix('/') {
            // A protocol-relative destination keeps its host; a bare
            // absolute path lands under the site root.
            Some(path) if !path.starts_with('/') => self.base_url.join(path),
            _ => page_url.join(&dest),
        };
        let url = match resolved {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(
                    destination = %dest,
                    page = %page_url,
                    error = %err,
                    "invalid link url",
                );
                return dest;
            }
        };
        let mut text = String::from(url);
        if text.starts_with(self.base_url.as_str()) && text.ends_with(MD_SUFFIX) {
            text.truncate(text.len() - MD_SUFFIX.len());
            text.push_str(HTML_SUFFIX);
        }
        text.into()
    }
}

fn deprecate(level: HeadingLevel, delta: u8) -> HeadingLevel {
    let level = match level {
        HeadingLevel::H1 => 1u8,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    };
    match level.saturating_add(delta).min(6) {
        1 => HeadingLevel::H1,
        2 => HeadingLevel::H2,
        3 => HeadingLevel::H3,
        4 => HeadingLevel::H4,
        5 => HeadingLevel::H5,
        _ => HeadingLevel::H6,
    }
}

fn footnote_reference(page_url: &Url, name: &str) -> String {
    let mut out = String::new();
    out.push_str(r#"<sup class="footnote-ref" id="fnref:"#);
    let _ = escape_html(&mut out, name);
    out.push_str(r#""><a href=""#);
    let _ = escape_href(&mut out, page_url.as_str());
    out.push_str("#fn:");
    let _ = escape_href(&mut out, name);
    out.push_str(r#"">"#);
    let _ = escape_html(&mut out, name);
    out.push_str("</a></sup>");
    out
}

fn footnote_definition(name: &str) -> String {
    let mut out = String::new();
    out.push_str(r#"<div class="footnote-definition" id="fn:"#);
    let _ = escape_html(&mut out, name);
    out.push_str(r#""><sup class="footnote-definition-label">"#);
    let _ = escape_html(&mut out, name);
    out.push_str("</sup> ");
    out
}
