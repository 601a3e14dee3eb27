//! Pipeline assembly.

use std::fs;

use anyhow::{Context, Result};

use quill_actor::{run_all, Actor, CancelHandle, CancelToken, FanOut, Input, Map, Output};

use crate::config::Config;
use crate::copier::FileCopier;
use crate::feed::{self, FeedBuilder};
use crate::finder::FileFinder;
use crate::indexer::{indexer, SharedIndexPage};
use crate::orderer::{orderer, SharedPost};
use crate::page::SiteData;
use crate::parser::parse_post;
use crate::post::PostConverter;
use crate::reader::{FileReader, SourceFile};
use crate::templater::render_page;
use crate::theme::Theme;

/// Posts per index page.
const PAGE_SIZE: usize = 10;

/// The site header occupies `h1` and post titles `h2`, so post-body
/// headings start at `h3`.
const DEPRECATE_HEADINGS: u8 = 2;

const READ_WORKERS: usize = 4;
const COPY_WORKERS: usize = 4;
const PARSE_WORKERS: usize = 8;
const TEMPLATE_WORKERS: usize = 8;
const FEED_WORKERS: usize = 8;

/// A fully loaded site build: configuration, theme, and the shared
/// site-data record. `run` wires the actor graph and drives it to
/// completion.
pub struct Pipeline {
    config: Config,
    theme: Theme,
    site: SiteData,
}

impl Pipeline {
    pub fn load(config: Config) -> Result<Pipeline> {
        let theme = Theme::load(&config.site_dir.join("theme")).context("loading pipeline")?;
        let base = &config.base_url;
        let site = SiteData {
            base_url: base.clone(),
            home_page: base.join("index.html").context("loading pipeline")?,
            theme_assets: base.join("static/theme/").context("loading pipeline")?,
            feed_url: base.join("index.json").context("loading pipeline")?,
            feed_type: feed::MIME_TYPE.to_owned(),
        };
        Ok(Pipeline {
            config,
            theme,
            site,
        })
    }

    pub fn run(&self) -> Result<()> {
        self.run_under(&CancelHandle::new())
    }

    /// Runs the graph under an externally owned cancellation handle.
    pub fn run_under(&self, handle: &CancelHandle) -> Result<()> {
        let posts_dir = self.config.site_dir.join("posts");
        let theme_assets_dir = self.config.site_dir.join("theme/static");
        let out = &self.config.output_dir;
        fs::create_dir_all(out)
            .with_context(|| format!("creating output directory `{}`", out.display()))?;

        // Theme branch: find every asset, copy it verbatim.
        let asset_finder = FileFinder::new(&theme_assets_dir, "");
        let (theme_finder, asset_paths) = Output::new(
            "FileFinder::ThemeAssets",
            1,
            move |cancel: &CancelToken| asset_finder.next(cancel),
        );
        let copier = FileCopier::new(&theme_assets_dir, out.join("static/theme"));
        let theme_copier = Input::new(
            "FileCopier::ThemeAssets",
            COPY_WORKERS,
            asset_paths,
            move |cancel: &CancelToken, path: String| copier.copy(cancel, &path),
        );

        // Post branch: find, read, parse, order.
        let source_finder_state = FileFinder::new(&posts_dir, ".md");
        let (source_finder, source_paths) = Output::new(
            "FileFinder::PostSources",
            1,
            move |cancel: &CancelToken| source_finder_state.next(cancel),
        );
        let file_reader = FileReader::new(&posts_dir);
        let (source_reader, sources) = Map::new(
            "FileReader",
            READ_WORKERS,
            source_paths,
            move |cancel: &CancelToken, path: String| file_reader.read(cancel, path),
        );
        let converter = PostConverter::new(self.config.base_url.clone(), DEPRECATE_HEADINGS);
        let (post_parser, posts) = Map::new(
            "PostParser",
            PARSE_WORKERS,
            sources,
            move |_: &CancelToken, file: SourceFile| parse_post(&converter, file),
        );
        let (post_orderer, post_slices, ordered_posts) = orderer(posts);

        // Templating and indexing fan off the orderer.
        let post_templater = Input::new(
            "Templater::Post",
            TEMPLATE_WORKERS,
            ordered_posts,
            move |_: &CancelToken, page: SharedPost| {
                render_page(
                    out,
                    self.theme.environment(),
                    self.theme.post_template(),
                    &self.site,
                    &page,
                )
            },
        );
        let (index_builder, index_pages) =
            indexer(post_slices, self.config.base_url.clone(), PAGE_SIZE);
        let (index_fanout, [template_pages, feed_pages]) =
            FanOut::new::<2>("IndexPages", index_pages);
        let index_templater = Input::new(
            "Templater::Index",
            TEMPLATE_WORKERS,
            template_pages,
            move |_: &CancelToken, page: SharedIndexPage| {
                render_page(
                    out,
                    self.theme.environment(),
                    self.theme.index_template(),
                    &self.site,
                    &page,
                )
            },
        );
        let feeds = FeedBuilder::new(self.config.feed.clone(), out.clone());
        let feed_builder = Input::new(
            "FeedBuilder",
            FEED_WORKERS,
            feed_pages,
            move |_: &CancelToken, page: SharedIndexPage| feeds.build(&page),
        );

        let actors: Vec<Box<dyn Actor + Send + '_>> = vec![
            Box::new(theme_finder),
            Box::new(theme_copier),
            Box::new(source_finder),
            Box::new(source_reader),
            Box::new(post_parser),
            Box::new(post_orderer),
            Box::new(post_templater),
            Box::new(index_builder),
            Box::new(index_fanout),
            Box::new(index_templater),
            Box::new(feed_builder),
        ];
        run_all(actors, handle)
    }
}
