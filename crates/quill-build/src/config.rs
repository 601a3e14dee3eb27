//! Site configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use url::Url;

use crate::feed::FeedHeader;

/// Optional configuration file at the site root. JSONC.
pub const CONFIG_FILE: &str = "quill.jsonc";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigFile {
    /// Absolute URL of the site root.
    site_root_url: Option<String>,
    feed_title: Option<String>,
    feed_description: Option<String>,
    feed_author: Option<String>,
}

/// Resolved configuration for one build.
#[derive(Debug, Clone)]
pub struct Config {
    pub site_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Absolute root URL of the generated site, always with a trailing
    /// slash so relative joins append to it.
    pub base_url: Url,

    pub feed: FeedHeader,
}

impl Config {
    /// Loads `quill.jsonc` from `site_dir` (if present) and applies the
    /// command-line overrides. Without a configured site root the base
    /// URL is `file://<absolute-output-directory>/`.
    pub fn load(
        site_dir: &Path,
        site_root: Option<&str>,
        output_dir: Option<&Path>,
    ) -> Result<Config> {
        let site_dir = std::path::absolute(site_dir)
            .with_context(|| format!("resolving site directory `{}`", site_dir.display()))?;
        let output_dir = match output_dir {
            Some(dir) => std::path::absolute(dir)
                .with_context(|| format!("resolving output directory `{}`", dir.display()))?,
            None => site_dir.join("_output"),
        };

        let file = read_config_file(&site_dir.join(CONFIG_FILE))?;

        let base_url = match site_root.map(str::to_owned).or(file.site_root_url) {
            Some(root) => {
                let mut url = Url::parse(&root)
                    .with_context(|| format!("parsing site root url `{root}`"))?;
                if !url.path().ends_with('/') {
                    url.set_path(&format!("{}/", url.path()));
                }
                url
            }
            None => Url::from_directory_path(&output_dir).map_err(|()| {
                anyhow!(
                    "output directory `{}` cannot be a file url",
                    output_dir.display()
                )
            })?,
        };

        Ok(Config {
            site_dir,
            output_dir,
            base_url,
            feed: FeedHeader {
                title: file.feed_title.unwrap_or_default(),
                description: file.feed_description.unwrap_or_default(),
                author: file.feed_author.unwrap_or_default(),
            },
        })
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    match fs::read_to_string(path) {
        Ok(text) => json5::from_str(&text)
            .with_context(|| format!("parsing `{}`", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(err) => {
            Err(err).with_context(|| format!("reading `{}`", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_a_file_url_under_the_site_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path(), None, None).unwrap();
        assert_eq!(config.output_dir, dir.path().join("_output"));
        assert_eq!(config.base_url.scheme(), "file");
        assert!(config.base_url.as_str().ends_with("_output/"));
        assert!(config.feed.title.is_empty());
    }

    #[test]
    fn reads_the_config_file_and_normalizes_the_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{
  // deployment target
  "siteRootURL": "https://example.org/blog",
  "feedTitle": "Example",
  "feedAuthor": "A",
}"#,
        )
        .unwrap();
        let config = Config::load(dir.path(), None, None).unwrap();
        assert_eq!(config.base_url.as_str(), "https://example.org/blog/");
        assert_eq!(config.feed.title, "Example");
        assert_eq!(config.feed.author, "A");
    }

    #[test]
    fn command_line_root_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"siteRootURL": "https://config.example/"}"#,
        )
        .unwrap();
        let config = Config::load(dir.path(), Some("https://flag.example/"), None).unwrap();
        assert_eq!(config.base_url.as_str(), "https://flag.example/");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{nope").unwrap();
        assert!(Config::load(dir.path(), None, None).is_err());
    }
}
