//! Theme loading.
//!
//! A theme directory carries a `theme.jsonc` manifest naming the template
//! files of the post and index template sets (the first name of each list
//! is the root rendered for that page kind) and a `static/` tree copied
//! verbatim into the output.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use minijinja::Environment;
use serde::Deserialize;

pub const MANIFEST: &str = "theme.jsonc";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    index_template: Vec<String>,
    post_template: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("loading theme: reading `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("loading theme: parsing manifest: {0}")]
    Manifest(#[from] json5::Error),

    #[error("loading theme: `{0}` names no templates")]
    EmptyTemplateList(&'static str),

    #[error("loading theme: {0}")]
    Template(#[from] minijinja::Error),
}

/// A loaded theme: one template environment holding both template sets.
#[derive(Debug)]
pub struct Theme {
    env: Environment<'static>,
    index_root: String,
    post_root: String,
}

impl Theme {
    /// Loads the manifest and every listed template file from `dir`.
    /// The manifest is JSONC; comments and trailing commas are allowed.
    pub fn load(dir: &Path) -> Result<Theme, ThemeError> {
        let manifest_path = dir.join(MANIFEST);
        let text = fs::read_to_string(&manifest_path).map_err(|source| ThemeError::Io {
            path: manifest_path,
            source,
        })?;
        let manifest: Manifest = json5::from_str(&text)?;

        let index_root = manifest
            .index_template
            .first()
            .cloned()
            .ok_or(ThemeError::EmptyTemplateList("indexTemplate"))?;
        let post_root = manifest
            .post_template
            .first()
            .cloned()
            .ok_or(ThemeError::EmptyTemplateList("postTemplate"))?;

        let mut env = Environment::new();
        let mut seen = HashSet::new();
        for name in manifest
            .index_template
            .iter()
            .chain(manifest.post_template.iter())
        {
            if !seen.insert(name.clone()) {
                continue;
            }
            let path = dir.join(name);
            let source =
                fs::read_to_string(&path).map_err(|source| ThemeError::Io { path, source })?;
            env.add_template_owned(name.clone(), source)?;
        }

        Ok(Theme {
            env,
            index_root,
            post_root,
        })
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Root template name for index pages.
    pub fn index_template(&self) -> &str {
        &self.index_root
    }

    /// Root template name for post pages.
    pub fn post_template(&self) -> &str {
        &self.post_root
    }
}
