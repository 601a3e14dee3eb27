//! The post-parsing stage.

use anyhow::{Context, Result};

use crate::page::Page;
use crate::post::{Post, PostConverter};
use crate::reader::SourceFile;

/// Parses one source file into a `Page<Post>`: frontmatter fences and
/// YAML first, then the full conversion (path, URL, order key, tags,
/// body, snippet). Errors carry the source path.
pub fn parse_post(converter: &PostConverter, file: SourceFile) -> Result<Page<Post>> {
    let (frontmatter, body) =
        quill_mdx::split(&file.data).with_context(|| format!("parsing post `{}`", file.path))?;
    converter
        .convert(&file.path, frontmatter, body)
        .with_context(|| format!("converting post `{}`", file.path))
}
