//! Verbatim file copies.

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

use quill_actor::CancelToken;

use crate::reader::CancelRead;

/// Streams files from a source root to the same relative path under a
/// destination root, creating directories as needed. Cancellation is
/// observed between chunks.
pub struct FileCopier {
    src_root: PathBuf,
    dst_root: PathBuf,
}

impl FileCopier {
    pub fn new(src_root: impl Into<PathBuf>, dst_root: impl Into<PathBuf>) -> Self {
        FileCopier {
            src_root: src_root.into(),
            dst_root: dst_root.into(),
        }
    }

    pub fn copy(&self, cancel: &CancelToken, path: &str) -> Result<()> {
        let dst = self.dst_root.join(path);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("copying `{path}`: creating destination directory"))?;
        }
        let src = File::open(self.src_root.join(path))
            .with_context(|| format!("copying `{path}`: opening source file"))?;
        let mut dst = File::create(&dst)
            .with_context(|| format!("copying `{path}`: creating destination file"))?;
        io::copy(&mut CancelRead::new(cancel, src), &mut dst)
            .with_context(|| format!("copying `{path}`"))?;
        Ok(())
    }
}
