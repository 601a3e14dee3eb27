//! Whole-file reads.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};

use quill_actor::{CancelToken, Cancelled};

/// A source file pulled into memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// `/`-separated path relative to the source root.
    pub path: String,
    pub data: Vec<u8>,
}

/// Reads files under a root directory, observing cancellation between
/// read operations.
pub struct FileReader {
    root: PathBuf,
}

impl FileReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileReader { root: root.into() }
    }

    pub fn read(&self, cancel: &CancelToken, path: String) -> Result<SourceFile> {
        let file = File::open(self.root.join(&path))
            .with_context(|| format!("opening file `{path}`"))?;
        let mut data = Vec::new();
        CancelRead::new(cancel, file)
            .read_to_end(&mut data)
            .with_context(|| format!("reading file `{path}`"))?;
        Ok(SourceFile { path, data })
    }
}

/// A reader that fails with [`Cancelled`] once the run is cancelled,
/// checked before every underlying read.
pub struct CancelRead<'a, R> {
    cancel: &'a CancelToken,
    inner: R,
}

impl<'a, R: Read> CancelRead<'a, R> {
    pub fn new(cancel: &'a CancelToken, inner: R) -> Self {
        CancelRead { cancel, inner }
    }
}

impl<R: Read> Read for CancelRead<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.cancel.is_cancelled() {
            return Err(io::Error::other(Cancelled));
        }
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_actor::CancelHandle;

    #[test]
    fn reads_whole_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/post.md"), b"hello").unwrap();
        let reader = FileReader::new(dir.path());
        let token = CancelHandle::new().token();
        let file = reader.read(&token, "sub/post.md".to_owned()).unwrap();
        assert_eq!(file.path, "sub/post.md");
        assert_eq!(file.data, b"hello");
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FileReader::new(dir.path());
        let token = CancelHandle::new().token();
        let err = reader.read(&token, "gone.md".to_owned()).unwrap_err();
        assert!(format!("{err:#}").contains("gone.md"));
    }

    #[test]
    fn cancelled_read_propagates_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("post.md"), b"hello").unwrap();
        let handle = CancelHandle::new();
        handle.cancel();
        let reader = FileReader::new(dir.path());
        let err = reader.read(&handle.token(), "post.md".to_owned()).unwrap_err();
        assert!(quill_actor::was_cancelled(&err));
    }
}
