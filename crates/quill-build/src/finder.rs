//! Breadth-first file discovery.

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};

use quill_actor::CancelToken;

/// Walks a directory tree breadth-first and yields one matching file path
/// per call, in traversal order. Paths are `/`-separated and relative to
/// the root. Directory entries are read lazily (one directory per refill)
/// and sorted by name so repeated runs emit identical sequences;
/// cancellation is observed before each directory read.
///
/// The traversal state is behind a mutex because the producer callback of
/// an output actor is shared between its workers; a finder runs with one
/// worker, so the lock is uncontended.
pub struct FileFinder {
    root: PathBuf,
    suffix: String,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    dirs: VecDeque<String>,
    entries: VecDeque<Entry>,
}

struct Entry {
    path: String,
    is_dir: bool,
}

impl FileFinder {
    /// `suffix` filters file names; empty matches everything.
    pub fn new(root: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        let mut state = State::default();
        state.dirs.push_back(String::new());
        FileFinder {
            root: root.into(),
            suffix: suffix.into(),
            state: Mutex::new(state),
        }
    }

    /// Producer callback: the next matching file, or `None` once the tree
    /// is exhausted.
    pub fn next(&self, cancel: &CancelToken) -> Result<Option<String>> {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        loop {
            while let Some(entry) = state.entries.pop_front() {
                if entry.is_dir {
                    state.dirs.push_back(entry.path);
                } else if entry.path.ends_with(&self.suffix) {
                    return Ok(Some(entry.path));
                }
            }

            let Some(dir) = state.dirs.pop_front() else {
                return Ok(None);
            };
            cancel.check()?;
            state.entries = self.read_dir(&dir)?;
        }
    }

    fn read_dir(&self, dir: &str) -> Result<VecDeque<Entry>> {
        let abs = if dir.is_empty() {
            self.root.clone()
        } else {
            self.root.join(dir)
        };
        let mut entries = Vec::new();
        for result in
            fs::read_dir(&abs).with_context(|| format!("reading directory `{}`", abs.display()))?
        {
            let entry =
                result.with_context(|| format!("reading directory `{}`", abs.display()))?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    tracing::warn!(name = ?name, dir = %abs.display(), "skipping non-utf8 file name");
                    continue;
                }
            };
            let is_dir = entry
                .file_type()
                .with_context(|| format!("inspecting `{}`", entry.path().display()))?
                .is_dir();
            let path = if dir.is_empty() {
                name
            } else {
                format!("{dir}/{name}")
            };
            entries.push(Entry { path, is_dir });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries.into())
    }
}
