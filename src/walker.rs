//! Directory traversal with exclusion rules.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::logging::{default_sink, LogSink};

/// Enumerates candidate files under a root directory.
///
/// Hidden entries (basename starting with `.`) are always skipped, except the
/// root itself. Directories whose basename matches an excluded name
/// (case-insensitive) are pruned with their whole subtree. Files whose
/// basename matches an exclusion glob are dropped.
pub struct Walker {
    root: PathBuf,
    exclude_dirs: Vec<String>,
    exclude_files: GlobSet,
    recursive: bool,
    sink: Arc<dyn LogSink>,
}

impl Walker {
    /// Create a walker rooted at `root`.
    ///
    /// An empty root or `.` means the current working directory. Relative
    /// roots are resolved against it. Fails if the root is not a readable
    /// directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let root = if root.as_os_str().is_empty() || root == Path::new(".") {
            std::env::current_dir()
                .map_err(|e| Error::invalid_root(root, format!("no working directory: {e}")))?
        } else {
            std::path::absolute(root).map_err(|e| Error::invalid_root(root, e.to_string()))?
        };

        let metadata =
            std::fs::metadata(&root).map_err(|e| Error::invalid_root(&root, e.to_string()))?;
        if !metadata.is_dir() {
            return Err(Error::invalid_root(&root, "not a directory"));
        }

        Ok(Self {
            root,
            exclude_dirs: Vec::new(),
            exclude_files: GlobSet::empty(),
            recursive: true,
            sink: default_sink(),
        })
    }

    /// Directory basenames to prune (matched case-insensitively).
    pub fn exclude_dirs<S: AsRef<str>>(mut self, dirs: &[S]) -> Self {
        self.exclude_dirs = dirs.iter().map(|d| d.as_ref().to_lowercase()).collect();
        self
    }

    /// Glob patterns matched against file basenames.
    ///
    /// Patterns that fail to compile are dropped with a warning.
    pub fn exclude_files<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => self
                    .sink
                    .warn(&format!("Ignoring invalid exclude pattern {pattern:?}: {e}")),
            }
        }
        self.exclude_files = match builder.build() {
            Ok(set) => set,
            Err(e) => {
                self.sink.warn(&format!("Ignoring exclude patterns: {e}"));
                GlobSet::empty()
            }
        };
        self
    }

    /// Whether to descend below the root (default: true).
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The absolute root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and return the absolute paths of all non-excluded files.
    ///
    /// Errors on individual entries are logged and skipped. Only a failure
    /// at the root itself aborts the walk.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        self.sink.debug(&format!(
            "Starting walk from root directory: {}",
            self.root.display()
        ));

        let mut walk = WalkDir::new(&self.root).sort_by_file_name();
        if !self.recursive {
            walk = walk.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walk.into_iter().filter_entry(|e| !self.should_skip_dir(e)) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(Error::Walk {
                        root: self.root.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    self.sink.warn(&format!("Error accessing path {path}: {e}"));
                    continue;
                }
            };

            if !self.is_regular_file(&entry) {
                continue;
            }
            if self.should_skip_file(entry.file_name().to_str()) {
                continue;
            }
            files.push(entry.into_path());
        }

        if files.is_empty() {
            self.sink.info(&format!(
                "No suitable files found in {} or its subdirectories",
                self.root.display()
            ));
        } else {
            self.sink.debug(&format!("Found {} suitable files", files.len()));
        }

        Ok(files)
    }

    /// Plain files, plus symlinks whose target is a file. Linked
    /// directories are never descended into.
    fn is_regular_file(&self, entry: &DirEntry) -> bool {
        let file_type = entry.file_type();
        if file_type.is_file() {
            return true;
        }
        if !file_type.is_symlink() {
            return false;
        }
        match entry.path().metadata() {
            Ok(meta) => meta.is_file(),
            Err(e) => {
                self.sink.warn(&format!(
                    "Error accessing path {}: {e}",
                    entry.path().display()
                ));
                false
            }
        }
    }

    fn should_skip_dir(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            return true;
        }

        let lower = name.to_lowercase();
        if self.exclude_dirs.iter().any(|d| *d == lower) {
            self.sink.debug(&format!(
                "Skipping excluded directory: {}",
                entry.path().display()
            ));
            return true;
        }

        false
    }

    fn should_skip_file(&self, name: Option<&str>) -> bool {
        // Non UTF-8 names cannot be recorded in an annotation.
        let Some(name) = name else {
            return true;
        };
        name.starts_with('.') || self.exclude_files.is_match(name)
    }
}
