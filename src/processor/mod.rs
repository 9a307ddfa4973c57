//! Orchestrates walking a tree and annotating the files found.
//!
//! The processor walks the configured root, keeps files whose extension is
//! in `supported_types`, derives per-file metadata, and runs add or remove
//! operations either one by one or on a bounded `rayon` pool.
//!
//! Error policy differs per operation:
//! - [`Processor::process`] surfaces the first failure. In concurrent mode
//!   every dispatched file is finished before the error is returned.
//! - [`Processor::clean`] logs and counts failures and keeps going.
//!
//! Files without a registered language are skipped silently in both.

mod options;

pub use options::{parse_types, Options, CONFIG_FILE_NAMES};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::annotator::{Annotator, Outcome};
use crate::error::Result;
use crate::language::extension_of;
use crate::logging::{default_sink, LogSink};
use crate::metadata::{display_path, FileInfo};
use crate::walker::Walker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Add,
    Remove,
}

/// Counts from an apply or clean run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Candidate files considered.
    pub total: usize,
    /// Files rewritten.
    pub changed: usize,
    /// Files already in the requested state.
    pub unchanged: usize,
    /// Files skipped because no language is registered for them.
    pub unsupported: usize,
    /// Files that failed with an I/O error.
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: Option<Outcome>) {
        self.total += 1;
        match outcome {
            Some(o) if o.changed() => self.changed += 1,
            Some(_) => self.unchanged += 1,
            None => self.unsupported += 1,
        }
    }

    fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }
}

/// Annotation coverage of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_files: usize,
    pub annotated_files: usize,
    pub unannotated_files: usize,
    /// File count per extension (`""` for extensionless files).
    pub files_by_language: BTreeMap<String, usize>,
}

/// Applies annotation operations across a directory tree.
pub struct Processor {
    opts: Options,
    walker: Walker,
    annotator: Annotator,
    sink: Arc<dyn LogSink>,
}

impl Processor {
    /// Create a processor that logs through `tracing`.
    pub fn new(opts: Options) -> Result<Self> {
        Self::with_sink(opts, default_sink())
    }

    /// Create a processor that logs through `sink`.
    pub fn with_sink(opts: Options, sink: Arc<dyn LogSink>) -> Result<Self> {
        let walker = Walker::new(&opts.directory)?
            .with_sink(Arc::clone(&sink))
            .exclude_dirs(&opts.exclude_dirs)
            .exclude_files(&opts.exclude_files)
            .recursive(opts.recursive);

        Ok(Self {
            annotator: Annotator::with_sink(Arc::clone(&sink)),
            opts,
            walker,
            sink,
        })
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// The absolute root being processed.
    pub fn root(&self) -> &Path {
        self.walker.root()
    }

    /// Walk the tree and keep the files with a supported extension.
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        let files: Vec<PathBuf> = self
            .walker
            .walk()?
            .into_iter()
            .filter(|p| self.opts.is_supported_type(extension_of(p)))
            .collect();
        self.sink.debug(&format!("{} files match the supported types", files.len()));
        Ok(files)
    }

    /// Metadata for one file, with its path recorded relative to the root.
    pub fn file_info(&self, path: &Path) -> FileInfo {
        FileInfo::derive(self.walker.root(), path)
    }

    /// Add annotations, or remove them when `clean` is set.
    ///
    /// Fails with the first per-file error. In concurrent mode all files
    /// are still processed before that error is returned.
    pub fn process(&self) -> Result<RunSummary> {
        let files = self.list_files()?;
        self.sink.info(&format!("Found {} files to process", files.len()));
        self.process_files(&files)
    }

    fn process_files(&self, files: &[PathBuf]) -> Result<RunSummary> {
        let mode = if self.opts.clean { Mode::Remove } else { Mode::Add };
        match mode {
            Mode::Add => self.sink.debug("Running in add mode - adding annotations"),
            Mode::Remove => self.sink.debug("Running in clean mode - removing annotations"),
        }

        let mut summary = RunSummary::default();

        if !self.opts.concurrent {
            self.sink.debug("Processing files sequentially");
            for file in files {
                summary.record(self.process_file(file, mode)?);
            }
            return Ok(summary);
        }

        let mut first_error = None;
        for result in self.run_concurrent(files, mode)? {
            match result {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    summary.record_failure();
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    /// Remove annotations, continuing past per-file failures.
    ///
    /// Only a failure to walk the tree is returned as an error.
    pub fn clean(&self) -> Result<RunSummary> {
        let files = self.list_files()?;
        self.sink.info(&format!("Found {} files to clean", files.len()));
        self.clean_files(&files)
    }

    fn clean_files(&self, files: &[PathBuf]) -> Result<RunSummary> {
        let results = if self.opts.concurrent {
            self.run_concurrent(files, Mode::Remove)?
        } else {
            files
                .iter()
                .map(|f| self.process_file(f, Mode::Remove))
                .collect()
        };

        let mut summary = RunSummary::default();
        for result in results {
            match result {
                Ok(outcome) => summary.record(outcome),
                Err(_) => summary.record_failure(),
            }
        }

        if summary.failed > 0 {
            self.sink.warn(&format!(
                "Could not clean {} of {} files",
                summary.failed, summary.total
            ));
        }
        Ok(summary)
    }

    /// Count annotated and unannotated files, grouped by extension.
    pub fn get_stats(&self) -> Result<Stats> {
        let files = self.list_files()?;
        let mut stats = Stats::default();

        for path in &files {
            let first = match read_first_line(path) {
                Ok(line) => line,
                Err(e) => {
                    self.sink.warn(&format!(
                        "Cannot read {}: {e}",
                        display_path(self.root(), path)
                    ));
                    continue;
                }
            };

            stats.total_files += 1;
            if Annotator::has_annotation(&first) {
                stats.annotated_files += 1;
            } else {
                stats.unannotated_files += 1;
            }
            *stats
                .files_by_language
                .entry(extension_of(path).to_string())
                .or_insert(0) += 1;
        }

        Ok(stats)
    }

    /// Run `mode` over `files` on a dedicated pool of `max_workers` threads.
    /// Results come back in file order once every task has finished.
    fn run_concurrent(
        &self,
        files: &[PathBuf],
        mode: Mode,
    ) -> Result<Vec<Result<Option<Outcome>>>> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.opts.max_workers)
            .thread_name(|i| format!("codemap-worker-{i}"))
            .build()?;

        self.sink.debug(&format!(
            "Processing files concurrently with {} workers",
            pool.current_num_threads()
        ));

        Ok(pool.install(|| {
            files
                .par_iter()
                .map(|f| self.process_file(f, mode))
                .collect()
        }))
    }

    /// `Ok(None)` means the file has no registered language and was skipped.
    fn process_file(&self, path: &Path, mode: Mode) -> Result<Option<Outcome>> {
        let rel = display_path(self.root(), path);

        let result = match mode {
            Mode::Add => {
                self.sink.debug(&format!("Adding annotation to: {rel}"));
                let info = self.file_info(path);
                self.annotator.add_annotation(&info)
            }
            Mode::Remove => {
                self.sink.debug(&format!("Cleaning annotation from: {rel}"));
                self.annotator.remove_annotation(path)
            }
        };

        match result {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) if e.is_unsupported() => {
                self.sink.debug(&format!("Skipping unsupported file: {rel}"));
                Ok(None)
            }
            Err(e) => {
                self.sink.error(&format!("Error processing {rel}: {e}"));
                Err(e.in_file(path))
            }
        }
    }
}

fn read_first_line(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;
    Ok(line)
}
