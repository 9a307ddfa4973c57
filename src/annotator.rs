//! Insertion and removal of the codemap annotation line.
//!
//! An annotation is a single comment on the first line of a file:
//!
//! ```text
//! // codemap: path=cmd/server/main.go;pkg=main;lang=Go
//! ```
//!
//! Only the first line is ever inspected or removed. An annotation-shaped
//! string further down a file is ordinary content.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::language::Language;
use crate::logging::{default_sink, LogSink};
use crate::metadata::FileInfo;

/// Marker that identifies an annotation regardless of comment syntax.
pub const ANNOTATION_PATTERN: &str = "codemap: path=";

/// What an add or remove call did to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An annotation line was prepended.
    Added,
    /// The first line already was an annotation; nothing written.
    AlreadyAnnotated,
    /// The annotation line was dropped.
    Removed,
    /// The first line was not an annotation; nothing written.
    NotAnnotated,
}

impl Outcome {
    /// True if the file on disk was rewritten.
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Added | Outcome::Removed)
    }
}

/// Reads, checks, and rewrites files to add or drop their annotation.
pub struct Annotator {
    sink: Arc<dyn LogSink>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator {
    pub fn new() -> Self {
        Self {
            sink: default_sink(),
        }
    }

    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Prepend an annotation built from `info` unless the file already
    /// starts with one for its language.
    pub fn add_annotation(&self, info: &FileInfo) -> Result<Outcome> {
        let lang =
            Language::for_path(&info.path).ok_or_else(|| Error::unsupported_type(&info.path))?;

        let content = fs::read(&info.path).map_err(|e| Error::read(&info.path, e))?;

        if has_annotation_for(&content, lang) {
            self.sink.debug(&format!(
                "Skipping file (already annotated): {}",
                info.display_path
            ));
            return Ok(Outcome::AlreadyAnnotated);
        }

        let header = annotation_line(lang, info);
        let mut updated = Vec::with_capacity(header.len() + content.len());
        updated.extend_from_slice(header.as_bytes());
        updated.extend_from_slice(&content);

        write_atomic(&info.path, &updated).map_err(|e| Error::write(&info.path, e))?;

        self.sink.info(&format!("Added annotation to: {}", info.display_path));
        Ok(Outcome::Added)
    }

    /// Drop the first line if it is this language's annotation.
    pub fn remove_annotation(&self, path: &Path) -> Result<Outcome> {
        let lang = Language::for_path(path).ok_or_else(|| Error::unsupported_type(path))?;

        let content = fs::read(path).map_err(|e| Error::read(path, e))?;

        if !has_annotation_for(&content, lang) {
            self.sink.debug(&format!("Skipping file (no annotation): {}", path.display()));
            return Ok(Outcome::NotAnnotated);
        }

        let rest = match content.iter().position(|&b| b == b'\n') {
            Some(idx) => &content[idx + 1..],
            None => &[][..],
        };

        write_atomic(path, rest).map_err(|e| Error::write(path, e))?;

        self.sink.info(&format!("Removed annotation from: {}", path.display()));
        Ok(Outcome::Removed)
    }

    /// True if the first line carries the generic annotation marker.
    ///
    /// Language-independent; used for statistics.
    pub fn has_annotation(content: impl AsRef<[u8]>) -> bool {
        String::from_utf8_lossy(first_line(content.as_ref())).contains(ANNOTATION_PATTERN)
    }
}

/// Build the annotation line for `info`, newline included.
pub fn annotation_line(lang: Language, info: &FileInfo) -> String {
    format!(
        "{} codemap: path={};pkg={};lang={}\n",
        lang.line_comment(),
        info.display_path,
        info.package_name,
        info.language
    )
}

/// The marker a first line must start with to count as annotated in `lang`.
pub fn language_marker(lang: Language) -> String {
    format!("{} {}", lang.line_comment(), ANNOTATION_PATTERN)
}

fn has_annotation_for(content: &[u8], lang: Language) -> bool {
    let first = String::from_utf8_lossy(first_line(content));
    !lang.is_special_comment(&first) && first.starts_with(&language_marker(lang))
}

/// Bytes of the first line, without the line terminator.
fn first_line(content: &[u8]) -> &[u8] {
    let line = match content.iter().position(|&b| b == b'\n') {
        Some(idx) => &content[..idx],
        None => content,
    };
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Replace the file's contents via a sibling temp file and a rename, so a
/// failed write never leaves a truncated target. Symlinks are resolved so
/// the link itself survives.
///
/// Hard-linked files, and files whose directory refuses new entries, are
/// rewritten in place instead.
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let target = fs::canonicalize(path)?;
    let metadata = fs::metadata(&target)?;
    if link_count(&metadata) > 1 {
        return write_in_place(&target, contents);
    }
    let dir = target.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = match NamedTempFile::new_in(dir) {
        Ok(tmp) => tmp,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return write_in_place(&target, contents);
        }
        Err(e) => return Err(e),
    };
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), metadata.permissions())?;
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

fn write_in_place(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(unix)]
fn link_count(metadata: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink()
}

#[cfg(not(unix))]
fn link_count(_metadata: &fs::Metadata) -> u64 {
    1
}
