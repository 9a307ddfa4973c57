//! codemap - stamp provenance headers into source files.
//!
//! codemap walks a directory tree and inserts a single-line comment at the
//! top of every supported source file recording its path, package, and
//! language, so tools that read files out of context (LLM prompts, search
//! indexes) can tell where a snippet came from:
//!
//! ```text
//! // codemap: path=internal/server/http.go;pkg=server;lang=Go
//! ```
//!
//! # Architecture
//!
//! - `language`: extension to comment-syntax registry
//! - `walker`: directory traversal with exclusion rules
//! - `annotator`: idempotent first-line insert/remove
//! - `metadata`: per-file language, package, and path derivation
//! - `processor`: run options and the (optionally concurrent) batch driver
//! - `report`: terminal and JSON output
//! - `cli`: argument parsing and command dispatch
//!
//! # Adding a New Language
//!
//! Add a variant to `Language` in `src/language.rs`, give it comment
//! syntax, and register its extensions in the `REGISTRY` table.

pub mod annotator;
pub mod cli;
pub mod error;
pub mod language;
pub mod logging;
pub mod metadata;
pub mod processor;
pub mod report;
pub mod walker;

pub use annotator::{Annotator, Outcome, ANNOTATION_PATTERN};
pub use error::{Error, Result};
pub use language::Language;
pub use logging::{LogSink, NullSink, TracingSink};
pub use metadata::FileInfo;
pub use processor::{Options, Processor, RunSummary, Stats};
pub use walker::Walker;
