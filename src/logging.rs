//! Logging setup and the log sink handed to the core components.
//!
//! The walker, annotator and processor never call into a global logger
//! directly. They hold a [`LogSink`]; the CLI wires in [`TracingSink`],
//! tests and embedders can use [`NullSink`].

use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// Raise `Normal` to `Verbose` when the config file asks for it.
    pub fn with_config_verbose(self, verbose: bool) -> Self {
        if verbose && self == Self::Normal {
            Self::Verbose
        } else {
            self
        }
    }

    fn to_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn to_filter(self) -> String {
        let level = self.to_level();
        format!("codemap={level}")
    }
}

/// Install the global tracing subscriber. Safe to call more than once;
/// later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.to_filter()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(verbosity >= Verbosity::Verbose)
        .with_line_number(verbosity >= Verbosity::Verbose)
        .compact();

    let _ = match verbosity {
        Verbosity::Quiet | Verbosity::Normal => subscriber.without_time().try_init(),
        _ => subscriber.try_init(),
    };
}

/// Destination for diagnostic messages emitted by the core.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }
}

/// Forwards messages to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{message}"),
            Level::WARN => tracing::warn!("{message}"),
            Level::INFO => tracing::info!("{message}"),
            Level::DEBUG => tracing::debug!("{message}"),
            _ => tracing::trace!("{message}"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: Level, _message: &str) {}
}

/// The sink used when a component is built without one.
pub fn default_sink() -> Arc<dyn LogSink> {
    Arc::new(TracingSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Level, String)>>);

    impl LogSink for Recorder {
        fn log(&self, level: Level, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(0, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(2, false), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(7, false), Verbosity::Trace);
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        assert_eq!(Verbosity::from_flags(3, true), Verbosity::Quiet);
    }

    #[test]
    fn test_config_verbose_only_raises_normal() {
        assert_eq!(
            Verbosity::Normal.with_config_verbose(true),
            Verbosity::Verbose
        );
        assert_eq!(Verbosity::Quiet.with_config_verbose(true), Verbosity::Quiet);
        assert_eq!(Verbosity::Trace.with_config_verbose(true), Verbosity::Trace);
        assert_eq!(
            Verbosity::Normal.with_config_verbose(false),
            Verbosity::Normal
        );
    }

    #[test]
    fn test_filter_string() {
        assert_eq!(Verbosity::Normal.to_filter(), "codemap=INFO");
        assert_eq!(Verbosity::Verbose.to_filter(), "codemap=DEBUG");
    }

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_quiet_still_emits_errors() {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(EnvFilter::new(Verbosity::Quiet.to_filter()))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingSink.info("walked tree");
            TracingSink.error("cannot write a.go");
        });

        let out = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("cannot write a.go"));
        assert!(!out.contains("walked tree"));
    }

    #[test]
    fn test_sink_helpers_route_levels() {
        let sink = Recorder::default();
        sink.warn("careful");
        sink.debug("detail");

        let seen = sink.0.lock().unwrap();
        assert_eq!(seen[0], (Level::WARN, "careful".to_string()));
        assert_eq!(seen[1], (Level::DEBUG, "detail".to_string()));
    }
}
