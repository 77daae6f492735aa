//! Diagnostic logging setup
//!
//! Two sinks: a terse stderr layer (WARN unless `-v` is given) and a
//! `debug.log` file in the log directory. The game record itself is never
//! written through tracing; see [`crate::game::log::GameLog`].

use std::path::PathBuf;

use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::fmt::{self, fmt};
use tracing_subscriber::{EnvFilter, Layer};

/// Debug log filename inside the log directory
pub const DEBUG_LOG_FILE: &str = "debug.log";

/// Options for [`init_tracing`]
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Directory that receives `debug.log`
    pub log_dir: PathBuf,

    /// Number of `-v` flags
    pub verbosity: u8,

    /// Emit ANSI colours on stderr
    pub ansi: bool,
}

/// Map `-v` count to the stderr level
pub fn stderr_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Stderr-only subscriber for work done before [`init_tracing`]
///
/// The log directory comes from the configuration, so loading it runs under
/// this subscriber via `tracing::subscriber::with_default`.
pub fn startup_subscriber(verbosity: u8, ansi: bool) -> impl Subscriber + Send + Sync {
    fmt()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .without_time()
        .with_max_level(stderr_level(verbosity))
        .finish()
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process. `RUST_LOG` overrides the file layer's filter.
pub fn init_tracing(options: &LoggingOptions) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(&options.log_dir)?;

    let file_appender = tracing_appender::rolling::never(&options.log_dir, DEBUG_LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(file_filter);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(options.ansi)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::from_level(stderr_level(options.verbosity)));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_raises_stderr_level() {
        //! Each -v flag lowers the stderr threshold by one level
        assert_eq!(stderr_level(0), Level::WARN);
        assert_eq!(stderr_level(1), Level::INFO);
        assert_eq!(stderr_level(2), Level::DEBUG);
        assert_eq!(stderr_level(9), Level::TRACE);
    }

    #[test]
    fn test_startup_subscriber_sees_config_warnings() {
        //! Warnings always pass; info needs one -v
        tracing::subscriber::with_default(startup_subscriber(0, false), || {
            assert!(tracing::enabled!(Level::WARN));
            assert!(!tracing::enabled!(Level::INFO));
        });
        tracing::subscriber::with_default(startup_subscriber(1, false), || {
            assert!(tracing::enabled!(Level::INFO));
        });
    }
}
