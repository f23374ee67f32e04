//! Logging setup for binaries and tests.
//!
//! Library code only uses the `log` macros. [`init_with_level`] installs a
//! small stderr sink printing `[elapsed LEVEL crate] message`; with the
//! `tracing` feature, [`init_tracing`] installs a `tracing-subscriber`
//! formatter instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn line(&self, record: &Record) -> String {
        // crate name only
        let target = record.target().split("::").next().unwrap_or_default();
        format!(
            "[{:8.3}s {:>5} {target}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.args()
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr().lock(), "{}", self.line(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger at `level`.
///
/// Only the first call installs anything; later calls return `Ok(())` and
/// keep the original level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut fresh = false;
    let logger = LOGGER.get_or_init(|| {
        fresh = true;
        StderrLogger {
            level,
            started: Instant::now(),
        }
    });
    if fresh {
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Map a `-v` count onto a level: 0 = info, 1 = debug, 2+ = trace.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// `EnvFilter` directive for a level when `RUST_LOG` is unset.
#[cfg(feature = "tracing")]
fn default_directive(level: LevelFilter) -> String {
    level.as_str().to_ascii_lowercase()
}

/// Install a `tracing-subscriber` formatter filtered by `RUST_LOG`, falling
/// back to `default_level`. Span close events carry stage timings. A no-op if
/// a global subscriber is already set.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default_level: LevelFilter) {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(default_level)))
    };
    let builder = fmt().with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder
            .with_env_filter(filter())
            .json()
            .flatten_event(true)
            .finish()
            .try_init()
    } else {
        builder
            .with_env_filter(filter())
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Info);
        assert_eq!(level_from_verbosity(1), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(7), LevelFilter::Trace);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn verbosity_becomes_the_default_filter() {
        assert_eq!(default_directive(level_from_verbosity(0)), "info");
        assert_eq!(default_directive(level_from_verbosity(1)), "debug");
        assert_eq!(default_directive(level_from_verbosity(2)), "trace");
        assert_eq!(default_directive(LevelFilter::Off), "off");
        // parses without falling back to an empty filter
        let filter = EnvFilter::try_new(default_directive(level_from_verbosity(1)));
        assert!(filter.is_ok());
    }

    #[test]
    fn lines_carry_level_and_crate() {
        let logger = StderrLogger {
            level: LevelFilter::Info,
            started: Instant::now(),
        };
        let line = logger.line(
            &Record::builder()
                .args(format_args!("sampled 4 frames"))
                .level(log::Level::Warn)
                .target("cardset_extract::sampler")
                .build(),
        );
        assert!(line.ends_with(" WARN cardset_extract] sampled 4 frames"), "{line}");
        assert!(line.starts_with('['));
    }

    #[test]
    fn repeated_init_is_a_no_op() {
        init_with_level(LevelFilter::Warn).unwrap();
        init_with_level(LevelFilter::Debug).unwrap();
        log::warn!("logger installed");
    }
}
