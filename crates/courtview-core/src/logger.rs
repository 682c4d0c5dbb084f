//! Logging setup for operator sessions and demos.
//!
//! [`init_with_level`] installs a stderr `log` backend. Records from the
//! per-frame modules (track overlay and projection) are held one level below
//! the session level, so a replay at `info` shows calibration and I/O events
//! without per-frame noise. Lines look like `   1.234 INFO  store: message`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Environment variable read by [`init_from_env`].
pub const LEVEL_ENV: &str = "COURTVIEW_LOG";

const CRATE_PREFIX: &str = "courtview::";
const PER_FRAME_TARGETS: [&str; 2] = ["courtview::overlay", "courtview::projection"];

struct StderrSink {
    session: LevelFilter,
    per_frame: LevelFilter,
    origin: Instant,
}

impl StderrSink {
    fn new(session: LevelFilter) -> Self {
        Self {
            session,
            per_frame: one_quieter(session),
            origin: Instant::now(),
        }
    }

    fn threshold(&self, target: &str) -> LevelFilter {
        if PER_FRAME_TARGETS.iter().any(|t| target.starts_with(t)) {
            self.per_frame
        } else {
            self.session
        }
    }
}

fn one_quieter(level: LevelFilter) -> LevelFilter {
    match level {
        LevelFilter::Trace => LevelFilter::Debug,
        LevelFilter::Debug => LevelFilter::Info,
        LevelFilter::Info => LevelFilter::Warn,
        other => other,
    }
}

impl Log for StderrSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.threshold(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let target = record.target();
        let short = target.strip_prefix(CRATE_PREFIX).unwrap_or(target);
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "{:>8.3} {:<5} {short}: {}",
            self.origin.elapsed().as_secs_f32(),
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static SINK: OnceLock<StderrSink> = OnceLock::new();

/// Install the stderr logger. Later calls keep the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut installed_now = false;
    let sink = SINK.get_or_init(|| {
        installed_now = true;
        StderrSink::new(level)
    });
    if installed_now {
        log::set_logger(sink)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install the stderr logger at the level named by `COURTVIEW_LOG`
/// (`error` .. `trace`, `off`), falling back to `default`.
pub fn init_from_env(default: LevelFilter) -> Result<LevelFilter, log::SetLoggerError> {
    let level = std::env::var(LEVEL_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default);
    init_with_level(level).map(|()| level)
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
/// Closing spans report their timings.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer().with_span_events(FmtSpan::CLOSE);
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(layer.json().flatten_event(true)).try_init()
    } else {
        registry
            .with(layer.with_timer(fmt::time::Uptime::default()))
            .try_init()
    };
}
