//! Capability traits for progress and log reporting.

/// Receives `(done, total)` progress counters.
///
/// Implementations must tolerate calls from several worker threads.
pub trait ProgressSink: Send + Sync {
    fn report(&self, done: usize, total: usize);
}

/// Receives one complete, human-readable line per call.
pub trait LogSink: Send + Sync {
    fn log(&self, line: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn report(&self, done: usize, total: usize) {
        self(done, total)
    }
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, line: &str) {
        self(line)
    }
}

/// Discards everything it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _done: usize, _total: usize) {}
}

impl LogSink for NullSink {
    fn log(&self, _line: &str) {}
}

/// Forwards log lines to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn log(&self, line: &str) {
        tracing::info!("{}", line);
    }
}
