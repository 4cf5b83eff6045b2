//! Progress reporting hooks for long-running pipelines.

/// Receives progress updates from a pipeline.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each unit of work. `total` is `None` when unknown.
    fn step(&self, detail: &str, current: usize, total: Option<usize>);
    /// Called when the pipeline completes.
    fn done(&self, summary: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn step(&self, _detail: &str, _current: usize, _total: Option<usize>) {}
    fn done(&self, _summary: &str) {}
}
