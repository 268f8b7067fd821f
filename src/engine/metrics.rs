//! Highlighting run metrics.
//!
//! A run is short, but when a card does not get highlighted the question is
//! always "which step gave up?". These structs record what each stage did and
//! how long it took.
//!
//! - `Highlighter::run` for normal operation.
//! - `Highlighter::run_with_metrics` for the CLI report and debugging.
//!
//! Nothing here affects the outcome of a run.

use super::patterns::PatternSource;
use super::scope::ResolvedScope;
use crate::Outcome;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for [`Highlighter::run_with_metrics`](crate::engine::Highlighter::run_with_metrics).
    pub total: Duration,
    /// Time spent choosing the sentence scope.
    pub scope: Duration,
    /// Time spent converting pre-tags and checking for existing bold.
    pub pretag: Duration,
    /// Time spent building and compiling the cascade.
    pub build: Duration,
    /// One entry per pattern that was actually tried, in cascade order.
    pub patterns: Vec<PatternMetrics>,
}

/// Result of trying one pattern against the scope.
#[derive(Debug, Clone)]
pub struct PatternMetrics {
    pub source: PatternSource,
    /// The regex source, for reproducing a match by hand.
    pub regex: String,
    /// Number of bold markers this pattern inserted (0 when it missed).
    pub wrapped: usize,
    pub duration: Duration,
}

/// Highlighter output bundled with what it looked at.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub outcome: Outcome,
    /// The scope that was worked on; `None` when resolution declined.
    pub scope: Option<ResolvedScope>,
    pub pretags_converted: usize,
    /// Number of patterns the cascade contained (tried or not).
    pub patterns_built: usize,
    pub metrics: RunMetrics,
}
