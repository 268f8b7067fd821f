//! Highlighting engine.
//!
//! This module is the internal entry point behind [`crate::highlight`]. The work
//! is split into focused submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! selectors + tree ── resolve_scope            (scope.rs)
//!                         │ best sentence container, fallback, or decline
//!                         v
//!                     convert_pretags          (pretag.rs)
//!                         │ <t>…</t> → <b class="auto-bold">…</b>
//!                         v
//! headword/reading ── build_patterns           (patterns.rs)
//!                         │ literal → kanji bridge → reading → kana → kanji core
//!                         v
//!                     Highlighter::run         (highlighter.rs)
//!                         │ first pattern that strikes wins
//!                         v
//!                      Outcome (+ RunMetrics, metrics.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `scope.rs`: scores selector matches and picks the sentence container.
//! - `pretag.rs`: promotes pre-marked spans, and builds bold markers.
//! - `patterns.rs`: the ordered regex cascade for a headword/reading pair.
//! - `highlighter.rs`: drives the pass and splices markers into text nodes.
//! - `metrics.rs`: optional timing/trace data for a run.
//!
//! ## Debugging
//!
//! Set `AUTOBOLD_DEBUG=1` to print scope, pattern and outcome traces.

#[path = "engine/highlighter.rs"]
mod highlighter;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/patterns.rs"]
mod patterns;
#[path = "engine/pretag.rs"]
mod pretag;
#[path = "engine/scope.rs"]
mod scope;

pub use highlighter::{Highlighter, wrap_matches};
pub use metrics::{PatternMetrics, RunMetrics, RunResult};
pub use patterns::{Pattern, PatternSource, build_patterns};
pub use pretag::convert_pretags;
pub use scope::{ResolvedScope, ScopeOrigin, ScopeQuery, ScopeScore, resolve_scope};
