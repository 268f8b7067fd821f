use crate::dom::{Element, NodePath};
use crate::engine::{self, PatternSource, ResolvedScope, ScopeOrigin, ScopeQuery, resolve_scope};
use std::fmt;
use std::time::Duration;

/// Sentence containers used by the common Japanese card templates, most
/// specific first.
pub const DEFAULT_SENTENCE_SELECTORS: &[&str] =
    &[".full-sentence", ".jpsentence", ".sentence", ".sentence-block", ".expression--sentence"];

/// Options that affect a highlighting pass.
///
/// Everything the engine needs comes in through here and the selector list;
/// nothing is read from the environment except debug tracing.
#[derive(Debug, Clone)]
pub struct Options {
    /// Max kana allowed between consecutive kanji of the headword.
    pub bridge_limit: usize,
    /// Stop after wrapping one match instead of every match of the winning pattern.
    pub first_match_only: bool,
    /// Refuse to touch anything outside a sentence container...
    pub strict_scope: bool,
    /// ...unless falling back to the card / root is explicitly allowed.
    pub fallback_allowed: bool,
    /// Promote pre-tags (`<t>`) to bold markers.
    pub convert_pretags: bool,
    /// Run the regex cascade when no pre-tag was found.
    pub pattern_matching: bool,
    /// Tag name of the pre-marked target span.
    pub pretag: String,
    /// Class put on inserted bold markers; empty for a bare `<b>`.
    pub marker_class: String,
    /// Where to look when no sentence container matched.
    pub fallback_selector: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bridge_limit: 12,
            first_match_only: true,
            strict_scope: false,
            fallback_allowed: true,
            convert_pretags: true,
            pattern_matching: true,
            pretag: "t".to_string(),
            marker_class: "auto-bold".to_string(),
            fallback_selector: Some("#qa".to_string()),
        }
    }
}

/// What a highlighting pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Pre-tags were promoted to bold markers; no pattern was tried.
    AppliedViaPretag { converted: usize },
    /// The scope already had bold text; nothing changed.
    AlreadyBolded,
    /// A cascade pattern matched and its matches were wrapped.
    AppliedViaPattern { source: PatternSource, wrapped: usize },
    /// No acceptable scope; the tree is untouched.
    NoScope,
    /// Nothing matched (or there was nothing to match with).
    NoMatch,
}

impl Outcome {
    /// Stable label for logs and host messages.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::AppliedViaPretag { .. } => "applied-via-pretag",
            Outcome::AlreadyBolded => "already-bolded",
            Outcome::AppliedViaPattern { .. } => "applied-via-pattern",
            Outcome::NoScope => "no-scope",
            Outcome::NoMatch => "no-match",
        }
    }

    /// True when this pass inserted at least one bold marker.
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::AppliedViaPretag { .. } | Outcome::AppliedViaPattern { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AppliedViaPretag { converted } => write!(f, "{} ({})", self.label(), converted),
            Outcome::AppliedViaPattern { source, wrapped } => write!(f, "{} ({}, {})", self.label(), source, wrapped),
            _ => f.write_str(self.label()),
        }
    }
}

/// Per-pattern trace in [`HighlightDetails`].
#[derive(Debug, Clone)]
pub struct PatternTrace {
    pub source: PatternSource,
    pub regex: String,
    pub wrapped: usize,
    pub duration: Duration,
}

/// Extra information returned by [`highlight_verbose`].
#[derive(Debug, Clone)]
pub struct HighlightDetails {
    pub total: Duration,
    /// Path of the scope element from the root, when one was chosen.
    pub scope_path: Option<NodePath>,
    pub scope_origin: Option<ScopeOrigin>,
    /// `(contains headword/reading, japanese char count)` of the chosen scope.
    pub scope_score: Option<(bool, usize)>,
    pub scope_time: Duration,
    pub pretags_converted: usize,
    pub pretag_time: Duration,
    /// Size of the cascade (0 when the cascade never ran).
    pub patterns_built: usize,
    pub build_time: Duration,
    /// Patterns in the order they were tried; the last one is the winner on success.
    pub patterns: Vec<PatternTrace>,
}

/// Result of [`highlight_verbose`].
#[derive(Debug, Clone)]
pub struct HighlightReport {
    pub outcome: Outcome,
    pub details: HighlightDetails,
}

/// Highlight `headword` inside the best sentence container of `root`.
///
/// `selectors` are compound selectors (`.class`, `tag`, `#id`, combinations)
/// in priority order; unparseable ones are ignored. `reading` may be a stored
/// form such as `課長[かちょう]`: only its kana are used.
///
/// # Example
/// ```
/// use autobold::{Outcome, Options, highlight, markup};
///
/// let mut root = markup::parse_fragment(r#"<p class="sentence">音楽を聞いていた。</p>"#).unwrap();
/// let out = highlight(&mut root, &[".sentence"], "聞く", None, &Options::default());
/// assert!(matches!(out, Outcome::AppliedViaPattern { .. }));
/// assert_eq!(
///     markup::to_html(&root),
///     r#"<p class="sentence">音楽を<b class="auto-bold">聞いていた</b>。</p>"#
/// );
/// ```
pub fn highlight<S: AsRef<str>>(
    root: &mut Element,
    selectors: &[S],
    headword: &str,
    reading: Option<&str>,
    options: &Options,
) -> Outcome {
    engine::Highlighter::new(root, selectors, headword, reading, options).run()
}

/// Like [`highlight`], but also returns what each stage did.
///
/// The default [`highlight`] path does the same work; only the trace is extra.
pub fn highlight_verbose<S: AsRef<str>>(
    root: &mut Element,
    selectors: &[S],
    headword: &str,
    reading: Option<&str>,
    options: &Options,
) -> HighlightReport {
    let run = engine::Highlighter::new(root, selectors, headword, reading, options).run_with_metrics();

    let patterns = run
        .metrics
        .patterns
        .iter()
        .map(|p| PatternTrace { source: p.source, regex: p.regex.clone(), wrapped: p.wrapped, duration: p.duration })
        .collect();

    let (scope_path, scope_origin, scope_score) = match run.scope {
        Some(ResolvedScope { path, origin, score }) => {
            (Some(path), Some(origin), Some((score.contains_target, score.japanese_chars)))
        }
        None => (None, None, None),
    };

    let details = HighlightDetails {
        total: run.metrics.total,
        scope_path,
        scope_origin,
        scope_score,
        scope_time: run.metrics.scope,
        pretags_converted: run.pretags_converted,
        pretag_time: run.metrics.pretag,
        patterns_built: run.patterns_built,
        build_time: run.metrics.build,
        patterns,
    };

    HighlightReport { outcome: run.outcome, details }
}

/// Read-only status of a tree, for "did it work?" reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoldSummary {
    /// False when no sentence container matched and no fallback was possible.
    pub scope_found: bool,
    /// True when the scope is a sentence container (not the card/root fallback).
    pub sentence_found: bool,
    /// Pre-tags still present in scope.
    pub pretags: usize,
    /// Bold markers carrying the marker class in scope.
    pub markers: usize,
    /// Any `<b>` at all in the sentence container.
    pub sentence_has_bold: bool,
}

impl fmt::Display for BoldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scope_found {
            return f.write_str("no-sentence");
        }
        if self.markers > 0 {
            return write!(f, "applied (t={}, b={})", self.pretags, self.markers);
        }
        if self.sentence_has_bold {
            return f.write_str("already-bolded");
        }
        write!(f, "no-match (t={}, b={})", self.pretags, self.markers)
    }
}

/// Summarize the highlighting state of `root` without changing it.
///
/// Uses the same scope rules as [`highlight`] (without headword scoring, so the
/// longest Japanese sentence container wins).
pub fn inspect<S: AsRef<str>>(root: &Element, selectors: &[S], options: &Options) -> BoldSummary {
    let query = ScopeQuery {
        headword: "",
        reading: None,
        strict: options.strict_scope,
        fallback_allowed: options.fallback_allowed,
        fallback_selector: options.fallback_selector.as_deref(),
    };
    let Some(resolved) = resolve_scope(root, selectors, &query) else {
        return BoldSummary { scope_found: false, sentence_found: false, pretags: 0, markers: 0, sentence_has_bold: false };
    };
    let Some(scope) = root.at_path(&resolved.path) else {
        return BoldSummary { scope_found: false, sentence_found: false, pretags: 0, markers: 0, sentence_has_bold: false };
    };

    let sentence_found = resolved.origin.is_sentence();
    let class = options.marker_class.as_str();
    BoldSummary {
        scope_found: true,
        sentence_found,
        pretags: scope.count_visible_elements(&|e: &Element| e.tag.eq_ignore_ascii_case(&options.pretag)),
        markers: scope
            .count_visible_elements(&|e: &Element| e.tag == "b" && (class.is_empty() || e.has_class(class))),
        sentence_has_bold: sentence_found && scope.any_visible_element(&|e: &Element| e.tag == "b"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_fragment;

    #[test]
    fn highlight_verbose_traces_the_cascade() {
        let mut root = parse_fragment(r#"<p class="sentence">音楽を聞いていた。</p>"#).unwrap();
        let res = highlight_verbose(&mut root, DEFAULT_SENTENCE_SELECTORS, "聞く", Some("きく"), &Options::default());

        assert_eq!(res.outcome, Outcome::AppliedViaPattern { source: PatternSource::KanjiBridge, wrapped: 1 });
        assert_eq!(res.details.scope_path, Some(vec![0]));
        assert_eq!(res.details.scope_origin, Some(ScopeOrigin::Selector { index: 2 }));
        assert_eq!(res.details.patterns_built, 5);
        let tried: Vec<_> = res.details.patterns.iter().map(|p| (p.source, p.wrapped)).collect();
        assert_eq!(tried, vec![(PatternSource::LiteralTarget, 0), (PatternSource::KanjiBridge, 1)]);
        assert!(res.details.scope_time <= res.details.total);
    }

    #[test]
    fn verbose_no_scope_has_no_scope_details() {
        let mut root = parse_fragment("<div>課長</div>").unwrap();
        let options = Options { strict_scope: true, fallback_allowed: false, ..Options::default() };
        let res = highlight_verbose(&mut root, DEFAULT_SENTENCE_SELECTORS, "課長", None, &options);
        assert_eq!(res.outcome, Outcome::NoScope);
        assert_eq!(res.details.scope_path, None);
        assert!(res.details.patterns.is_empty());
    }

    #[test]
    fn outcome_labels_and_display() {
        assert_eq!(Outcome::NoScope.to_string(), "no-scope");
        assert_eq!(Outcome::AppliedViaPretag { converted: 2 }.to_string(), "applied-via-pretag (2)");
        let hit = Outcome::AppliedViaPattern { source: PatternSource::KanjiCore, wrapped: 1 };
        assert_eq!(hit.to_string(), "applied-via-pattern (kanji-core, 1)");
        assert!(hit.is_applied());
        assert!(!Outcome::AlreadyBolded.is_applied());
    }

    #[test]
    fn inspect_reports_state() {
        let opts = Options::default();
        let root = parse_fragment(r#"<p class="sentence">課長に<t>会った</t></p>"#).unwrap();
        assert_eq!(inspect(&root, DEFAULT_SENTENCE_SELECTORS, &opts).to_string(), "no-match (t=1, b=0)");

        let root = parse_fragment(r#"<p class="sentence"><b class="auto-bold">課長</b>に</p>"#).unwrap();
        assert_eq!(inspect(&root, DEFAULT_SENTENCE_SELECTORS, &opts).to_string(), "applied (t=0, b=1)");

        let root = parse_fragment(r#"<p class="sentence"><b>課長</b>に</p>"#).unwrap();
        assert_eq!(inspect(&root, DEFAULT_SENTENCE_SELECTORS, &opts).to_string(), "already-bolded");

        // Bold and pre-tags inside furigana are not part of the sentence.
        let root = parse_fragment(r#"<p class="sentence"><ruby>課長<rt><b>か</b><t>ちょう</t></rt></ruby>に</p>"#).unwrap();
        assert_eq!(inspect(&root, DEFAULT_SENTENCE_SELECTORS, &opts).to_string(), "no-match (t=0, b=0)");

        let upper = Options { pretag: "T".to_string(), ..Options::default() };
        let root = parse_fragment(r#"<p class="sentence">課長に<t>会った</t></p>"#).unwrap();
        assert_eq!(inspect(&root, DEFAULT_SENTENCE_SELECTORS, &upper).to_string(), "no-match (t=1, b=0)");

        let strict = Options { strict_scope: true, fallback_allowed: false, ..Options::default() };
        let root = parse_fragment("<div>課長</div>").unwrap();
        assert_eq!(inspect(&root, DEFAULT_SENTENCE_SELECTORS, &strict).to_string(), "no-sentence");
    }
}
