//! The highlighting pass.
//!
//! This module ties the stages together and owns the only code that splices
//! new nodes into the tree:
//!
//! ```text
//! resolve_scope ──▶ None ─────────────────────────────▶ NoScope
//!      │
//!      ▼
//! convert_pretags ──▶ n > 0 ──────────────────────────▶ AppliedViaPretag
//!      │
//!      ▼
//! bold already present? ──▶ yes ──────────────────────▶ AlreadyBolded
//!      │
//!      ▼
//! for pattern in build_patterns(..):
//!      wrap_matches(scope, pattern) ──▶ n > 0 ────────▶ AppliedViaPattern
//!      │
//!      ▼
//! NoMatch
//! ```
//!
//! Text inside ruby annotations (`rt`) is never scanned. A match never spans
//! two text nodes: each text node is matched on its own.

use super::metrics::{PatternMetrics, RunMetrics, RunResult};
use super::patterns::build_patterns;
use super::pretag::{bold_marker, convert_pretags};
use super::scope::{ResolvedScope, ScopeQuery, resolve_scope};
use crate::dom::{Element, Node};
use crate::{Options, Outcome};
use regex::Regex;
use std::time::Instant;

/// One highlighting pass over one tree.
///
/// Usage: `Highlighter::new(&mut root, &selectors, headword, reading, &options).run()`.
/// The tree is borrowed mutably for the whole pass; nothing is retained
/// afterwards.
pub struct Highlighter<'a, S: AsRef<str>> {
    root: &'a mut Element,
    selectors: &'a [S],
    headword: &'a str,
    reading: Option<&'a str>,
    options: &'a Options,
}

impl<'a, S: AsRef<str>> Highlighter<'a, S> {
    pub fn new(
        root: &'a mut Element,
        selectors: &'a [S],
        headword: &'a str,
        reading: Option<&'a str>,
        options: &'a Options,
    ) -> Self {
        Highlighter { root, selectors, headword, reading, options }
    }

    /// Run the pass and return only the outcome.
    pub fn run(self) -> Outcome {
        self.run_with_metrics().outcome
    }

    /// Run the pass and return the outcome together with stage details.
    pub fn run_with_metrics(self) -> RunResult {
        let total_start = Instant::now();
        let options = self.options;
        let mut metrics = RunMetrics::default();

        let scope_start = Instant::now();
        let query = ScopeQuery {
            headword: self.headword,
            reading: self.reading,
            strict: options.strict_scope,
            fallback_allowed: options.fallback_allowed,
            fallback_selector: options.fallback_selector.as_deref(),
        };
        let resolved = resolve_scope(self.root, self.selectors, &query);
        metrics.scope = scope_start.elapsed();

        let finish = |outcome: Outcome,
                      scope: Option<ResolvedScope>,
                      pretags_converted: usize,
                      patterns_built: usize,
                      mut metrics: RunMetrics| {
            metrics.total = total_start.elapsed();
            trace!("[outcome] {} in {:?}", outcome, metrics.total);
            RunResult { outcome, scope, pretags_converted, patterns_built, metrics }
        };

        let Some(resolved) = resolved else {
            return finish(Outcome::NoScope, None, 0, 0, metrics);
        };
        let Some(scope) = self.root.at_path_mut(&resolved.path) else {
            // Paths come from this same tree, so this only trips on a resolver bug.
            return finish(Outcome::NoScope, None, 0, 0, metrics);
        };

        let pretag_start = Instant::now();
        let converted =
            if options.convert_pretags { convert_pretags(scope, &options.pretag, &options.marker_class) } else { 0 };
        trace!("[pretag] converted={}", converted);
        if converted > 0 {
            metrics.pretag = pretag_start.elapsed();
            return finish(Outcome::AppliedViaPretag { converted }, Some(resolved), converted, 0, metrics);
        }

        let already = if resolved.origin.is_sentence() {
            scope.any_visible_element(&|e: &Element| e.tag == "b")
        } else {
            // Outside a sentence container other bold text is card furniture;
            // only our own markers mean the work is done.
            let class = options.marker_class.as_str();
            scope.any_visible_element(&|e: &Element| e.tag == "b" && (class.is_empty() || e.has_class(class)))
        };
        metrics.pretag = pretag_start.elapsed();
        if already {
            return finish(Outcome::AlreadyBolded, Some(resolved), 0, 0, metrics);
        }

        if !options.pattern_matching {
            return finish(Outcome::NoMatch, Some(resolved), 0, 0, metrics);
        }

        let build_start = Instant::now();
        // A match lives in one text node, so no gap can be longer than the longest one.
        let bridge_limit = options.bridge_limit.min(longest_text(scope));
        let patterns = build_patterns(self.headword, self.reading, bridge_limit);
        metrics.build = build_start.elapsed();
        let built = patterns.len();

        for pattern in &patterns {
            let start = Instant::now();
            trace!("[pattern:try] source={} regex={}", pattern.source, pattern.regex.as_str());
            let wrapped = wrap_matches(scope, &pattern.regex, options.first_match_only, &options.marker_class);
            metrics.patterns.push(PatternMetrics {
                source: pattern.source,
                regex: pattern.regex.as_str().to_string(),
                wrapped,
                duration: start.elapsed(),
            });
            if wrapped > 0 {
                trace!("[pattern:hit] source={} wrapped={}", pattern.source, wrapped);
                let outcome = Outcome::AppliedViaPattern { source: pattern.source, wrapped };
                return finish(outcome, Some(resolved), 0, built, metrics);
            }
        }

        finish(Outcome::NoMatch, Some(resolved), 0, built, metrics)
    }
}

/// Wrap matches of `regex` in text nodes under `scope` with bold markers.
///
/// With `first_only` only the leftmost match of the first text node (in
/// depth-first order) that matches is wrapped; otherwise every
/// non-overlapping match in every eligible text node. Returns the number of
/// markers inserted.
pub fn wrap_matches(scope: &mut Element, regex: &Regex, first_only: bool, marker_class: &str) -> usize {
    let mut wrapped = 0;
    wrap_in(scope, regex, first_only, marker_class, &mut wrapped);
    wrapped
}

/// Returns true once a first-only pass has wrapped its match.
fn wrap_in(el: &mut Element, regex: &Regex, first_only: bool, marker_class: &str, wrapped: &mut usize) -> bool {
    if el.is_ruby_annotation() {
        return false;
    }
    let mut i = 0;
    while i < el.children.len() {
        let (text, spans) = match &mut el.children[i] {
            Node::Element(child) => {
                if wrap_in(child, regex, first_only, marker_class, wrapped) {
                    return true;
                }
                i += 1;
                continue;
            }
            Node::Text(text) => {
                let spans = find_spans(regex, text, first_only);
                if spans.is_empty() {
                    i += 1;
                    continue;
                }
                (std::mem::take(text), spans)
            }
        };

        let pieces = split_text(&text, &spans, marker_class);
        let inserted = pieces.len();
        el.children.splice(i..=i, pieces);
        i += inserted;
        *wrapped += spans.len();
        if first_only {
            return true;
        }
    }
    false
}

/// Length in chars of the longest text node outside ruby annotations.
fn longest_text(el: &Element) -> usize {
    if el.is_ruby_annotation() {
        return 0;
    }
    el.children
        .iter()
        .map(|c| match c {
            Node::Text(t) => t.chars().count(),
            Node::Element(child) => longest_text(child),
        })
        .max()
        .unwrap_or(0)
}

fn find_spans(regex: &Regex, text: &str, first_only: bool) -> Vec<(usize, usize)> {
    // Empty matches would produce empty markers; patterns never yield them,
    // but a caller-supplied regex might.
    let spans = regex.find_iter(text).filter(|m| !m.is_empty()).map(|m| (m.start(), m.end()));
    if first_only { spans.take(1).collect() } else { spans.collect() }
}

/// `before <b>match</b> between <b>match</b> after`, omitting empty text parts.
fn split_text(text: &str, spans: &[(usize, usize)], marker_class: &str) -> Vec<Node> {
    let mut pieces = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;
    for &(start, end) in spans {
        if start > cursor {
            pieces.push(Node::Text(text[cursor..start].to_string()));
        }
        pieces.push(Node::Element(bold_marker(marker_class, vec![Node::Text(text[start..end].to_string())])));
        cursor = end;
    }
    if cursor < text.len() {
        pieces.push(Node::Text(text[cursor..].to_string()));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{parse_fragment, to_html};

    fn wrap(html: &str, re: &str, first_only: bool) -> (usize, String) {
        let mut root = parse_fragment(html).unwrap();
        let n = wrap_matches(&mut root, &Regex::new(re).unwrap(), first_only, "auto-bold");
        (n, to_html(&root))
    }

    #[test]
    fn wraps_first_match_only() {
        let (n, html) = wrap("<p>猫と猫</p><p>猫</p>", "猫", true);
        assert_eq!(n, 1);
        assert_eq!(html, r#"<p><b class="auto-bold">猫</b>と猫</p><p>猫</p>"#);
    }

    #[test]
    fn wraps_every_match_when_asked() {
        let (n, html) = wrap("<p>猫と猫</p><p>猫</p>", "猫", false);
        assert_eq!(n, 3);
        assert_eq!(
            html,
            r#"<p><b class="auto-bold">猫</b>と<b class="auto-bold">猫</b></p><p><b class="auto-bold">猫</b></p>"#
        );
    }

    #[test]
    fn skips_ruby_annotations() {
        let (n, html) = wrap("<ruby>猫<rt>ねこ</rt></ruby>がねこんだ", "ねこ", true);
        assert_eq!(n, 1);
        assert_eq!(html, r#"<ruby>猫<rt>ねこ</rt></ruby>が<b class="auto-bold">ねこ</b>んだ"#);
    }

    #[test]
    fn does_not_match_across_nodes() {
        let (n, _) = wrap("<p>課<i>長</i></p>", "課長", true);
        assert_eq!(n, 0);
    }

    #[test]
    fn longest_text_ignores_ruby_annotations() {
        let root = parse_fragment("<p>課長<ruby>漢<rt>かんかんかん</rt></ruby>に会った</p>").unwrap();
        assert_eq!(longest_text(&root), 4);
        assert_eq!(longest_text(&Element::new("p")), 0);
    }

    #[test]
    fn ignores_empty_matches() {
        let (n, html) = wrap("<p>abc</p>", "x*", false);
        assert_eq!(n, 0);
        assert_eq!(html, "<p>abc</p>");
    }
}
