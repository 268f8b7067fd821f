//! Sentence scope resolution.
//!
//! Cards carry a lot of markup besides the example sentence (the headword
//! itself, definitions, furigana readings). Highlighting must stay inside the
//! sentence, so the engine first picks one container element to work in.
//!
//! ```text
//! selectors ──▶ every matching element is a candidate
//!                 score = (contains headword/reading?, japanese char count)
//!                 best score wins; ties → earlier selector, then document order
//!           └─▶ no candidate:
//!                 strict && !fallback  → no scope (tree untouched)
//!                 otherwise            → fallback selector (#qa) → root
//! ```

use crate::dom::{Element, NodePath};
use crate::script::{japanese_len, only_kana, to_hiragana, to_katakana};
use crate::selector::Selector;

/// How a scope was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeOrigin {
    /// Matched the sentence selector at this index of the candidate list.
    Selector { index: usize },
    /// Matched the configured fallback selector.
    Fallback,
    /// Nothing matched; the whole tree is the scope.
    Root,
}

impl ScopeOrigin {
    /// True when the scope is a real sentence container.
    pub fn is_sentence(&self) -> bool {
        matches!(self, ScopeOrigin::Selector { .. })
    }
}

/// Ranking key for sentence candidates. Field order is comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ScopeScore {
    pub contains_target: bool,
    pub japanese_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    pub path: NodePath,
    pub origin: ScopeOrigin,
    pub score: ScopeScore,
}

/// Inputs to [`resolve_scope`] besides the tree itself.
#[derive(Debug, Clone, Copy)]
pub struct ScopeQuery<'a> {
    pub headword: &'a str,
    pub reading: Option<&'a str>,
    pub strict: bool,
    pub fallback_allowed: bool,
    pub fallback_selector: Option<&'a str>,
}

/// Pick the sentence container, or `None` under a strict, no-fallback policy.
pub fn resolve_scope<S: AsRef<str>>(root: &Element, selectors: &[S], query: &ScopeQuery<'_>) -> Option<ResolvedScope> {
    let targets = target_forms(query.headword, query.reading);
    // The root itself is a candidate too (hosts may hand over the sentence element directly).
    // Nothing inside a ruby annotation is ever a candidate.
    let own = (!root.is_ruby_annotation()).then(Vec::new);
    let paths: Vec<NodePath> = own.into_iter().chain(root.descendant_paths()).collect();

    let mut best: Option<ResolvedScope> = None;
    for (index, raw) in selectors.iter().enumerate() {
        let selector = match Selector::parse(raw.as_ref()) {
            Ok(sel) => sel,
            Err(err) => {
                trace!("[scope] skip selector \"{}\": {}", raw.as_ref(), err);
                continue;
            }
        };
        for path in &paths {
            let Some(el) = root.at_path(path) else { continue };
            if !selector.matches(el) {
                continue;
            }
            let score = score_candidate(el, &targets);
            trace!("[scope] candidate selector=\"{}\" path={:?} score={:?}", raw.as_ref(), path, score);
            // Strictly greater only: earlier selectors and earlier nodes keep ties.
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(ResolvedScope { path: path.clone(), origin: ScopeOrigin::Selector { index }, score });
            }
        }
    }

    if let Some(found) = best {
        trace!("[scope] resolved origin={:?} path={:?}", found.origin, found.path);
        return Some(found);
    }

    if query.strict && !query.fallback_allowed {
        trace!("[scope] no sentence container and strict scope: declining");
        return None;
    }

    let fallback = query.fallback_selector.and_then(|raw| match Selector::parse(raw) {
        Ok(sel) => paths.iter().find(|p| root.at_path(p).is_some_and(|el| sel.matches(el))).cloned(),
        Err(err) => {
            trace!("[scope] skip fallback selector \"{}\": {}", raw, err);
            None
        }
    });

    let resolved = match fallback {
        Some(path) => {
            let score = root.at_path(&path).map(|el| score_candidate(el, &targets)).unwrap_or_default();
            ResolvedScope { path, origin: ScopeOrigin::Fallback, score }
        }
        None if root.is_ruby_annotation() => {
            trace!("[scope] root is a ruby annotation: declining");
            return None;
        }
        None => ResolvedScope { path: Vec::new(), origin: ScopeOrigin::Root, score: score_candidate(root, &targets) },
    };
    trace!("[scope] resolved origin={:?} path={:?}", resolved.origin, resolved.path);
    Some(resolved)
}

/// Strings whose presence marks a candidate as "the" sentence.
fn target_forms(headword: &str, reading: Option<&str>) -> Vec<String> {
    let mut forms = Vec::new();
    let headword = headword.trim();
    if !headword.is_empty() {
        forms.push(headword.to_string());
    }
    let kana = reading.map(only_kana).unwrap_or_default();
    if !kana.is_empty() {
        forms.push(to_hiragana(&kana));
        forms.push(to_katakana(&kana));
    }
    forms
}

fn score_candidate(el: &Element, targets: &[String]) -> ScopeScore {
    let text = el.visible_text();
    ScopeScore {
        contains_target: targets.iter().any(|t| text.contains(t.as_str())),
        japanese_chars: japanese_len(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_fragment;

    fn query<'a>(headword: &'a str, reading: Option<&'a str>) -> ScopeQuery<'a> {
        ScopeQuery { headword, reading, strict: false, fallback_allowed: true, fallback_selector: Some("#qa") }
    }

    const SELECTORS: &[&str] = &[".full-sentence", ".sentence"];

    #[test]
    fn prefers_candidate_containing_the_headword() {
        let root = parse_fragment(
            r#"<div id="qa"><p class="full-sentence">とても長い日本語の文章がここにあります。</p><p class="sentence">課長に会った。</p></div>"#,
        )
        .unwrap();
        let scope = resolve_scope(&root, SELECTORS, &query("課長", None)).unwrap();
        assert_eq!(scope.path, vec![0, 1]);
        assert_eq!(scope.origin, ScopeOrigin::Selector { index: 1 });
        assert!(scope.score.contains_target);
    }

    #[test]
    fn reading_forms_count_as_containment() {
        let root =
            parse_fragment(r#"<p class="sentence">長い長い長い長い文章です</p><p class="sentence">カチョウ</p>"#).unwrap();
        let scope = resolve_scope(&root, SELECTORS, &query("", Some("かちょう"))).unwrap();
        assert_eq!(scope.path, vec![1]);
    }

    #[test]
    fn japanese_length_breaks_ties_without_containment() {
        let root = parse_fragment(r#"<p class="sentence">abc 短い</p><p class="sentence">もっと長い文</p>"#).unwrap();
        let scope = resolve_scope(&root, SELECTORS, &query("無関係", None)).unwrap();
        assert_eq!(scope.path, vec![1]);
        assert_eq!(scope.score, ScopeScore { contains_target: false, japanese_chars: 6 });
    }

    #[test]
    fn equal_scores_keep_selector_then_document_order() {
        let root = parse_fragment(
            r#"<p class="sentence">同じ</p><p class="full-sentence">同じ</p><p class="full-sentence">同じ</p>"#,
        )
        .unwrap();
        let scope = resolve_scope(&root, SELECTORS, &query("同じ", None)).unwrap();
        assert_eq!(scope.path, vec![1]);
        assert_eq!(scope.origin, ScopeOrigin::Selector { index: 0 });
    }

    #[test]
    fn ruby_text_does_not_score() {
        let root = parse_fragment(
            r#"<p class="sentence"><ruby>漢<rt>かちょうかちょう</rt></ruby></p><p class="sentence">文です</p>"#,
        )
        .unwrap();
        let scope = resolve_scope(&root, SELECTORS, &query("", Some("かちょう"))).unwrap();
        assert_eq!(scope.path, vec![1]);
    }

    #[test]
    fn strict_without_fallback_declines() {
        let root = parse_fragment(r#"<div id="qa">課長</div>"#).unwrap();
        let q = ScopeQuery { strict: true, fallback_allowed: false, ..query("課長", None) };
        assert_eq!(resolve_scope(&root, SELECTORS, &q), None);
    }

    #[test]
    fn falls_back_to_card_then_root() {
        let root = parse_fragment(r#"<span>前</span><div id="qa">課長</div>"#).unwrap();
        let scope = resolve_scope(&root, SELECTORS, &query("課長", None)).unwrap();
        assert_eq!(scope.origin, ScopeOrigin::Fallback);
        assert_eq!(scope.path, vec![1]);

        let root = parse_fragment("<span>課長</span>").unwrap();
        let scope = resolve_scope(&root, SELECTORS, &query("課長", None)).unwrap();
        assert_eq!(scope.origin, ScopeOrigin::Root);
        assert!(scope.path.is_empty());
    }

    #[test]
    fn strict_with_fallback_still_falls_back() {
        let root = parse_fragment("<span>課長</span>").unwrap();
        let q = ScopeQuery { strict: true, ..query("課長", None) };
        assert_eq!(resolve_scope(&root, SELECTORS, &q).map(|s| s.origin), Some(ScopeOrigin::Root));
    }

    #[test]
    fn root_can_be_the_sentence() {
        let root = Element::new("p").with_attr("class", "sentence").with_text("文");
        let scope = resolve_scope(&root, SELECTORS, &query("文", None)).unwrap();
        assert!(scope.path.is_empty());
        assert_eq!(scope.origin, ScopeOrigin::Selector { index: 1 });
    }

    #[test]
    fn candidates_inside_ruby_annotations_are_ignored() {
        let root =
            parse_fragment(r#"<ruby>課長<rt><span class="sentence">かちょう</span></rt></ruby>"#).unwrap();
        let scope = resolve_scope(&root, SELECTORS, &query("", Some("かちょう"))).unwrap();
        assert_eq!(scope.origin, ScopeOrigin::Root);

        let root = parse_fragment(r#"<ruby>課長<rt><span id="qa">かちょう</span></rt></ruby>"#).unwrap();
        let scope = resolve_scope(&root, SELECTORS, &query("", Some("かちょう"))).unwrap();
        assert_eq!(scope.origin, ScopeOrigin::Root);
        assert!(scope.path.is_empty());
    }

    #[test]
    fn invalid_selectors_are_skipped() {
        let root = parse_fragment(r#"<p class="sentence">文</p>"#).unwrap();
        let scope = resolve_scope(&root, &["div > p", ".sentence"], &query("文", None)).unwrap();
        assert_eq!(scope.origin, ScopeOrigin::Selector { index: 1 });
    }
}
