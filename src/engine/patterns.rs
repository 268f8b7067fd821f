//! Pattern cascade construction.
//!
//! Given a headword and an optional reading, build the ordered list of
//! regexes the highlighter tries. Earlier patterns are more specific; the
//! first one that matches anywhere in scope wins and later ones never run.
//!
//! ```text
//! headword "聞く", reading "きく", bridge 12
//!
//!  1 literal-target          聞く
//!  2 kanji-bridge            聞[kana]*
//!  3 reading-hiragana        きく[kana]*
//!  4 reading-katakana        キク[kana]*
//!  5 kana-headword-*         (headword has kanji: skipped)
//!  6 kanji-core              聞
//! ```
//!
//! Kanji bridges only ever admit kana between the headword's kanji, so a
//! multi-kanji headword cannot be stitched together across an unrelated
//! compound in the sentence.

use crate::script::{HeadwordClass, KANA_CLASS, kanji_core, only_kana, to_hiragana, to_katakana};
use regex::{Regex, RegexBuilder};

/// Compiled-size ceiling for one cascade pattern; wide kanji bridges need more
/// room than the regex crate's default.
const PATTERN_SIZE_LIMIT: usize = 64 * (1 << 20);

/// Which step of the cascade produced a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternSource {
    LiteralTarget,
    KanjiBridge,
    ReadingHiragana,
    ReadingKatakana,
    KanaHeadwordHiragana,
    KanaHeadwordKatakana,
    KanjiCore,
}

impl PatternSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternSource::LiteralTarget => "literal-target",
            PatternSource::KanjiBridge => "kanji-bridge",
            PatternSource::ReadingHiragana => "reading-hiragana",
            PatternSource::ReadingKatakana => "reading-katakana",
            PatternSource::KanaHeadwordHiragana => "kana-headword-hiragana",
            PatternSource::KanaHeadwordKatakana => "kana-headword-katakana",
            PatternSource::KanjiCore => "kanji-core",
        }
    }
}

impl std::fmt::Display for PatternSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled cascade step.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub source: PatternSource,
    pub regex: Regex,
}

/// Build the cascade for `headword` / `reading`.
///
/// The reading is reduced to its kana before use, so stored forms like
/// `課長[かちょう]` work as-is. Returns an empty list when neither input has
/// anything to match on.
pub fn build_patterns(headword: &str, reading: Option<&str>, bridge_limit: usize) -> Vec<Pattern> {
    let headword = headword.trim();
    let reading_kana = reading.map(only_kana).unwrap_or_default();
    let class = HeadwordClass::of(headword);

    let mut sources: Vec<(PatternSource, String)> = Vec::new();

    if !headword.is_empty() {
        sources.push((PatternSource::LiteralTarget, regex::escape(headword)));
    }

    if class.has_kanji() {
        let bridge = format!("{KANA_CLASS}{{0,{bridge_limit}}}");
        let kanji: Vec<String> = kanji_core(headword).chars().map(|k| regex::escape(&k.to_string())).collect();
        sources.push((PatternSource::KanjiBridge, format!("{}{KANA_CLASS}*", kanji.join(&bridge))));
    }

    if !reading_kana.is_empty() {
        sources.push((PatternSource::ReadingHiragana, kana_with_tail(&to_hiragana(&reading_kana))));
        sources.push((PatternSource::ReadingKatakana, kana_with_tail(&to_katakana(&reading_kana))));
    }

    if class == HeadwordClass::Kana {
        sources.push((PatternSource::KanaHeadwordHiragana, kana_with_tail(&to_hiragana(headword))));
        sources.push((PatternSource::KanaHeadwordKatakana, kana_with_tail(&to_katakana(headword))));
    }

    let core = kanji_core(headword);
    if !core.is_empty() {
        sources.push((PatternSource::KanjiCore, regex::escape(&core)));
    }

    let mut seen: Vec<&str> = Vec::new();
    let mut patterns = Vec::new();
    for (source, pat) in &sources {
        if seen.contains(&pat.as_str()) {
            trace!("[patterns] skip duplicate source={} regex={}", source, pat);
            continue;
        }
        seen.push(pat);
        match RegexBuilder::new(pat).size_limit(PATTERN_SIZE_LIMIT).build() {
            Ok(regex) => patterns.push(Pattern { source: *source, regex }),
            Err(err) => {
                trace!("[patterns] skip uncompilable source={} err={}", source, err);
            }
        }
    }

    trace!(
        "[patterns] headword=\"{}\" reading=\"{}\" class={:?} built={:?}",
        headword,
        reading_kana,
        class,
        patterns.iter().map(|p| p.source.as_str()).collect::<Vec<_>>()
    );

    patterns
}

fn kana_with_tail(kana: &str) -> String {
    format!("{}{KANA_CLASS}*", regex::escape(kana))
}
