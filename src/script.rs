//! Script classification for Japanese text.
//!
//! Everything the matcher needs to know about characters lives here: which
//! code points count as kana or kanji, how to shift between hiragana and
//! katakana, and how to project a string down to one script class.
//!
//! ```text
//! U+3040..=U+309F  Hiragana block          ─┐
//! U+30A0..=U+30FF  Katakana block (incl. ー) ─┴─ Script::Kana
//! U+4E00..=U+9FFF  CJK Unified Ideographs  ─┐
//! U+3005           々 (iteration mark)      ─┴─ Script::Kanji
//! ```
//!
//! All functions are pure and total: empty input yields empty output.

/// Hiragana letters that have a katakana twin exactly 0x60 above them.
const HIRAGANA_SHIFTABLE: std::ops::RangeInclusive<char> = '\u{3041}'..='\u{3096}';
/// Katakana letters that have a hiragana twin exactly 0x60 below them.
const KATAKANA_SHIFTABLE: std::ops::RangeInclusive<char> = '\u{30A1}'..='\u{30F6}';
const KANA_SHIFT: u32 = 0x60;

/// Regex character class for a single kana character (used by the pattern builder).
pub(crate) const KANA_CLASS: &str = r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Kana,
    Kanji,
    Other,
}

bitflags::bitflags! {
    /// Which script classes occur in a string.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScriptMask: u8 {
        const KANA  = 1 << 0;
        const KANJI = 1 << 1;
        const OTHER = 1 << 2;
    }
}

/// Coarse shape of a headword, used to decide which patterns make sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadwordClass {
    /// Has kanji but no kana (e.g. `予想`).
    Kanji,
    /// Has kana but no kanji (e.g. `やっぱり`).
    Kana,
    /// Has both (e.g. `聞く`).
    Mixed,
    /// Neither kana nor kanji.
    Other,
}

impl HeadwordClass {
    pub fn of(s: &str) -> Self {
        let mask = script_mask(s);
        match (mask.contains(ScriptMask::KANJI), mask.contains(ScriptMask::KANA)) {
            (true, true) => HeadwordClass::Mixed,
            (true, false) => HeadwordClass::Kanji,
            (false, true) => HeadwordClass::Kana,
            (false, false) => HeadwordClass::Other,
        }
    }

    pub fn has_kanji(self) -> bool {
        matches!(self, HeadwordClass::Kanji | HeadwordClass::Mixed)
    }
}

pub fn classify(c: char) -> Script {
    match c {
        '\u{4E00}'..='\u{9FFF}' | '\u{3005}' => Script::Kanji,
        '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' => Script::Kana,
        _ => Script::Other,
    }
}

pub fn is_kana(c: char) -> bool {
    classify(c) == Script::Kana
}

pub fn is_kanji(c: char) -> bool {
    classify(c) == Script::Kanji
}

/// Union of the script classes present in `s`.
pub fn script_mask(s: &str) -> ScriptMask {
    let mut mask = ScriptMask::empty();
    for c in s.chars() {
        mask |= match classify(c) {
            Script::Kana => ScriptMask::KANA,
            Script::Kanji => ScriptMask::KANJI,
            Script::Other => ScriptMask::OTHER,
        };
    }
    mask
}

/// Number of kana and kanji characters in `s`.
pub fn japanese_len(s: &str) -> usize {
    s.chars().filter(|&c| classify(c) != Script::Other).count()
}

pub fn to_hiragana(s: &str) -> String {
    s.chars().map(|c| if KATAKANA_SHIFTABLE.contains(&c) { shift(c, false) } else { c }).collect()
}

pub fn to_katakana(s: &str) -> String {
    s.chars().map(|c| if HIRAGANA_SHIFTABLE.contains(&c) { shift(c, true) } else { c }).collect()
}

pub fn only_kana(s: &str) -> String {
    s.chars().filter(|&c| is_kana(c)).collect()
}

pub fn kanji_core(s: &str) -> String {
    s.chars().filter(|&c| is_kanji(c)).collect()
}

fn shift(c: char, up: bool) -> char {
    let cp = c as u32;
    let shifted = if up { cp + KANA_SHIFT } else { cp - KANA_SHIFT };
    // Both shiftable ranges map onto assigned, non-surrogate code points.
    char::from_u32(shifted).unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_blocks() {
        assert_eq!(classify('あ'), Script::Kana);
        assert_eq!(classify('ア'), Script::Kana);
        assert_eq!(classify('ー'), Script::Kana);
        assert_eq!(classify('課'), Script::Kanji);
        assert_eq!(classify('々'), Script::Kanji);
        assert_eq!(classify('a'), Script::Other);
        assert_eq!(classify('。'), Script::Other);
        assert_eq!(classify('['), Script::Other);
    }

    #[test]
    fn shifts_between_kana_blocks() {
        assert_eq!(to_katakana("かちょう"), "カチョウ");
        assert_eq!(to_hiragana("カチョウ"), "かちょう");
        // Long-vowel mark and non-kana pass through.
        assert_eq!(to_hiragana("コーヒー!"), "こーひー!");
        assert_eq!(to_katakana("漢字abc"), "漢字abc");
        // ヷ has no hiragana twin.
        assert_eq!(to_hiragana("ヷ"), "ヷ");
    }

    #[test]
    fn shifting_is_reversible_on_shiftable_text() {
        let hira: String = HIRAGANA_SHIFTABLE.collect();
        assert_eq!(to_hiragana(&to_katakana(&hira)), hira);
        let kata: String = KATAKANA_SHIFTABLE.collect();
        assert_eq!(to_katakana(&to_hiragana(&kata)), kata);
    }

    #[test]
    fn projections_keep_order_and_are_idempotent() {
        assert_eq!(only_kana("課長[かちょう]"), "かちょう");
        assert_eq!(kanji_core("聞き取る"), "聞取");
        assert_eq!(kanji_core(&kanji_core("時々見る")), "時々見");
        assert_eq!(only_kana(&only_kana("食べ物")), "べ");
        assert_eq!(only_kana(""), "");
        assert_eq!(kanji_core(""), "");
    }

    #[test]
    fn headword_classes() {
        assert_eq!(HeadwordClass::of("予想"), HeadwordClass::Kanji);
        assert_eq!(HeadwordClass::of("やっぱり"), HeadwordClass::Kana);
        assert_eq!(HeadwordClass::of("聞く"), HeadwordClass::Mixed);
        assert_eq!(HeadwordClass::of("OK"), HeadwordClass::Other);
        assert!(HeadwordClass::Mixed.has_kanji());
        assert!(!HeadwordClass::Kana.has_kanji());
    }

    #[test]
    fn mask_and_japanese_len() {
        assert_eq!(script_mask("Tシャツ"), ScriptMask::KANA | ScriptMask::OTHER);
        assert_eq!(script_mask(""), ScriptMask::empty());
        assert_eq!(japanese_len("音楽を聞いていた。"), 8);
    }
}
