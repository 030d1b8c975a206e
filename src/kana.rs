//! Script classification for Japanese surface forms.
//!
//! Ranges follow the Unicode Hiragana (U+3040..U+309F) and Katakana
//! (U+30A0..U+30FF) blocks. The katakana used for kana detection stops short
//! of U+30FB (the middle dot separator), which is punctuation in names.

/// Distance between a hiragana code point and its katakana counterpart.
const KANA_GAP: u32 = 0x30A0 - 0x3040;

/// Hiragana letters that have a katakana twin, `ぁ` through `ゖ`.
const TOGGLE_HIRAGANA: std::ops::RangeInclusive<char> = '\u{3041}'..='\u{3096}';

/// Katakana letters that have a hiragana twin, `ァ` through `ヶ`.
const TOGGLE_KATAKANA: std::ops::RangeInclusive<char> = '\u{30A1}'..='\u{30F6}';

/// Returns true for code points in the Hiragana block.
#[must_use]
pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

/// Returns true for code points in the Katakana block.
#[must_use]
pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

/// Returns true if `c` counts as kana for name heuristics.
///
/// The middle dot `・` (U+30FB) is excluded; the prolonged sound mark `ー`
/// and iteration marks are included.
#[must_use]
pub fn is_kana(c: char) -> bool {
    is_hiragana(c) || (is_katakana(c) && c != '\u{30FB}')
}

/// Returns true if `c` is a CJK unified ideograph.
#[must_use]
pub fn is_kanji(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Returns true if the text contains any kana.
#[must_use]
pub fn has_kana(text: &str) -> bool {
    text.chars().any(is_kana)
}

/// Returns true if the text contains any CJK ideograph.
#[must_use]
pub fn has_kanji(text: &str) -> bool {
    text.chars().any(is_kanji)
}

/// Returns true if the text contains Cyrillic letters.
///
/// `Д` alone is tolerated since it shows up in kaomoji.
#[must_use]
pub fn has_cyrillic(text: &str) -> bool {
    text.chars()
        .filter(|&c| c != 'Д')
        .any(|c| matches!(c, 'А'..='я' | 'ё' | 'Ё'))
}

/// Returns true for a one-character kana string such as a stray particle.
#[must_use]
pub fn is_single_kana_fragment(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_kana(c))
}

/// Swaps every hiragana letter for katakana and vice versa.
///
/// Only letters with a counterpart are swapped. Marks such as `ー`, `・`
/// and the iteration signs are kept, as is everything outside the blocks.
///
/// # Examples
///
/// ```
/// use namebook::kana::toggle_kana;
///
/// assert_eq!(toggle_kana("さくら"), "サクラ");
/// assert_eq!(toggle_kana("サクラ姫"), "さくら姫");
/// ```
#[must_use]
pub fn toggle_kana(text: &str) -> String {
    text.chars()
        .map(|c| {
            let code = u32::from(c);
            let toggled = if TOGGLE_HIRAGANA.contains(&c) {
                code + KANA_GAP
            } else if TOGGLE_KATAKANA.contains(&c) {
                code - KANA_GAP
            } else {
                code
            };
            char::from_u32(toggled).unwrap_or(c)
        })
        .collect()
}

/// Number of Unicode scalar values in `text`.
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
