//! Stage 5: pick an example sentence for each name.
//!
//! The name is highlighted as `**name**` and the shortest highlighted
//! sentence at least `max(3 × name length, 20)` characters long wins.
//! Sentences that show the name as a parenthetical reading, `(name)`, are
//! never used, and neither are names with unbalanced parentheses.

use std::collections::BTreeMap;

use tracing::info;

use crate::kana::char_len;
use crate::sentence::segment_paragraphs;

/// Minimum highlighted length regardless of name length.
const MIN_EXAMPLE_CHARS: usize = 20;

/// The example chosen for one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleSentence {
    /// Shortest highlighted sentence meeting the length floor.
    Found(String),
    /// Every candidate was under the floor; the shortest one.
    Fallback(String),
    /// No usable sentence mentions the name.
    Missing,
}

impl ExampleSentence {
    /// The highlighted sentence, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Found(text) | Self::Fallback(text) => Some(text),
            Self::Missing => None,
        }
    }

    /// Returns true for `Found`.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Text for a prompt; `Missing` becomes a placeholder sentence.
    #[must_use]
    pub fn render(&self, name: &str) -> String {
        match self.text() {
            Some(text) => text.to_string(),
            None => format!("No example sentence for **{name}**."),
        }
    }
}

fn highlight_floor(name: &str) -> usize {
    (3 * char_len(name)).max(MIN_EXAMPLE_CHARS)
}

fn has_unbalanced_parens(name: &str) -> bool {
    name.contains('(') != name.contains(')')
}

fn keep_shortest(slot: &mut Option<(usize, String)>, len: usize, text: String) {
    if slot.as_ref().map_or(true, |(best, _)| len < *best) {
        *slot = Some((len, text));
    }
}

/// Chooses one example for `name` among `sentences`.
#[must_use]
pub fn find_example_sentence(name: &str, sentences: &[String]) -> ExampleSentence {
    if name.is_empty() || has_unbalanced_parens(name) {
        return ExampleSentence::Missing;
    }
    let floor = highlight_floor(name);
    let marked = format!("**{name}**");
    let reading = format!("({name})");

    let mut found: Option<(usize, String)> = None;
    let mut fallback: Option<(usize, String)> = None;
    for sentence in sentences {
        if !sentence.contains(name) || sentence.contains(&reading) {
            continue;
        }
        let highlighted = sentence.replace(name, &marked);
        let len = char_len(&highlighted);
        if len >= floor {
            keep_shortest(&mut found, len, highlighted);
        } else {
            keep_shortest(&mut fallback, len, highlighted);
        }
    }

    match (found, fallback) {
        (Some((_, text)), _) => ExampleSentence::Found(text),
        (None, Some((_, text))) => ExampleSentence::Fallback(text),
        (None, None) => ExampleSentence::Missing,
    }
}

/// Chooses an example for every name from the given paragraphs.
///
/// Paragraphs are segmented once. Every input name gets an entry.
pub fn find_example_sentences<N, I, P>(names: N, paragraphs: I) -> BTreeMap<String, ExampleSentence>
where
    N: IntoIterator,
    N::Item: AsRef<str>,
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    let sentences = segment_paragraphs(paragraphs);
    let examples: BTreeMap<String, ExampleSentence> = names
        .into_iter()
        .map(|name| {
            let name = name.as_ref();
            (name.to_string(), find_example_sentence(name, &sentences))
        })
        .collect();

    info!(
        names = examples.len(),
        sentences = sentences.len(),
        found = examples.values().filter(|e| e.is_found()).count(),
        "example sentence search complete"
    );
    examples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn shortest_above_floor_wins() {
        let pool = sentences(&[
            "アツシは森の奥深くにある古い神殿へと一人で向かっていった。",
            "小さなアツシは今日も元気に笑っていた。",
            "アツシ。",
        ]);
        assert_eq!(
            find_example_sentence("アツシ", &pool),
            ExampleSentence::Found("小さな**アツシ**は今日も元気に笑っていた。".to_string())
        );
    }

    #[test]
    fn falls_back_to_shortest_short_sentence() {
        let pool = sentences(&["レンが来た。", "レン。"]);
        assert_eq!(
            find_example_sentence("レン", &pool),
            ExampleSentence::Fallback("**レン**。".to_string())
        );
    }

    #[test]
    fn floor_scales_with_name_length() {
        assert_eq!(highlight_floor("アツシ"), 20);
        assert_eq!(highlight_floor("アレクサンドリアノ"), 27);
    }

    #[test]
    fn parenthetical_readings_skipped() {
        let pool = sentences(&["二階堂(にかいどう)は静かに扉を開けて部屋の中へと入った。"]);
        assert_eq!(find_example_sentence("にかいどう", &pool), ExampleSentence::Missing);
    }

    #[test]
    fn unbalanced_names_skipped() {
        let pool = sentences(&["王(都は遠い場所にあると誰もが口をそろえて言うのだった。"]);
        assert_eq!(find_example_sentence("王(都", &pool), ExampleSentence::Missing);
    }

    #[test]
    fn every_occurrence_highlighted() {
        let pool = sentences(&["ユキとユキは同じ名前の二人の少女で、いつも一緒に遊んでいた。"]);
        let example = find_example_sentence("ユキ", &pool);
        assert_eq!(example.text().map(|t| t.matches("**ユキ**").count()), Some(2));
    }

    #[test]
    fn missing_renders_placeholder() {
        let examples = find_example_sentences(["イリス"], ["アツシが来た。"]);
        let example = &examples["イリス"];
        assert_eq!(example, &ExampleSentence::Missing);
        assert_eq!(example.render("イリス"), "No example sentence for **イリス**.");
    }

    #[test]
    fn batch_covers_all_names() {
        let examples = find_example_sentences(
            ["アツシ", "レン"],
            ["小さなアツシは今日も元気に笑っていた。アツシ。", "レン。"],
        );
        assert_eq!(examples.len(), 2);
        assert!(examples["アツシ"].is_found());
        assert_eq!(examples["レン"], ExampleSentence::Fallback("**レン**。".to_string()));
    }
}
