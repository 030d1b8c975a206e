//! Furigana gloss maps.
//!
//! A ruby map records `gloss → headword`, e.g. `"にかいどう" → "二階堂"`.
//! The clusterer consumes it reversed (`headword → [gloss]`). A missing or
//! empty map is valid and simply contributes no aliases.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{NamebookError, NamebookResult, ParseError};
use crate::kana;

fn per_char_ruby_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:[\x{4E00}-\x{9FFF}][（(][\x{3040}-\x{309F}\x{30A0}-\x{30FA}\x{30FC}-\x{30FF}]+[）)])+")
            .expect("static regex is valid")
    })
}

fn per_char_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([\x{4E00}-\x{9FFF}])[（(]([\x{3040}-\x{309F}\x{30A0}-\x{30FA}\x{30FC}-\x{30FF}]+)[）)]")
            .expect("static regex is valid")
    })
}

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r",\s*\}").expect("static regex is valid")
    })
}

/// Map from furigana gloss to its kanji headword.
///
/// # Examples
///
/// ```
/// use namebook::RubyMap;
///
/// let ruby = RubyMap::from_json(r#"{"もり": "森", "にかいどう": "二階堂"}"#).unwrap();
/// assert_eq!(ruby.reversed()["森"], vec!["もり".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RubyMap {
    glosses: BTreeMap<String, String>,
}

impl RubyMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(gloss, headword)` pairs.
    pub fn from_pairs<G, H>(pairs: impl IntoIterator<Item = (G, H)>) -> Self
    where
        G: Into<String>,
        H: Into<String>,
    {
        Self {
            glosses: pairs
                .into_iter()
                .map(|(g, h)| (g.into(), h.into()))
                .collect(),
        }
    }

    /// Parses a strict JSON object. Blank input is an empty map.
    ///
    /// # Errors
    /// Returns `MalformedJson` if the input is not a string-to-string object.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        if json.trim().is_empty() {
            return Ok(Self::new());
        }
        let glosses: BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { glosses })
    }

    /// Parses model-written JSON.
    ///
    /// Strips `#` and `//` comments, takes the outermost `{...}`, turns
    /// single quotes into double quotes, drops trailing commas, and keeps only
    /// `"key": "value"` pieces with exactly four quotes.
    ///
    /// # Errors
    /// Returns `MissingBody` if no object is present, `MalformedJson` if the
    /// cleaned text still fails to parse.
    pub fn from_json_lenient(text: &str) -> Result<Self, ParseError> {
        let uncommented: String = text
            .lines()
            .map(|line| {
                let line = line.find('#').map_or(line, |i| &line[..i]);
                line.find("//").map_or(line, |i| &line[..i])
            })
            .collect::<Vec<_>>()
            .join("\n");

        let (Some(start), Some(end)) = (uncommented.find('{'), uncommented.rfind('}')) else {
            return Err(ParseError::MissingBody { expected: "object" });
        };
        if end < start {
            return Err(ParseError::MissingBody { expected: "object" });
        }

        let body = uncommented[start..=end].replace('\'', "\"");
        let body = trailing_comma_re().replace_all(&body, "}");
        let inner = &body[1..body.len() - 1];
        let kept: Vec<&str> = inner
            .split(',')
            .filter(|piece| piece.matches('"').count() == 4)
            .collect();
        let cleaned = format!("{{{}}}", kept.join(","));
        let glosses: BTreeMap<String, String> = serde_json::from_str(&cleaned)?;
        Ok(Self { glosses })
    }

    /// Loads a ruby map artifact from disk. A missing file is an empty map.
    ///
    /// # Errors
    /// Returns `Artifact` on I/O failures other than not-found, and `Parse`
    /// if the file is not a valid object.
    pub fn load(path: impl AsRef<Path>) -> NamebookResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => Ok(Self::from_json(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "ruby map not found, using empty map");
                Ok(Self::new())
            }
            Err(e) => Err(NamebookError::artifact(path, e)),
        }
    }

    /// Discovers inline `headword（gloss）` annotations in running text.
    ///
    /// Per-character annotations such as `二（に）階（かい）` are first
    /// folded into `二階（にかい）`. A headword written in kana, or a gloss
    /// containing kanji, ends the scan for that headword. When two headwords
    /// share a gloss the longer headword wins.
    #[must_use]
    pub fn from_inline_text<'a>(headwords: impl IntoIterator<Item = &'a str>, text: &str) -> Self {
        let text = concat_kanji_ruby(text);
        let mut glosses: BTreeMap<String, String> = BTreeMap::new();

        for headword in headwords {
            if headword.is_empty() {
                continue;
            }
            let pattern = format!("{headword}（");
            let mut from = 0;
            while let Some(offset) = text[from..].find(&pattern) {
                let gloss_start = from + offset + pattern.len();
                let Some(close) = text[gloss_start..].find('）') else {
                    from = gloss_start;
                    continue;
                };
                let gloss = &text[gloss_start..gloss_start + close];
                if kana::has_kanji(gloss) || kana::has_kana(headword) {
                    break;
                }
                match glosses.get(gloss) {
                    Some(existing) if kana::char_len(existing) >= kana::char_len(headword) => {}
                    _ => {
                        glosses.insert(gloss.to_string(), headword.to_string());
                    }
                }
                from = gloss_start + close + '）'.len_utf8();
            }
        }
        Self { glosses }
    }

    /// Keeps only pairs whose gloss has kana and whose headword has none.
    pub fn retain_kana_glosses(&mut self) {
        self.glosses
            .retain(|gloss, headword| kana::has_kana(gloss) && !kana::has_kana(headword));
    }

    /// Drops excluded glosses.
    pub fn exclude(&mut self, exclusions: &BTreeSet<String>) {
        self.glosses.retain(|gloss, _| {
            let keep = !exclusions.contains(gloss);
            if !keep {
                debug!(gloss = %gloss, "ruby gloss excluded");
            }
            keep
        });
    }

    /// Adds or replaces one pair.
    pub fn insert(&mut self, gloss: impl Into<String>, headword: impl Into<String>) {
        self.glosses.insert(gloss.into(), headword.into());
    }

    /// Headword for a gloss.
    #[must_use]
    pub fn headword(&self, gloss: &str) -> Option<&str> {
        self.glosses.get(gloss).map(String::as_str)
    }

    /// Number of gloss pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glosses.len()
    }

    /// Returns true if the map holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glosses.is_empty()
    }

    /// Iterates `(gloss, headword)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.glosses.iter().map(|(g, h)| (g.as_str(), h.as_str()))
    }

    /// Inverts the map into `headword → [gloss]`, glosses in sorted order.
    #[must_use]
    pub fn reversed(&self) -> BTreeMap<String, Vec<String>> {
        let mut reversed: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (gloss, headword) in &self.glosses {
            if gloss == headword {
                warn!(gloss = %gloss, "ruby gloss equals its headword, ignoring");
                continue;
            }
            reversed
                .entry(headword.clone())
                .or_default()
                .push(gloss.clone());
        }
        reversed
    }
}

/// Folds per-character readings into one reading per run.
///
/// `二（に）階（かい）堂（どう）` becomes `二階堂（にかいどう）`.
#[must_use]
pub fn concat_kanji_ruby(text: &str) -> String {
    per_char_ruby_re()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let mut kanji = String::new();
            let mut reading = String::new();
            for pair in per_char_pair_re().captures_iter(&caps[0]) {
                kanji.push_str(&pair[1]);
                reading.push_str(&pair[2]);
            }
            format!("{kanji}（{reading}）")
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_map() {
        assert!(RubyMap::from_json("").unwrap().is_empty());
        assert!(RubyMap::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn reversed_groups_glosses() {
        let ruby = RubyMap::from_pairs([("あつし", "篤志"), ("アツシ", "篤志"), ("もり", "森")]);
        let reversed = ruby.reversed();
        assert_eq!(reversed["篤志"], vec!["あつし".to_string(), "アツシ".to_string()]);
        assert_eq!(reversed["森"], vec!["もり".to_string()]);
    }

    #[test]
    fn lenient_parse_recovers_model_output() {
        let text = "Here you go:\n{\n  'もり': '森', // forest\n  \"にかいどう\": \"二階堂\",\n  # note\n  broken,\n}";
        let ruby = RubyMap::from_json_lenient(text).unwrap();
        assert_eq!(ruby.headword("もり"), Some("森"));
        assert_eq!(ruby.headword("にかいどう"), Some("二階堂"));
        assert_eq!(ruby.len(), 2);
    }

    #[test]
    fn lenient_parse_without_object_fails() {
        assert!(matches!(
            RubyMap::from_json_lenient("no json here"),
            Err(ParseError::MissingBody { .. })
        ));
    }

    #[test]
    fn retain_kana_glosses_filters_pairs() {
        let mut ruby = RubyMap::from_pairs([("もり", "森"), ("森林", "森"), ("ゆき", "ユキ")]);
        ruby.retain_kana_glosses();
        assert_eq!(ruby.len(), 1);
        assert_eq!(ruby.headword("もり"), Some("森"));
    }

    #[test]
    fn concat_per_char_readings() {
        assert_eq!(
            concat_kanji_ruby("二（に）階（かい）堂（どう）亞（あ）子（こ）は笑った"),
            "二階堂亞子（にかいどうあこ）は笑った"
        );
    }

    #[test]
    fn inline_discovery() {
        let text = "二（に）階（かい）堂（どう）が来た。森（もり）の奥。森（しんりん）へ。";
        let ruby = RubyMap::from_inline_text(["二階堂", "森"], text);
        assert_eq!(ruby.headword("にかいどう"), Some("二階堂"));
        assert_eq!(ruby.headword("もり"), Some("森"));
        assert_eq!(ruby.headword("しんりん"), Some("森"));
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ruby = RubyMap::load(dir.path().join("ruby.json")).unwrap();
        assert!(ruby.is_empty());
    }
}
