//! Semantic tags attached to names.
//!
//! Extraction output tags names with free-form strings such as `人名`,
//! `地名（王都）`, `男性`, `騎士`. Those strings are normalized onto a small
//! closed set so counts can be compared, with a catch-all for role tags.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kana;

const PERSON_LABEL: &str = "人名";
const PLACE_LABEL: &str = "地名";
const TERM_LABEL: &str = "術語";
const MALE_LABEL: &str = "男性";
const FEMALE_LABEL: &str = "女性";

/// Characters stripped from both ends of a raw tag token.
const TAG_NOISE: &[char] = &[
    '"', '\'', '「', '」', '『', '』', '[', ']', '(', ')', '（', '）', '【', '】', ':', '：', '、',
    '。', '.', '*', '-',
];

/// Tag pairs that may never be carried by two names joined as aliases.
pub const CONFLICTING_PAIRS: [(TagKind, TagKind); 2] = [
    (TagKind::PersonName, TagKind::PlaceName),
    (TagKind::Male, TagKind::Female),
];

/// A normalized semantic tag.
///
/// Serialized as its canonical label (`人名`, `地名`, `術語`, `男性`,
/// `女性`, or the free-form text for [`TagKind::Other`]).
///
/// # Examples
///
/// ```
/// use namebook::TagKind;
///
/// assert_eq!(TagKind::normalize(" 人名（主人公）"), Some(TagKind::PersonName));
/// assert_eq!(TagKind::normalize("性别：男"), Some(TagKind::PersonName));
/// assert_eq!(TagKind::normalize("魔法術語"), Some(TagKind::Term));
/// assert_eq!(TagKind::normalize("騎士"), Some(TagKind::Other("騎士".to_string())));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TagKind {
    /// A character or person name.
    PersonName,
    /// A geographic or fictional location.
    PlaceName,
    /// A glossary term.
    Term,
    /// Male gender marker.
    Male,
    /// Female gender marker.
    Female,
    /// Free-form role tag ("knight", "mage", ...).
    Other(String),
}

impl TagKind {
    /// Maps a raw tag token onto a [`TagKind`].
    ///
    /// Returns `None` for tokens that are empty after trimming or that
    /// contain Cyrillic artifacts.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let token = raw.trim().trim_matches(TAG_NOISE).trim();
        if token.is_empty() || kana::has_cyrillic(token) {
            return None;
        }

        if token.contains("性别") || token.contains("性別") {
            return Some(Self::PersonName);
        }
        if token.starts_with(PERSON_LABEL) {
            return Some(Self::PersonName);
        }
        if token.starts_with(PLACE_LABEL) {
            return Some(Self::PlaceName);
        }
        if ["術語", "术语"]
            .iter()
            .any(|t| token.starts_with(t) || token.ends_with(t))
        {
            return Some(Self::Term);
        }

        match token {
            "男性" | "男" => Some(Self::Male),
            "女性" | "女" => Some(Self::Female),
            other => Some(Self::Other(other.to_string())),
        }
    }

    /// Returns the canonical label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::PersonName => PERSON_LABEL,
            Self::PlaceName => PLACE_LABEL,
            Self::Term => TERM_LABEL,
            Self::Male => MALE_LABEL,
            Self::Female => FEMALE_LABEL,
            Self::Other(text) => text,
        }
    }

    /// Returns true for `Male` or `Female`.
    #[must_use]
    pub const fn is_gender(&self) -> bool {
        matches!(self, Self::Male | Self::Female)
    }

    /// Returns true for `PersonName` or `PlaceName`.
    #[must_use]
    pub const fn is_entity_type(&self) -> bool {
        matches!(self, Self::PersonName | Self::PlaceName)
    }

    /// Returns true if `self` and `other` form a conflicting pair.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        CONFLICTING_PAIRS
            .iter()
            .any(|(a, b)| (a == self && b == other) || (a == other && b == self))
    }
}

impl From<String> for TagKind {
    /// Parses a canonical label; unknown labels become [`TagKind::Other`].
    fn from(label: String) -> Self {
        match label.as_str() {
            PERSON_LABEL => Self::PersonName,
            PLACE_LABEL => Self::PlaceName,
            TERM_LABEL => Self::Term,
            MALE_LABEL => Self::Male,
            FEMALE_LABEL => Self::Female,
            _ => Self::Other(label),
        }
    }
}

impl From<TagKind> for String {
    fn from(tag: TagKind) -> Self {
        match tag {
            TagKind::Other(text) => text,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Splits a raw `info` string on `,` / `，` and normalizes each token.
///
/// Duplicate tags within one string are kept once.
#[must_use]
pub fn parse_tag_list(info: &str) -> Vec<TagKind> {
    let mut tags: Vec<TagKind> = Vec::new();
    for token in info.split([',', '，']) {
        if let Some(tag) = TagKind::normalize(token) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}
