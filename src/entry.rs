//! The per-name record accumulated by the pipeline.
//!
//! A [`NameEntry`] is keyed by its exact surface form. It is created on the
//! first observation, grows additively during aggregation, receives its alias
//! set once during clustering, may gain merged tags during gender
//! propagation, and is immutable once it survives pruning.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::tag::TagKind;

/// Male/Female count ratio bounds treated as a tie.
pub const DEFAULT_GENDER_TIE_RATIO: (f64, f64) = (0.9, 1.1);

/// Gender carried by an entry's tag counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male only, or Male by a clear majority.
    Male,
    /// Female only, or Female by a clear majority.
    Female,
    /// Both present with counts too close to call.
    Tied,
    /// No gender tag.
    Unknown,
}

impl Gender {
    /// Returns true for `Male` or `Female`.
    #[must_use]
    pub const fn is_definite(self) -> bool {
        matches!(self, Self::Male | Self::Female)
    }
}

/// A proper noun and everything observed about it.
///
/// # Examples
///
/// ```
/// use namebook::{NameEntry, TagKind};
///
/// let mut entry = NameEntry::new("アツシ");
/// entry.observe(&[TagKind::PersonName, TagKind::Male]);
/// entry.observe(&[TagKind::PersonName]);
///
/// assert_eq!(entry.total_count, 2);
/// assert_eq!(entry.count(&TagKind::PersonName), 2);
/// assert!(entry.aliases.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    /// Exact Japanese text as observed. Unique within a registry.
    pub surface: String,

    /// Every normalized tag seen for this surface form, with its count.
    pub tag_counts: BTreeMap<TagKind, u64>,

    /// Observation count; after clustering, own count plus one-hop neighbors.
    pub total_count: u64,

    /// Directly connected alias surfaces. Never contains `surface` itself.
    pub aliases: BTreeSet<String>,

    /// Furigana glosses linked through the ruby map.
    pub ruby_forms: BTreeSet<String>,
}

impl NameEntry {
    /// Creates an empty entry for `surface`.
    #[must_use]
    pub fn new(surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            tag_counts: BTreeMap::new(),
            total_count: 0,
            aliases: BTreeSet::new(),
            ruby_forms: BTreeSet::new(),
        }
    }

    /// Builder-style helper that sets a tag count.
    #[must_use]
    pub fn with_tag(mut self, tag: TagKind, count: u64) -> Self {
        self.tag_counts.insert(tag, count);
        self
    }

    /// Builder-style helper that sets the observation count.
    #[must_use]
    pub fn with_total(mut self, total_count: u64) -> Self {
        self.total_count = total_count;
        self
    }

    /// Records one mention carrying `tags`.
    pub fn observe(&mut self, tags: &[TagKind]) {
        self.total_count += 1;
        for tag in tags {
            *self.tag_counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    /// Returns the count for `tag` (zero if absent).
    #[must_use]
    pub fn count(&self, tag: &TagKind) -> u64 {
        self.tag_counts.get(tag).copied().unwrap_or(0)
    }

    /// Returns true if `tag` has been seen at least once.
    #[must_use]
    pub fn has(&self, tag: &TagKind) -> bool {
        self.count(tag) > 0
    }

    /// Returns true if tagged as a person.
    #[must_use]
    pub fn is_person(&self) -> bool {
        self.has(&TagKind::PersonName)
    }

    /// Returns true if either gender tag is present.
    #[must_use]
    pub fn has_gender_tag(&self) -> bool {
        self.has(&TagKind::Male) || self.has(&TagKind::Female)
    }

    /// Highest of the Male and Female counts.
    #[must_use]
    pub fn gender_strength(&self) -> u64 {
        self.count(&TagKind::Male).max(self.count(&TagKind::Female))
    }

    /// Classifies the gender tags using the default tie ratio.
    #[must_use]
    pub fn gender(&self) -> Gender {
        self.gender_with_ratio(DEFAULT_GENDER_TIE_RATIO)
    }

    /// Classifies the gender tags; `Male / Female` inside `tie_ratio` is a tie.
    #[must_use]
    pub fn gender_with_ratio(&self, tie_ratio: (f64, f64)) -> Gender {
        let male = self.count(&TagKind::Male);
        let female = self.count(&TagKind::Female);
        match (male, female) {
            (0, 0) => Gender::Unknown,
            (_, 0) => Gender::Male,
            (0, _) => Gender::Female,
            (m, f) => {
                #[allow(clippy::cast_precision_loss)]
                let ratio = m as f64 / f as f64;
                if (tie_ratio.0..=tie_ratio.1).contains(&ratio) {
                    Gender::Tied
                } else if m > f {
                    Gender::Male
                } else {
                    Gender::Female
                }
            }
        }
    }

    /// Returns true if any tag of `self` conflicts with any tag of `other`.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        tags_conflict(&self.tag_counts, &other.tag_counts)
    }

    /// Adds every count of `donor` into this entry's tag counts.
    pub fn merge_tags(&mut self, donor: &BTreeMap<TagKind, u64>) {
        for (tag, count) in donor {
            *self.tag_counts.entry(tag.clone()).or_insert(0) += count;
        }
    }

    /// Keeps only the stronger of `PersonName` / `PlaceName`.
    ///
    /// Ties keep `PlaceName`. Returns the dropped tag, if any.
    pub fn collapse_entity_type(&mut self) -> Option<TagKind> {
        let person = self.count(&TagKind::PersonName);
        let place = self.count(&TagKind::PlaceName);
        if person == 0 || place == 0 {
            return None;
        }
        let loser = if person > place {
            TagKind::PlaceName
        } else {
            TagKind::PersonName
        };
        self.tag_counts.remove(&loser);
        Some(loser)
    }

    /// Descriptive tags for a translation prompt.
    ///
    /// `PersonName` and `Term` are omitted, a gender tie drops both gender
    /// tags, a clear majority drops the minority one. Sorted by count
    /// descending, then by tag.
    #[must_use]
    pub fn context_tags(&self, limit: usize) -> Vec<TagKind> {
        let gender = self.gender();
        let mut tags: Vec<(&TagKind, u64)> = self
            .tag_counts
            .iter()
            .filter(|(tag, _)| !matches!(tag, TagKind::PersonName | TagKind::Term))
            .filter(|(tag, _)| match (tag, gender) {
                (TagKind::Male, Gender::Male) | (TagKind::Female, Gender::Female) => true,
                (TagKind::Male | TagKind::Female, _) => false,
                _ => true,
            })
            .map(|(tag, count)| (tag, *count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tags.into_iter().take(limit).map(|(tag, _)| tag.clone()).collect()
    }
}

/// Returns true if the two tag sets contain a conflicting pair.
#[must_use]
pub fn tags_conflict(a: &BTreeMap<TagKind, u64>, b: &BTreeMap<TagKind, u64>) -> bool {
    a.iter()
        .filter(|(_, count)| **count > 0)
        .any(|(left, _)| {
            b.iter()
                .filter(|(_, count)| **count > 0)
                .any(|(right, _)| left.conflicts_with(right))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn other(s: &str) -> TagKind {
        TagKind::Other(s.to_string())
    }

    #[test]
    fn observe_accumulates() {
        let mut entry = NameEntry::new("レン");
        entry.observe(&[TagKind::PersonName, TagKind::Male]);
        entry.observe(&[TagKind::PersonName, other("剣士")]);
        assert_eq!(entry.total_count, 2);
        assert_eq!(entry.count(&TagKind::PersonName), 2);
        assert_eq!(entry.count(&TagKind::Male), 1);
        assert_eq!(entry.count(&TagKind::Female), 0);
    }

    #[test]
    fn gender_tie_ratio() {
        let tied = NameEntry::new("a")
            .with_tag(TagKind::Male, 10)
            .with_tag(TagKind::Female, 11);
        assert_eq!(tied.gender(), Gender::Tied);

        let male = NameEntry::new("b")
            .with_tag(TagKind::Male, 20)
            .with_tag(TagKind::Female, 3);
        assert_eq!(male.gender(), Gender::Male);

        let female = NameEntry::new("c").with_tag(TagKind::Female, 1);
        assert_eq!(female.gender(), Gender::Female);
        assert_eq!(NameEntry::new("d").gender(), Gender::Unknown);
    }

    #[test]
    fn collapse_keeps_stronger_type() {
        let mut entry = NameEntry::new("ルミナ")
            .with_tag(TagKind::PersonName, 4)
            .with_tag(TagKind::PlaceName, 1)
            .with_tag(TagKind::Female, 2);
        assert_eq!(entry.collapse_entity_type(), Some(TagKind::PlaceName));
        assert!(entry.is_person());
        assert!(!entry.has(&TagKind::PlaceName));
        assert_eq!(entry.count(&TagKind::Female), 2);
    }

    #[test]
    fn collapse_tie_prefers_place() {
        let mut entry = NameEntry::new("アルス")
            .with_tag(TagKind::PersonName, 2)
            .with_tag(TagKind::PlaceName, 2);
        assert_eq!(entry.collapse_entity_type(), Some(TagKind::PersonName));
        assert!(entry.has(&TagKind::PlaceName));
    }

    #[test]
    fn conflicts_both_directions() {
        let person = NameEntry::new("a").with_tag(TagKind::PersonName, 1);
        let place = NameEntry::new("b").with_tag(TagKind::PlaceName, 1);
        let male = NameEntry::new("c").with_tag(TagKind::Male, 1);
        assert!(person.conflicts_with(&place));
        assert!(place.conflicts_with(&person));
        assert!(!person.conflicts_with(&male));
    }

    #[test]
    fn merge_is_additive() {
        let mut entry = NameEntry::new("レン").with_tag(TagKind::PersonName, 3);
        let donor = NameEntry::new("レン先生")
            .with_tag(TagKind::PersonName, 1)
            .with_tag(TagKind::Male, 5);
        entry.merge_tags(&donor.tag_counts);
        assert_eq!(entry.count(&TagKind::PersonName), 4);
        assert_eq!(entry.count(&TagKind::Male), 5);
        assert_eq!(donor.count(&TagKind::PersonName), 1);
    }

    #[test]
    fn context_tags_drop_tied_gender() {
        let entry = NameEntry::new("ユキ")
            .with_tag(TagKind::PersonName, 9)
            .with_tag(TagKind::Male, 10)
            .with_tag(TagKind::Female, 10)
            .with_tag(other("魔術師"), 4)
            .with_tag(other("王女"), 6);
        assert_eq!(entry.context_tags(5), vec![other("王女"), other("魔術師")]);
        assert_eq!(entry.context_tags(1), vec![other("王女")]);
    }

    #[test]
    fn context_tags_keep_majority_gender() {
        let entry = NameEntry::new("ユキ")
            .with_tag(TagKind::Male, 1)
            .with_tag(TagKind::Female, 8);
        assert_eq!(entry.context_tags(5), vec![TagKind::Female]);
    }
}
