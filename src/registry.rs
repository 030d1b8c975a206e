//! The name registry and its canonical artifact.
//!
//! The [`Registry`] is the explicit state threaded through every pipeline
//! stage. Keys are surface forms; iteration order is the surface order, so
//! every stage and the serialized artifact are deterministic.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entry::NameEntry;
use crate::error::{NamebookError, NamebookResult};
use crate::tag::TagKind;

/// One tag in the artifact: `{"tag": "人名", "count": 3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactTag {
    /// Canonical tag label.
    pub tag: String,
    /// Observation count.
    pub count: u64,
}

/// One name in the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Tag label to tag count.
    pub info: BTreeMap<String, ArtifactTag>,
    /// One-hop alias surfaces.
    pub alias: Vec<String>,
    /// Aggregated count.
    pub count: u64,
    /// Furigana glosses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ruby: Vec<String>,
}

impl From<&NameEntry> for ArtifactEntry {
    fn from(entry: &NameEntry) -> Self {
        let info = entry
            .tag_counts
            .iter()
            .map(|(tag, count)| {
                let label = tag.label().to_string();
                (
                    label.clone(),
                    ArtifactTag {
                        tag: label,
                        count: *count,
                    },
                )
            })
            .collect();
        Self {
            info,
            alias: entry.aliases.iter().cloned().collect(),
            count: entry.total_count,
            ruby: entry.ruby_forms.iter().cloned().collect(),
        }
    }
}

/// A referential-integrity problem found by [`Registry::check_integrity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// `from` lists `to` as an alias, but not the other way round.
    AsymmetricAlias {
        /// Entry holding the alias.
        from: String,
        /// Alias that does not point back.
        to: String,
    },
    /// `from` lists an alias that is not in the registry.
    DanglingAlias {
        /// Entry holding the alias.
        from: String,
        /// Missing alias.
        to: String,
    },
    /// An entry lists itself as an alias.
    SelfAlias {
        /// The entry.
        name: String,
    },
    /// An entry carries both `PersonName` and `PlaceName`.
    PersonAndPlace {
        /// The entry.
        name: String,
    },
}

/// Ordered map from surface form to [`NameEntry`].
///
/// # Examples
///
/// ```
/// use namebook::{Registry, TagKind};
///
/// let mut registry = Registry::new();
/// registry.observe("アツシ", &[TagKind::PersonName]);
/// registry.observe("アツシ", &[TagKind::PersonName, TagKind::Male]);
///
/// let entry = registry.get("アツシ").unwrap();
/// assert_eq!(entry.total_count, 2);
/// assert!(registry.check_integrity().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, NameEntry>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one mention of `name` with `tags`, creating the entry if needed.
    pub fn observe(&mut self, name: &str, tags: &[TagKind]) {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| NameEntry::new(name))
            .observe(tags);
    }

    /// Inserts or replaces an entry, keyed by its surface form.
    pub fn insert(&mut self, entry: NameEntry) -> Option<NameEntry> {
        self.entries.insert(entry.surface.clone(), entry)
    }

    /// Removes an entry.
    pub fn remove(&mut self, name: &str) -> Option<NameEntry> {
        self.entries.remove(name)
    }

    /// Entry for `name`, if registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NameEntry> {
        self.entries.get(name)
    }

    /// Mutable entry for `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut NameEntry> {
        self.entries.get_mut(name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in surface order.
    pub fn iter(&self) -> impl Iterator<Item = &NameEntry> {
        self.entries.values()
    }

    /// Iterates entries mutably in surface order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NameEntry> {
        self.entries.values_mut()
    }

    /// Surface forms in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Keeps only entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&NameEntry) -> bool) {
        self.entries.retain(|_, entry| keep(entry));
    }

    /// Checks alias symmetry, dangling and self aliases, and tag exclusivity.
    #[must_use]
    pub fn check_integrity(&self) -> Vec<IntegrityViolation> {
        let mut violations = Vec::new();
        for entry in self.entries.values() {
            if entry.is_person() && entry.has(&TagKind::PlaceName) {
                violations.push(IntegrityViolation::PersonAndPlace {
                    name: entry.surface.clone(),
                });
            }
            for alias in &entry.aliases {
                if *alias == entry.surface {
                    violations.push(IntegrityViolation::SelfAlias {
                        name: entry.surface.clone(),
                    });
                    continue;
                }
                match self.entries.get(alias) {
                    None => violations.push(IntegrityViolation::DanglingAlias {
                        from: entry.surface.clone(),
                        to: alias.clone(),
                    }),
                    Some(other) if !other.aliases.contains(&entry.surface) => {
                        violations.push(IntegrityViolation::AsymmetricAlias {
                            from: entry.surface.clone(),
                            to: alias.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        violations
    }

    /// Orders names so that each alias group is contiguous.
    ///
    /// Groups are walked breadth-first from their first name in surface
    /// order. Excluded names are skipped and not traversed through.
    #[must_use]
    pub fn query_order(&self, exclusions: &BTreeSet<String>) -> Vec<String> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut order = Vec::with_capacity(self.entries.len());

        for start in self.entries.keys() {
            if visited.contains(start.as_str()) || exclusions.contains(start) {
                continue;
            }
            visited.insert(start);
            let mut queue = VecDeque::from([start.as_str()]);
            while let Some(current) = queue.pop_front() {
                order.push(current.to_string());
                let Some(entry) = self.entries.get(current) else {
                    continue;
                };
                for alias in &entry.aliases {
                    if !self.entries.contains_key(alias)
                        || exclusions.contains(alias)
                        || visited.contains(alias.as_str())
                    {
                        continue;
                    }
                    visited.insert(alias);
                    queue.push_back(alias);
                }
            }
        }
        order
    }

    /// Builds the artifact view of every entry.
    #[must_use]
    pub fn to_artifact(&self) -> BTreeMap<String, ArtifactEntry> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), ArtifactEntry::from(entry)))
            .collect()
    }

    /// Serializes the canonical artifact: pretty, 4-space indent, UTF-8 unescaped.
    ///
    /// # Errors
    /// Returns `Serialization` if JSON encoding fails.
    pub fn to_artifact_json(&self) -> NamebookResult<String> {
        let artifact = self.to_artifact();
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        artifact.serialize(&mut ser)?;
        String::from_utf8(buf)
            .map_err(|e| NamebookError::Serialization(serde::ser::Error::custom(e)))
    }

    /// Rebuilds a registry from artifact JSON.
    ///
    /// # Errors
    /// Returns `Serialization` if the JSON does not match the artifact shape.
    pub fn from_artifact_json(json: &str) -> NamebookResult<Self> {
        let artifact: BTreeMap<String, ArtifactEntry> = serde_json::from_str(json)?;
        let entries = artifact
            .into_iter()
            .map(|(name, item)| {
                let entry = NameEntry {
                    surface: name.clone(),
                    tag_counts: item
                        .info
                        .into_values()
                        .map(|t| (TagKind::from(t.tag), t.count))
                        .collect(),
                    total_count: item.count,
                    aliases: item.alias.into_iter().collect(),
                    ruby_forms: item.ruby.into_iter().collect(),
                };
                (name, entry)
            })
            .collect();
        Ok(Self { entries })
    }

    /// Writes the artifact to `path`.
    ///
    /// # Errors
    /// Returns `Artifact` on I/O failure.
    pub fn write_artifact(&self, path: impl AsRef<Path>) -> NamebookResult<()> {
        let path = path.as_ref();
        let json = self.to_artifact_json()?;
        fs::write(path, json).map_err(|e| NamebookError::artifact(path, e))
    }

    /// Reads an artifact written by [`Registry::write_artifact`].
    ///
    /// # Errors
    /// Returns `Artifact` on I/O failure, `Serialization` on bad JSON.
    pub fn read_artifact(path: impl AsRef<Path>) -> NamebookResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| NamebookError::artifact(path, e))?;
        Self::from_artifact_json(&json)
    }
}

impl FromIterator<NameEntry> for Registry {
    fn from_iter<I: IntoIterator<Item = NameEntry>>(iter: I) -> Self {
        let mut registry = Self::new();
        for entry in iter {
            registry.insert(entry);
        }
        registry
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a NameEntry;
    type IntoIter = std::collections::btree_map::Values<'a, String, NameEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked(a: &str, b: &str) -> (NameEntry, NameEntry) {
        let mut left = NameEntry::new(a).with_total(1);
        let mut right = NameEntry::new(b).with_total(1);
        left.aliases.insert(b.to_string());
        right.aliases.insert(a.to_string());
        (left, right)
    }

    #[test]
    fn integrity_detects_asymmetry_and_dangling() {
        let mut a = NameEntry::new("アツシ");
        a.aliases.insert("アツシさん".to_string());
        a.aliases.insert("消えた名".to_string());
        let b = NameEntry::new("アツシさん");
        let registry: Registry = [a, b].into_iter().collect();

        let violations = registry.check_integrity();
        assert!(violations.contains(&IntegrityViolation::AsymmetricAlias {
            from: "アツシ".to_string(),
            to: "アツシさん".to_string(),
        }));
        assert!(violations.contains(&IntegrityViolation::DanglingAlias {
            from: "アツシ".to_string(),
            to: "消えた名".to_string(),
        }));
    }

    #[test]
    fn integrity_detects_person_and_place() {
        let entry = NameEntry::new("ルミナ")
            .with_tag(TagKind::PersonName, 1)
            .with_tag(TagKind::PlaceName, 1);
        let registry: Registry = [entry].into_iter().collect();
        assert_eq!(
            registry.check_integrity(),
            vec![IntegrityViolation::PersonAndPlace {
                name: "ルミナ".to_string()
            }]
        );
    }

    #[test]
    fn query_order_keeps_groups_together() {
        let (a, b) = linked("アツシ", "ゆうき");
        let lone = NameEntry::new("イリス");
        let registry: Registry = [a, b, lone].into_iter().collect();

        let order = registry.query_order(&BTreeSet::new());
        assert_eq!(order, vec!["ゆうき", "アツシ", "イリス"]);
    }

    #[test]
    fn query_order_skips_exclusions() {
        let (a, b) = linked("アツシ", "ゆうき");
        let registry: Registry = [a, b].into_iter().collect();
        let exclusions: BTreeSet<String> = ["アツシ".to_string()].into_iter().collect();
        assert_eq!(registry.query_order(&exclusions), vec!["ゆうき"]);
    }

    #[test]
    fn artifact_shape() {
        let mut entry = NameEntry::new("森")
            .with_tag(TagKind::PlaceName, 3)
            .with_total(7);
        entry.ruby_forms.insert("もり".to_string());
        let registry: Registry = [entry, NameEntry::new("湖")].into_iter().collect();

        let json = registry.to_artifact_json().unwrap();
        assert!(json.contains("\"森\""));
        assert!(json.contains("\"地名\""));
        assert!(json.contains("    \"森\": {"));
        assert!(json.contains("\"ruby\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["森"]["count"], 7);
        assert_eq!(value["森"]["info"]["地名"]["tag"], "地名");
        assert_eq!(value["森"]["info"]["地名"]["count"], 3);
        assert!(value["湖"].get("ruby").is_none());
    }

    #[test]
    fn artifact_parses_back() {
        let (a, b) = linked("アツシ", "アツシさん");
        let a = a.with_tag(TagKind::Male, 2);
        let registry: Registry = [a, b].into_iter().collect();
        let json = registry.to_artifact_json().unwrap();
        let parsed = Registry::from_artifact_json(&json).unwrap();
        assert_eq!(parsed, registry);
    }
}
