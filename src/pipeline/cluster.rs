//! Stage 2: link surface variants of the same name.
//!
//! Two names are linked when neither is a single-kana fragment (per
//! [`FragmentGuard`]), their tags do not conflict, and one of these holds:
//! one contains the other, they differ only in hiragana/katakana script, or
//! one is a registered ruby gloss of the other. Edges are undirected and
//! recorded on both entries. After linking, each entry's count becomes its
//! own count plus the own counts of its direct neighbors.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::config::{FragmentGuard, PipelineConfig};
use crate::kana::{is_single_kana_fragment, toggle_kana};
use crate::registry::Registry;
use crate::ruby::RubyMap;

/// Counters from one clustering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterReport {
    /// Glosses added to the registry as copies of their headword.
    pub glosses_added: Vec<String>,
    /// Gloss/headword pairs whose tag counts were pooled.
    pub glosses_merged: usize,
    /// Undirected alias edges created.
    pub edges: usize,
}

/// Links aliases in place.
pub fn cluster(registry: &mut Registry, ruby: &RubyMap, config: &PipelineConfig) -> ClusterReport {
    let mut report = ClusterReport::default();
    let reversed = ruby.reversed();
    apply_ruby(registry, &reversed, &mut report);

    let gloss_pairs: BTreeSet<(&str, &str)> = reversed
        .iter()
        .flat_map(|(headword, glosses)| {
            glosses
                .iter()
                .flat_map(move |gloss| [(headword.as_str(), gloss.as_str()), (gloss.as_str(), headword.as_str())])
        })
        .collect();

    let edges = find_edges(registry, &gloss_pairs, config.fragment_guard);
    report.edges = edges.len();
    for (a, b) in edges {
        if let Some(entry) = registry.get_mut(&a) {
            entry.aliases.insert(b.clone());
        }
        if let Some(entry) = registry.get_mut(&b) {
            entry.aliases.insert(a);
        }
    }

    recompute_totals(registry);

    info!(
        edges = report.edges,
        glosses_added = report.glosses_added.len(),
        glosses_merged = report.glosses_merged,
        "clustering complete"
    );
    report
}

/// Pools tag evidence between registered headwords and their glosses.
///
/// A gloss missing from the registry is inserted as a copy of the headword.
/// A gloss already present exchanges tag counts with the headword, so both
/// end up with the pre-merge sum.
fn apply_ruby(registry: &mut Registry, reversed: &BTreeMap<String, Vec<String>>, report: &mut ClusterReport) {
    for (headword, glosses) in reversed {
        for gloss in glosses {
            let Some(head) = registry.get_mut(headword) else {
                break;
            };
            head.ruby_forms.insert(gloss.clone());
            let mut copy = head.clone();

            if let Some(existing) = registry.get_mut(gloss) {
                if existing.conflicts_with(&copy) {
                    debug!(gloss = %gloss, headword = %headword, "ruby pair has conflicting tags, not pooled");
                    continue;
                }
                let gloss_tags = existing.tag_counts.clone();
                existing.merge_tags(&copy.tag_counts);
                if let Some(head) = registry.get_mut(headword) {
                    head.merge_tags(&gloss_tags);
                }
                report.glosses_merged += 1;
                continue;
            }

            copy.surface.clone_from(gloss);
            copy.aliases.clear();
            copy.ruby_forms.clear();
            registry.insert(copy);
            debug!(gloss = %gloss, headword = %headword, "added ruby gloss as name");
            report.glosses_added.push(gloss.clone());
        }
    }
}

fn is_fragment_pair(a: &str, b: &str, guard: FragmentGuard) -> bool {
    match guard {
        FragmentGuard::Both => is_single_kana_fragment(a) && is_single_kana_fragment(b),
        FragmentGuard::Either => is_single_kana_fragment(a) || is_single_kana_fragment(b),
    }
}

fn find_edges(
    registry: &Registry,
    gloss_pairs: &BTreeSet<(&str, &str)>,
    guard: FragmentGuard,
) -> Vec<(String, String)> {
    let entries: Vec<_> = registry.iter().collect();
    let toggled: Vec<String> = entries.iter().map(|e| toggle_kana(&e.surface)).collect();
    let mut edges = Vec::new();

    for (i, left) in entries.iter().enumerate() {
        for right in &entries[i + 1..] {
            let (a, b) = (left.surface.as_str(), right.surface.as_str());
            if is_fragment_pair(a, b, guard) || left.conflicts_with(right) {
                continue;
            }
            let related = a.contains(b)
                || b.contains(a)
                || toggled[i] == b
                || gloss_pairs.contains(&(a, b));
            if related {
                edges.push((a.to_string(), b.to_string()));
            }
        }
    }
    edges
}

fn recompute_totals(registry: &mut Registry) {
    let own: BTreeMap<String, u64> = registry
        .iter()
        .map(|e| (e.surface.clone(), e.total_count))
        .collect();
    for entry in registry.iter_mut() {
        let neighbors: u64 = entry.aliases.iter().filter_map(|a| own.get(a)).sum();
        entry.total_count += neighbors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NameEntry;
    use crate::tag::TagKind;

    fn person(name: &str, total: u64) -> NameEntry {
        NameEntry::new(name)
            .with_tag(TagKind::PersonName, total)
            .with_total(total)
    }

    fn run(registry: &mut Registry) -> ClusterReport {
        cluster(registry, &RubyMap::new(), &PipelineConfig::default())
    }

    #[test]
    fn substring_links_and_sums() {
        let mut registry: Registry = [person("アツシ", 5), person("アツシさん", 3)].into_iter().collect();
        let report = run(&mut registry);
        assert_eq!(report.edges, 1);

        let base = registry.get("アツシ").unwrap();
        assert!(base.aliases.contains("アツシさん"));
        assert_eq!(base.total_count, 8);
        let honorific = registry.get("アツシさん").unwrap();
        assert!(honorific.aliases.contains("アツシ"));
        assert_eq!(honorific.total_count, 8);
    }

    #[test]
    fn script_variants_link() {
        let mut registry: Registry = [person("さくら", 2), person("サクラ", 4)].into_iter().collect();
        run(&mut registry);
        assert!(registry.get("さくら").unwrap().aliases.contains("サクラ"));
        assert!(registry.get("サクラ").unwrap().aliases.contains("さくら"));
    }

    #[test]
    fn script_variants_with_long_vowel_link() {
        let mut registry: Registry = [person("るーく", 1), person("ルーク", 3)].into_iter().collect();
        run(&mut registry);
        assert!(registry.get("ルーク").unwrap().aliases.contains("るーく"));
    }

    #[test]
    fn conflicting_tags_block_edges() {
        let place = NameEntry::new("アツシ村")
            .with_tag(TagKind::PlaceName, 2)
            .with_total(2);
        let mut registry: Registry = [person("アツシ", 5), place].into_iter().collect();
        run(&mut registry);
        assert!(registry.get("アツシ").unwrap().aliases.is_empty());
        assert_eq!(registry.get("アツシ").unwrap().total_count, 5);
    }

    #[test]
    fn opposite_genders_block_edges() {
        let male = person("ユキ", 2).with_tag(TagKind::Male, 2);
        let female = person("ユキ姫", 2).with_tag(TagKind::Female, 2);
        let mut registry: Registry = [male, female].into_iter().collect();
        run(&mut registry);
        assert!(registry.get("ユキ").unwrap().aliases.is_empty());
    }

    #[test]
    fn fragment_guard_modes() {
        let build = || -> Registry { [person("ア", 1), person("アリス", 1), person("あ", 1)].into_iter().collect() };

        let mut both = build();
        run(&mut both);
        assert!(both.get("ア").unwrap().aliases.contains("アリス"));
        assert!(!both.get("ア").unwrap().aliases.contains("あ"));

        let mut either = build();
        let config = PipelineConfig {
            fragment_guard: FragmentGuard::Either,
            ..PipelineConfig::default()
        };
        cluster(&mut either, &RubyMap::new(), &config);
        assert!(either.get("ア").unwrap().aliases.is_empty());
    }

    #[test]
    fn ruby_gloss_added_and_linked() {
        let mut registry: Registry = [person("二階堂", 4)].into_iter().collect();
        let ruby = RubyMap::from_pairs([("にかいどう", "二階堂")]);
        let report = cluster(&mut registry, &ruby, &PipelineConfig::default());

        assert_eq!(report.glosses_added, vec!["にかいどう".to_string()]);
        let gloss = registry.get("にかいどう").unwrap();
        assert!(gloss.aliases.contains("二階堂"));
        assert_eq!(gloss.count(&TagKind::PersonName), 4);
        let head = registry.get("二階堂").unwrap();
        assert!(head.ruby_forms.contains("にかいどう"));
        assert_eq!(head.total_count, 8);
    }

    #[test]
    fn ruby_gloss_present_pools_counts() {
        let head = person("森", 2).with_tag(TagKind::Male, 1);
        let gloss = person("もり", 3);
        let mut registry: Registry = [head, gloss].into_iter().collect();
        let ruby = RubyMap::from_pairs([("もり", "森")]);
        let report = cluster(&mut registry, &ruby, &PipelineConfig::default());

        assert_eq!(report.glosses_merged, 1);
        for name in ["森", "もり"] {
            let entry = registry.get(name).unwrap();
            assert_eq!(entry.count(&TagKind::PersonName), 5);
            assert_eq!(entry.count(&TagKind::Male), 1);
        }
        assert!(registry.get("森").unwrap().aliases.contains("もり"));
    }

    #[test]
    fn ruby_pair_with_conflicting_tags_not_pooled() {
        let head = person("森", 2);
        let gloss = NameEntry::new("もり")
            .with_tag(TagKind::PlaceName, 3)
            .with_total(3);
        let mut registry: Registry = [head, gloss].into_iter().collect();
        let ruby = RubyMap::from_pairs([("もり", "森")]);
        let report = cluster(&mut registry, &ruby, &PipelineConfig::default());

        assert_eq!(report.glosses_merged, 0);
        assert_eq!(report.edges, 0);
        assert!(!registry.get("森").unwrap().has(&TagKind::PlaceName));
        assert!(registry.check_integrity().is_empty());
    }

    #[test]
    fn ruby_for_unknown_headword_is_ignored() {
        let mut registry: Registry = [person("アツシ", 1)].into_iter().collect();
        let ruby = RubyMap::from_pairs([("もり", "森")]);
        cluster(&mut registry, &ruby, &PipelineConfig::default());
        assert!(!registry.contains("もり"));
    }

    #[test]
    fn result_is_symmetric() {
        let mut registry: Registry = [
            person("アツシ", 5),
            person("アツシさん", 3),
            person("あつし", 1),
            person("レン", 2),
        ]
        .into_iter()
        .collect();
        run(&mut registry);
        assert!(registry.check_integrity().is_empty());
    }
}
