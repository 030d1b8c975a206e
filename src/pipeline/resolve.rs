//! Stage 3: fill in missing gender from alias neighbors.
//!
//! Only person entries without any gender tag are candidates. A candidate
//! first looks at its direct aliases, then at their aliases. At each hop the
//! donor is the neighbor with the highest gender count whose tags do not
//! conflict with the candidate. The donor's full tag counts are merged in.
//! Donors are always read from the registry as it stood before this stage,
//! so one propagated gender never feeds another.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::config::PipelineConfig;
use crate::entry::{Gender, NameEntry};
use crate::registry::Registry;

/// Outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenderDecision {
    /// Tags were merged from `donor`, found `hops` steps away.
    Propagated {
        /// Surface form of the donor entry.
        donor: String,
        /// 1 for a direct alias, 2 for an alias of an alias.
        hops: u8,
    },

    /// No eligible donor.
    Unresolved,
}

/// Per-candidate outcomes of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Decision for every candidate, keyed by surface form.
    pub decisions: BTreeMap<String, GenderDecision>,
    /// Persons whose own gender tags are too close to call. Left as is.
    pub tied: Vec<String>,
}

impl ResolutionReport {
    /// Number of candidates that received a gender.
    #[must_use]
    pub fn propagated(&self) -> usize {
        self.decisions
            .values()
            .filter(|d| matches!(d, GenderDecision::Propagated { .. }))
            .count()
    }
}

/// Propagates gender tags in place.
pub fn resolve_genders(registry: &mut Registry, config: &PipelineConfig) -> ResolutionReport {
    let snapshot = registry.clone();
    let mut report = ResolutionReport::default();

    for entry in &snapshot {
        if !entry.is_person() {
            continue;
        }
        if entry.has_gender_tag() {
            if entry.gender_with_ratio(config.gender_tie_ratio) == Gender::Tied {
                report.tied.push(entry.surface.clone());
            }
            continue;
        }

        let decision = match find_donor(entry, &snapshot) {
            Some((donor, hops)) => {
                if let Some(target) = registry.get_mut(&entry.surface) {
                    target.merge_tags(&donor.tag_counts);
                }
                debug!(name = %entry.surface, donor = %donor.surface, hops, "propagated gender");
                GenderDecision::Propagated {
                    donor: donor.surface.clone(),
                    hops,
                }
            }
            None => GenderDecision::Unresolved,
        };
        report.decisions.insert(entry.surface.clone(), decision);
    }

    info!(
        candidates = report.decisions.len(),
        propagated = report.propagated(),
        tied = report.tied.len(),
        "gender resolution complete"
    );
    report
}

fn find_donor<'a>(entry: &'a NameEntry, snapshot: &'a Registry) -> Option<(&'a NameEntry, u8)> {
    let mut visited: BTreeSet<&str> = BTreeSet::from([entry.surface.as_str()]);

    if let Some(donor) = best_donor(entry, entry.aliases.iter(), snapshot, &mut visited) {
        return Some((donor, 1));
    }

    let second_hop: Vec<&String> = entry
        .aliases
        .iter()
        .filter_map(|alias| snapshot.get(alias))
        .flat_map(|neighbor| neighbor.aliases.iter())
        .collect();
    best_donor(entry, second_hop, snapshot, &mut visited).map(|donor| (donor, 2))
}

/// Highest gender count among unvisited, non-conflicting candidates.
/// Ties go to the earlier candidate.
fn best_donor<'a>(
    entry: &NameEntry,
    candidates: impl IntoIterator<Item = &'a String>,
    snapshot: &'a Registry,
    visited: &mut BTreeSet<&'a str>,
) -> Option<&'a NameEntry> {
    let mut best: Option<&NameEntry> = None;
    for name in candidates {
        if !visited.insert(name.as_str()) {
            continue;
        }
        let Some(candidate) = snapshot.get(name) else {
            continue;
        };
        let strength = candidate.gender_strength();
        if strength == 0 || entry.conflicts_with(candidate) {
            continue;
        }
        if best.map_or(true, |b| strength > b.gender_strength()) {
            best = Some(candidate);
        }
    }
    best
}
