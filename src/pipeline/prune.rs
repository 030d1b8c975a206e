//! Stage 4: drop rarely seen, weakly connected names.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::config::PipelineConfig;
use crate::registry::Registry;

/// Result of a pruning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Surface forms removed, in order.
    pub removed: Vec<String>,
    /// Entries kept.
    pub retained: usize,
}

/// Keeps entries whose count is above `count_floor` or whose alias set is
/// larger than `min_alias_size`, then drops aliases that point at removed
/// entries.
pub fn prune(registry: &mut Registry, config: &PipelineConfig) -> PruneReport {
    let keep = |total: u64, aliases: usize| total > config.count_floor || aliases > config.min_alias_size;

    let removed: Vec<String> = registry
        .iter()
        .filter(|e| !keep(e.total_count, e.aliases.len()))
        .map(|e| e.surface.clone())
        .collect();
    registry.retain(|e| keep(e.total_count, e.aliases.len()));

    let survivors: BTreeSet<String> = registry.names().into_iter().collect();
    for entry in registry.iter_mut() {
        let before = entry.aliases.len();
        entry.aliases.retain(|alias| survivors.contains(alias));
        if entry.aliases.len() != before {
            debug!(name = %entry.surface, dropped = before - entry.aliases.len(), "dropped aliases to pruned names");
        }
    }

    let report = PruneReport {
        removed,
        retained: registry.len(),
    };
    info!(
        removed = report.removed.len(),
        retained = report.retained,
        "pruning complete"
    );
    report
}
