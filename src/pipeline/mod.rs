//! Name resolution pipeline.
//!
//! Stage 1: Aggregate → Stage 2: Cluster → Stage 3: Resolve genders →
//! Stage 4: Prune. Example-sentence lookup runs separately over the final
//! name list.
//!
//! Each stage takes the [`Registry`] left by the previous one and returns a
//! report; nothing else is shared between stages.

pub mod aggregate;
pub mod cluster;
mod config;
pub mod example;
pub mod prune;
pub mod resolve;

use tracing::info;

use crate::error::NamebookResult;
use crate::extraction::ExtractionStore;
use crate::registry::Registry;
use crate::ruby::RubyMap;

pub use aggregate::AggregateReport;
pub use cluster::ClusterReport;
pub use config::{FragmentGuard, PipelineConfig};
pub use example::{find_example_sentence, find_example_sentences, ExampleSentence};
pub use prune::PruneReport;
pub use resolve::{GenderDecision, ResolutionReport};

/// Reports from every stage of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReports {
    /// Stage 1.
    pub aggregate: AggregateReport,
    /// Stage 2.
    pub cluster: ClusterReport,
    /// Stage 3.
    pub resolution: ResolutionReport,
    /// Stage 4.
    pub prune: PruneReport,
}

/// Final registry plus per-stage reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Pruned, alias-linked registry.
    pub registry: Registry,
    /// Per-stage reports.
    pub reports: PipelineReports,
}

/// Runs the four registry stages with one configuration.
///
/// # Examples
///
/// ```
/// use namebook::extraction::InMemoryExtractionStore;
/// use namebook::{NamePipeline, PipelineConfig, RubyMap};
///
/// let store = InMemoryExtractionStore::from_entries([
///     ("c1", "[{'name': 'アツシ', 'info': '人名，男性'}]"),
///     ("c2", "[{'name': 'アツシさん', 'info': '人名'}]"),
/// ]);
/// let config = PipelineConfig { count_floor: 1, ..PipelineConfig::default() };
///
/// let output = NamePipeline::new(config).run(&store, &RubyMap::new()).unwrap();
/// assert!(output.registry.get("アツシ").unwrap().aliases.contains("アツシさん"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NamePipeline {
    config: PipelineConfig,
}

impl NamePipeline {
    /// Creates a pipeline with `config`.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Aggregates every record in `store`, then clusters, resolves and prunes.
    ///
    /// Malformed records are skipped, never fatal.
    ///
    /// # Errors
    /// Returns `Storage` if the store cannot be read.
    pub fn run(&self, store: &dyn ExtractionStore, ruby: &RubyMap) -> NamebookResult<PipelineOutput> {
        let (registry, aggregate) = aggregate::aggregate_store(store)?;
        info!(names = registry.len(), "Stage 1: registry built");
        Ok(self.run_stages(registry, aggregate, ruby))
    }

    /// Runs stages 2 to 4 on an already aggregated registry.
    #[must_use]
    pub fn refine(&self, registry: Registry, ruby: &RubyMap) -> PipelineOutput {
        self.run_stages(registry, AggregateReport::default(), ruby)
    }

    fn run_stages(&self, mut registry: Registry, aggregate: AggregateReport, ruby: &RubyMap) -> PipelineOutput {
        let cluster = cluster::cluster(&mut registry, ruby, &self.config);
        info!(edges = cluster.edges, "Stage 2: aliases clustered");

        let resolution = resolve::resolve_genders(&mut registry, &self.config);
        info!(propagated = resolution.propagated(), "Stage 3: genders resolved");

        let prune = prune::prune(&mut registry, &self.config);
        info!(retained = prune.retained, removed = prune.removed.len(), "Stage 4: registry pruned");

        PipelineOutput {
            registry,
            reports: PipelineReports {
                aggregate,
                cluster,
                resolution,
                prune,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NameEntry;
    use crate::extraction::InMemoryExtractionStore;
    use crate::tag::TagKind;

    #[test]
    fn empty_store_gives_empty_registry() {
        let store = InMemoryExtractionStore::new();
        let output = NamePipeline::default().run(&store, &RubyMap::new()).unwrap();
        assert!(output.registry.is_empty());
        assert_eq!(output.reports.prune.retained, 0);
    }

    #[test]
    fn refine_links_resolves_and_prunes() {
        let ren = NameEntry::new("レン")
            .with_tag(TagKind::PersonName, 6)
            .with_total(6);
        let sensei = NameEntry::new("レン先生")
            .with_tag(TagKind::PersonName, 5)
            .with_tag(TagKind::Male, 5)
            .with_total(5);
        let stray = NameEntry::new("イリス").with_total(1);
        let registry: Registry = [ren, sensei, stray].into_iter().collect();

        let output = NamePipeline::default().refine(registry, &RubyMap::new());
        let ren = output.registry.get("レン").unwrap();
        assert_eq!(ren.total_count, 11);
        assert_eq!(ren.count(&TagKind::Male), 5);
        assert!(!output.registry.contains("イリス"));
        assert_eq!(output.reports.resolution.propagated(), 1);
        assert!(output.registry.check_integrity().is_empty());
    }
}
