//! Stage 1: aggregate raw extraction records into a registry.

use tracing::{debug, info, warn};

use crate::extraction::{parse_mentions, ChunkKey, ExtractionStore, StorageError};
use crate::registry::Registry;
use crate::tag::parse_tag_list;

/// Counters from one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Records read.
    pub records: usize,
    /// Records skipped as unparsable.
    pub skipped: usize,
    /// Mentions applied to the registry.
    pub mentions: usize,
    /// Names whose person/place tags were collapsed.
    pub collapsed: Vec<String>,
}

/// Builds a registry from `(chunk, raw record)` pairs.
///
/// Unparsable records are logged and skipped. Blank names are ignored.
/// Entries holding both `PersonName` and `PlaceName` keep the stronger one.
pub fn aggregate_records<I, C, R>(records: I) -> (Registry, AggregateReport)
where
    I: IntoIterator<Item = (C, R)>,
    C: AsRef<str>,
    R: AsRef<str>,
{
    let mut registry = Registry::new();
    let mut report = AggregateReport::default();

    for (chunk, raw) in records {
        let chunk = chunk.as_ref();
        report.records += 1;
        let mentions = match parse_mentions(chunk, raw.as_ref()) {
            Ok(mentions) => mentions,
            Err(e) => {
                warn!(chunk = %ChunkKey::of(chunk), error = %e, "skipping unparsable extraction record");
                report.skipped += 1;
                continue;
            }
        };

        for mention in mentions {
            let name = mention.name.trim();
            if name.is_empty() {
                debug!(chunk = %mention.chunk, "skipping blank name");
                continue;
            }
            registry.observe(name, &parse_tag_list(&mention.info));
            report.mentions += 1;
        }
    }

    for entry in registry.iter_mut() {
        if let Some(dropped) = entry.collapse_entity_type() {
            debug!(name = %entry.surface, dropped = %dropped, "collapsed person/place tags");
            report.collapsed.push(entry.surface.clone());
        }
    }

    info!(
        records = report.records,
        skipped = report.skipped,
        mentions = report.mentions,
        names = registry.len(),
        "aggregation complete"
    );
    (registry, report)
}

/// Builds a registry from every record in `store`.
///
/// # Errors
/// Returns the store's error if its entries cannot be read.
pub fn aggregate_store(store: &dyn ExtractionStore) -> Result<(Registry, AggregateReport), StorageError> {
    Ok(aggregate_records(store.entries()?))
}
