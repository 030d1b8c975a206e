//! Extraction layer: raw records, their store, and the pool that fills it.
//!
//! Extraction itself (prompting a model over a text chunk) happens outside
//! this crate behind the [`Extractor`] trait.

mod pool;
mod record;
mod store;

pub use pool::{ChunkOutcome, ExtractionPool, ExtractionPoolConfig, ExtractionSummary, Extractor};
pub use record::{parse_mentions, parse_record, MentionRecord};
pub use store::{ChunkKey, ExtractionStore, InMemoryExtractionStore, StorageError};
