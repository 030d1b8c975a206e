//! # namebook - Proper-noun resolution for translated fiction
//!
//! namebook turns noisy, per-chunk name extractions from a Japanese novel
//! into a consistent registry of proper nouns: which surface forms refer to
//! the same person or place, what each one is, and which gender a character
//! carries. The registry feeds a translation step that keeps names stable
//! across a whole book.
//!
//! ## Core Concepts
//!
//! - **NameEntry**: A surface form with tag counts, aliases and ruby glosses
//! - **TagKind**: Normalized semantic tag (person, place, term, gender, role)
//! - **Registry**: Ordered map of entries threaded through every stage
//! - **RubyMap**: Furigana gloss → kanji headword pairs
//! - **NameConvention**: Accepted renderings of source names
//!
//! ## Usage
//!
//! ```rust
//! use namebook::extraction::InMemoryExtractionStore;
//! use namebook::{NamePipeline, PipelineConfig, RubyMap};
//!
//! let store = InMemoryExtractionStore::from_entries([
//!     ("小さなアツシは今日も元気に笑っていた。", "[{'name': 'アツシ', 'info': '人名，男性'}]"),
//! ]);
//! let config = PipelineConfig { count_floor: 0, ..PipelineConfig::default() };
//! let output = NamePipeline::new(config).run(&store, &RubyMap::new())?;
//!
//! let examples = namebook::find_example_sentences(output.registry.names(), ["小さなアツシは今日も元気に笑っていた。"]);
//! assert!(examples["アツシ"].is_found());
//! # Ok::<(), namebook::NamebookError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod entry;
pub mod error;
pub mod kana;
pub mod registry;
pub mod ruby;
pub mod sentence;
pub mod tag;

// Extraction, resolution and naming
pub mod extraction;
pub mod naming;
pub mod pipeline;

// Re-export primary types at crate root for convenience
pub use entry::{Gender, NameEntry};
pub use error::{ExtractionError, NamebookError, NamebookResult, ParseError, SegmentError};
pub use registry::{IntegrityViolation, Registry};
pub use ruby::RubyMap;
pub use tag::TagKind;

pub use naming::{NameConvention, NameRejection};
pub use pipeline::{
    find_example_sentences, ExampleSentence, FragmentGuard, GenderDecision, NamePipeline, PipelineConfig,
    PipelineOutput, PipelineReports,
};
