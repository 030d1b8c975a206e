//! Cross-book naming convention.
//!
//! [`parse_name`] breaks a composite name into a tree of atoms, brackets
//! and separators; [`NameConvention`] validates proposed renderings against
//! that structure and accumulates the accepted ones.

mod convention;
mod segment;

pub use convention::{expand_repeaters, ConventionEntry, NameConvention, NameRejection, Registration};
pub use segment::{parse_name, BracketKind, NameNode};
