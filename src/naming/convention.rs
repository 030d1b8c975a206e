//! Accumulated naming convention: source name → rendered name.
//!
//! Renderings are proposed one at a time alongside the text they came from
//! and either merged or rejected. Accepted names gain weight each time they
//! are proposed again, kana names counting more than kanji ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::segment::parse_name;
use crate::error::SegmentError;
use crate::kana::{char_len, has_kana};

const KANA_WEIGHT: u64 = 10;
const KANJI_WEIGHT: u64 = 1;
const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 10;
const PREFIX_COLLAPSE_ABOVE: usize = 3;

/// `(source suffix, rendered suffixes)` pairs stripped together.
const HONORIFICS: [(&str, &[&str]); 3] = [
    ("さん", &["先生", "小姐"]),
    ("先生", &["老师"]),
    ("くん", &["君"]),
];

/// Why a proposed rendering was not merged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameRejection {
    #[error("'{name}' does not occur in the context text")]
    NotInText { name: String },

    #[error("'{name}' and '{rendered}' differ in length")]
    LengthMismatch { name: String, rendered: String },

    #[error("'{name}' and '{rendered}' share no character position")]
    NoSharedCharacter { name: String, rendered: String },

    #[error("'{name}' contains a full-width parenthesis")]
    FullWidthParenthesis { name: String },

    #[error("rendering '{rendered}' of new name '{name}' contains kana")]
    KanaInRendering { name: String, rendered: String },

    #[error("'{name}' and '{rendered}' are structured differently")]
    ShapeMismatch { name: String, rendered: String },

    #[error("'{name}' is shorter than 2 characters")]
    TooShort { name: String },

    #[error("'{name}' or '{rendered}' is longer than 10 characters")]
    TooLong { name: String, rendered: String },

    #[error("'{name}' is rendered unchanged")]
    Unchanged { name: String },

    #[error("Malformed name: {0}")]
    Segment(#[from] SegmentError),
}

/// One accepted rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionEntry {
    /// Rendered name.
    pub rendered: String,
    /// Accumulated evidence.
    pub weight: u64,
}

/// Result of one [`NameConvention::register`] call for a composite name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Source atoms merged into the convention.
    pub accepted: Vec<String>,
    /// Atoms that failed validation.
    pub rejected: Vec<NameRejection>,
}

impl Registration {
    /// Returns true if at least one atom was merged.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !self.accepted.is_empty()
    }
}

/// Map from source name to its accepted rendering.
///
/// # Examples
///
/// ```
/// use namebook::naming::NameConvention;
///
/// let mut convention = NameConvention::new();
/// let text = "アツシは森へ向かった。";
/// let outcome = convention.register("アツシ", "阿辛", text).unwrap();
/// assert!(outcome.is_accepted());
/// assert_eq!(convention.get("アツシ").unwrap().weight, 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameConvention {
    entries: BTreeMap<String, ConventionEntry>,
}

/// Expands the `々` repeater into the preceding character.
#[must_use]
pub fn expand_repeaters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev = None;
    for c in text.chars() {
        let c = match (c, prev) {
            ('々', Some(p)) => p,
            _ => c,
        };
        out.push(c);
        prev = Some(c);
    }
    out
}

fn strip_honorifics(mut name: String, mut rendered: String) -> (String, String) {
    for (suffix, rendered_suffixes) in HONORIFICS {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_string();
            if let Some(r) = rendered_suffixes.iter().find_map(|s| rendered.strip_suffix(s)) {
                rendered = r.to_string();
            }
        }
    }
    (name, rendered)
}

fn weight_of(name: &str) -> u64 {
    if has_kana(name) {
        KANA_WEIGHT
    } else {
        KANJI_WEIGHT
    }
}

impl NameConvention {
    /// Creates an empty convention.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepted rendering for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConventionEntry> {
        self.entries.get(name)
    }

    /// Returns true if `name` has been accepted.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of accepted names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, entry)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConventionEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Validates and merges one proposed rendering.
    ///
    /// Whole-name checks fail the call. Once both names parse into trees of
    /// the same shape, each atom pair is validated on its own and the
    /// outcome lists which were merged.
    ///
    /// # Errors
    /// Returns the first whole-name rule the proposal breaks.
    pub fn register(&mut self, name: &str, rendered: &str, context: &str) -> Result<Registration, NameRejection> {
        self.check_and_register(name, rendered, context).map_err(|rejection| {
            warn!(name, rendered, reason = %rejection, "name rejected");
            rejection
        })
    }

    fn check_and_register(&mut self, name: &str, rendered: &str, context: &str) -> Result<Registration, NameRejection> {
        let rendered = expand_repeaters(rendered);
        if !context.contains(name) {
            return Err(NameRejection::NotInText { name: name.to_string() });
        }

        let (mut name, mut rendered) = strip_honorifics(name.to_string(), rendered);

        if !has_kana(&name) && !has_kana(&rendered) {
            if char_len(&name) != char_len(&rendered) {
                return Err(NameRejection::LengthMismatch { name, rendered });
            }
            if name.chars().zip(rendered.chars()).all(|(a, b)| a != b) {
                return Err(NameRejection::NoSharedCharacter { name, rendered });
            }
        }

        if let Some((prefix, entry)) = self.registered_prefix(&name) {
            debug!(name = %name, prefix = %prefix, "collapsed to registered prefix");
            rendered.clone_from(&entry.rendered);
            name = prefix;
        }

        if name.contains('（') {
            return Err(NameRejection::FullWidthParenthesis { name });
        }
        if has_kana(&rendered) && !self.contains(&name) {
            return Err(NameRejection::KanaInRendering { name, rendered });
        }

        let source_tree = parse_name(&name)?;
        let rendered_tree = parse_name(&rendered)?;
        if !source_tree.same_shape(&rendered_tree) {
            return Err(NameRejection::ShapeMismatch { name, rendered });
        }

        let mut outcome = Registration::default();
        for (source_atom, rendered_atom) in source_tree.atoms().into_iter().zip(rendered_tree.atoms()) {
            match self.merge_atom(source_atom, rendered_atom) {
                Ok(()) => outcome.accepted.push(source_atom.to_string()),
                Err(rejection) => {
                    warn!(name = source_atom, rendered = rendered_atom, reason = %rejection, "name part rejected");
                    outcome.rejected.push(rejection);
                }
            }
        }
        Ok(outcome)
    }

    /// Longest registered proper prefix (at least two characters) of a
    /// name longer than three characters.
    fn registered_prefix(&self, name: &str) -> Option<(String, ConventionEntry)> {
        let chars: Vec<char> = name.chars().collect();
        if chars.len() <= PREFIX_COLLAPSE_ABOVE {
            return None;
        }
        (MIN_NAME_CHARS..chars.len()).rev().find_map(|len| {
            let prefix: String = chars[..len].iter().collect();
            self.entries.get(&prefix).cloned().map(|entry| (prefix, entry))
        })
    }

    fn merge_atom(&mut self, name: &str, rendered: &str) -> Result<(), NameRejection> {
        if char_len(name) < MIN_NAME_CHARS {
            return Err(NameRejection::TooShort { name: name.to_string() });
        }
        if char_len(name) > MAX_NAME_CHARS || char_len(rendered) > MAX_NAME_CHARS {
            return Err(NameRejection::TooLong {
                name: name.to_string(),
                rendered: rendered.to_string(),
            });
        }
        if name == rendered {
            return Err(NameRejection::Unchanged { name: name.to_string() });
        }

        let weight = weight_of(name);
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.weight += weight;
                debug!(name, weight = entry.weight, "name reinforced");
            }
            None => {
                info!(name, rendered, "new name");
                self.entries.insert(
                    name.to_string(),
                    ConventionEntry {
                        rendered: rendered.to_string(),
                        weight,
                    },
                );
            }
        }
        Ok(())
    }
}
