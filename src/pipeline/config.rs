//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::entry::DEFAULT_GENDER_TIE_RATIO;

/// Which single-character kana pairs are kept out of the alias graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentGuard {
    /// Skip a pair only when both names are single kana characters.
    #[default]
    Both,
    /// Skip a pair when either name is a single kana character.
    Either,
}

/// Thresholds for clustering, resolution and pruning.
///
/// Deserializes with `#[serde(default)]`, so a partial JSON object only
/// overrides the fields it names.
///
/// # Examples
///
/// ```
/// use namebook::PipelineConfig;
///
/// let config: PipelineConfig = serde_json::from_str(r#"{"count_floor": 3}"#).unwrap();
/// assert_eq!(config.count_floor, 3);
/// assert_eq!(config.min_alias_size, PipelineConfig::default().min_alias_size);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// An entry survives pruning if its count is strictly above this.
    pub count_floor: u64,
    /// An entry survives pruning if it has strictly more aliases than this.
    pub min_alias_size: usize,
    /// Single-kana fragment handling during clustering.
    pub fragment_guard: FragmentGuard,
    /// Male/Female ratio bounds treated as a tie.
    pub gender_tie_ratio: (f64, f64),
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            count_floor: 10,
            min_alias_size: 3,
            fragment_guard: FragmentGuard::Both,
            gender_tie_ratio: DEFAULT_GENDER_TIE_RATIO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.count_floor, 10);
        assert_eq!(config.min_alias_size, 3);
        assert_eq!(config.fragment_guard, FragmentGuard::Both);
    }

    #[test]
    fn partial_json_overrides() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"fragment_guard": "either", "gender_tie_ratio": [0.8, 1.25]}"#).unwrap();
        assert_eq!(config.fragment_guard, FragmentGuard::Either);
        assert_eq!(config.gender_tie_ratio, (0.8, 1.25));
        assert_eq!(config.count_floor, 10);
    }
}
