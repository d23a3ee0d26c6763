//! Alignment parameters.

use protea_core::{ProteaError, Result};

use crate::model::Score;

/// How the fill searches for the best gap landing cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GapSearch {
    /// Scan every run length at every cell. O(n³) overall.
    Exhaustive,
    /// Carry the best candidate forward from the neighbouring cell.
    /// O(n²) overall, same scores and pointers as [`GapSearch::Exhaustive`].
    #[default]
    Incremental,
}

/// Parameters for one alignment.
///
/// A gap run of length `L` costs `gap_open + (L - 1) * gap_extend`. With
/// `gap_extend = 0` every interior gap costs `gap_open` whatever its
/// length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlignConfig {
    /// Cost of opening a gap (non-negative).
    pub gap_open: Score,
    /// Cost of each gap position after the first (non-negative).
    pub gap_extend: Score,
    /// Score `+1`/`0` by identity instead of the supplied model.
    pub use_identity: bool,
    /// Dump the filled matrices at `info` level.
    pub verbose: bool,
    /// Gap candidate search strategy.
    pub gap_search: GapSearch,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            gap_open: 10,
            gap_extend: 1,
            use_identity: false,
            verbose: false,
            gap_search: GapSearch::default(),
        }
    }
}

impl AlignConfig {
    /// Affine penalties with every other setting at its default.
    pub fn new(gap_open: Score, gap_extend: Score) -> Self {
        Self {
            gap_open,
            gap_extend,
            ..Self::default()
        }
    }

    /// A single penalty per gap, independent of its length.
    pub fn uniform(penalty: Score) -> Self {
        Self::new(penalty, 0)
    }

    pub fn with_identity(mut self, use_identity: bool) -> Self {
        self.use_identity = use_identity;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_gap_search(mut self, gap_search: GapSearch) -> Self {
        self.gap_search = gap_search;
        self
    }

    /// Cost of a gap run of `len` positions (`len >= 1`).
    pub fn gap_cost(&self, len: usize) -> Score {
        self.gap_open + (len as Score - 1) * self.gap_extend
    }

    /// Check that both penalties are non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ProteaError::InvalidInput`] naming the offending penalty.
    pub fn validate(&self) -> Result<()> {
        if self.gap_open < 0 {
            return Err(ProteaError::InvalidInput(format!(
                "gap_open must be non-negative, got {}",
                self.gap_open
            )));
        }
        if self.gap_extend < 0 {
            return Err(ProteaError::InvalidInput(format!(
                "gap_extend must be non-negative, got {}",
                self.gap_extend
            )));
        }
        Ok(())
    }

    /// Read a configuration from JSON; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProteaError::Parse`] on malformed JSON and
    /// [`ProteaError::InvalidInput`] on negative penalties.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProteaError::Parse(format!("alignment config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AlignConfig::default();
        assert_eq!((config.gap_open, config.gap_extend), (10, 1));
        assert!(!config.use_identity);
        assert_eq!(config.gap_search, GapSearch::Incremental);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder() {
        let config = AlignConfig::uniform(5)
            .with_identity(true)
            .with_verbose(true)
            .with_gap_search(GapSearch::Exhaustive);
        assert_eq!(config.gap_extend, 0);
        assert!(config.use_identity && config.verbose);
        assert_eq!(config.gap_search, GapSearch::Exhaustive);
    }

    #[test]
    fn gap_cost_is_affine() {
        let config = AlignConfig::new(10, 2);
        assert_eq!(config.gap_cost(1), 10);
        assert_eq!(config.gap_cost(4), 16);
        assert_eq!(AlignConfig::uniform(5).gap_cost(7), 5);
    }

    #[test]
    fn negative_penalties_rejected() {
        assert!(AlignConfig::new(-1, 0).validate().is_err());
        let err = AlignConfig::new(3, -2).validate().unwrap_err();
        assert!(err.to_string().contains("gap_extend"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn from_json_fills_defaults() {
        let config =
            AlignConfig::from_json(r#"{"gap_open": 5, "gap_search": "exhaustive"}"#).unwrap();
        assert_eq!(config.gap_open, 5);
        assert_eq!(config.gap_extend, 1);
        assert_eq!(config.gap_search, GapSearch::Exhaustive);
        assert!(AlignConfig::from_json(r#"{"gap_open": -5}"#).is_err());
        assert!(AlignConfig::from_json("not json").is_err());
    }
}
