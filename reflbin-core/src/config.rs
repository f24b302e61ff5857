//! Merge and rebin configuration.

use crate::bundle::Column;
use crate::intent::NormBasis;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Column used to weight averaged geometry when points are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MergeWeight {
    /// Monitor counts, or count time for time-normalized data.
    #[default]
    NormBasis,
    /// Monitor counts.
    Monitor,
    /// Count time.
    Time,
    /// Intensity, for data where neither monitor nor time apply.
    Intensity,
}

impl MergeWeight {
    /// Column holding the weights for data normalized by `basis`.
    #[must_use]
    pub fn column(self, basis: NormBasis) -> Column {
        match self {
            Self::NormBasis => match basis {
                NormBasis::Time => Column::CountTime,
                NormBasis::Monitor | NormBasis::None => Column::Monitor,
            },
            Self::Monitor => Column::Monitor,
            Self::Time => Column::CountTime,
            Self::Intensity => Column::Intensity,
        }
    }
}

/// Tolerances for merging points measured at the same configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MergeConfig {
    /// Fraction of the anchor point's resolution within which angles and
    /// wavelengths count as equal (`Qtol`).
    pub q_tolerance: f64,
    /// Fraction of the anchor point's resolution within which resolution
    /// widths count as equal (`dQtol`).
    pub dq_tolerance: f64,
    /// Weight for averaging geometry and environment columns.
    pub weight: MergeWeight,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            q_tolerance: 0.5,
            dq_tolerance: 0.002,
            weight: MergeWeight::NormBasis,
        }
    }
}

impl MergeConfig {
    /// Creates a configuration with default tolerances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges only bit-identical geometry.
    #[must_use]
    pub fn exact() -> Self {
        Self::default().with_q_tolerance(0.0).with_dq_tolerance(0.0)
    }

    /// Sets the Q tolerance.
    #[must_use]
    pub fn with_q_tolerance(mut self, tolerance: f64) -> Self {
        self.q_tolerance = tolerance;
        self
    }

    /// Sets the resolution tolerance.
    #[must_use]
    pub fn with_dq_tolerance(mut self, tolerance: f64) -> Self {
        self.dq_tolerance = tolerance;
        self
    }

    /// Sets the averaging weight.
    #[must_use]
    pub fn with_weight(mut self, weight: MergeWeight) -> Self {
        self.weight = weight;
        self
    }
}

/// Corrections and bank selection for Q rebinning.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RebinConfig {
    /// Incident angle offset in degrees added to each combined angle.
    pub theta_offset: Option<f64>,
    /// Sample broadening in degrees added to the angular resolution.
    pub sample_broadening: Option<f64>,
    /// Detector bank returned by single-bank rebinning.
    pub bank: usize,
}

impl RebinConfig {
    /// Creates a configuration with no corrections on bank 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the angle offset.
    #[must_use]
    pub fn with_theta_offset(mut self, offset: f64) -> Self {
        self.theta_offset = Some(offset);
        self
    }

    /// Sets the sample broadening.
    #[must_use]
    pub fn with_sample_broadening(mut self, broadening: f64) -> Self {
        self.sample_broadening = Some(broadening);
        self
    }

    /// Selects the detector bank.
    #[must_use]
    pub fn with_bank(mut self, bank: usize) -> Self {
        self.bank = bank;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_config_builder() {
        let config = MergeConfig::new()
            .with_q_tolerance(0.25)
            .with_dq_tolerance(0.01)
            .with_weight(MergeWeight::Intensity);
        assert!((config.q_tolerance - 0.25).abs() < f64::EPSILON);
        assert!((config.dq_tolerance - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.weight, MergeWeight::Intensity);
        assert!(MergeConfig::exact().q_tolerance.abs() < f64::EPSILON);
    }

    #[test]
    fn test_weight_column_follows_basis() {
        assert_eq!(
            MergeWeight::NormBasis.column(NormBasis::Monitor),
            Column::Monitor
        );
        assert_eq!(
            MergeWeight::NormBasis.column(NormBasis::Time),
            Column::CountTime
        );
        assert_eq!(MergeWeight::NormBasis.column(NormBasis::None), Column::Monitor);
        assert_eq!(MergeWeight::Intensity.column(NormBasis::Time), Column::Intensity);
    }

    #[test]
    fn test_rebin_config_builder() {
        let config = RebinConfig::new()
            .with_theta_offset(0.01)
            .with_sample_broadening(0.1)
            .with_bank(1);
        assert_eq!(config.theta_offset, Some(0.01));
        assert_eq!(config.sample_broadening, Some(0.1));
        assert_eq!(config.bank, 1);
    }
}
